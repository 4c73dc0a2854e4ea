//! Transaction submitter
//!
//! Turns user requests from the log into chain transactions and logs
//! what the chain said about them.
use super::*;
use crate::{
    chain::SharedChainClient,
    event::{ChainEvent, UiEvent},
};
use tracing::debug;

pub const SUBMITTER_SERVICE_ID: &str = "transaction-submitter";

pub struct TransactionSubmitter {
    chain: SharedChainClient,
    event_writer: event_log::SharedWriter,
}

impl TransactionSubmitter {
    pub fn new(chain: SharedChainClient, event_writer: event_log::SharedWriter) -> Self {
        Self {
            chain,
            event_writer,
        }
    }

    fn submit(&self, request: UiEvent) -> ChainEvent {
        match request {
            UiEvent::PaintRequested { canvas_id, pixel } => {
                match self
                    .chain
                    .paint_pixel(&pixel.painter, &canvas_id, pixel.coord(), pixel.color)
                {
                    Ok(()) => {
                        info!(%canvas_id, x = pixel.x, y = pixel.y, "pixel painted");
                        ChainEvent::PaintConfirmed { canvas_id, pixel }
                    }
                    Err(e) => {
                        warn!(%canvas_id, x = pixel.x, y = pixel.y, error = %e, "paint rejected");
                        ChainEvent::PaintRejected {
                            canvas_id,
                            pixel,
                            reason: e.to_string(),
                        }
                    }
                }
            }
            UiEvent::BidRequested {
                canvas_id,
                bidder,
                amount,
            } => match self.chain.place_bid(&bidder, &canvas_id, amount) {
                Ok(()) => {
                    info!(%canvas_id, %amount, "bid placed");
                    ChainEvent::BidAccepted {
                        canvas_id,
                        bidder,
                        amount,
                    }
                }
                Err(e) => {
                    warn!(%canvas_id, %amount, error = %e, "bid rejected");
                    ChainEvent::BidRejected {
                        canvas_id,
                        bidder,
                        amount,
                        reason: e.to_string(),
                    }
                }
            },
            UiEvent::SettleRequested {
                canvas_id,
                sender,
                name,
            } => match self.chain.settle_auction(&sender, &canvas_id, &name) {
                Ok(nft) => {
                    info!(%canvas_id, nft_id = %nft.id, owner = %nft.owner, "auction settled");
                    ChainEvent::Settled { canvas_id, nft }
                }
                Err(e) => {
                    warn!(%canvas_id, error = %e, "settlement rejected");
                    ChainEvent::SettleRejected {
                        canvas_id,
                        reason: e.to_string(),
                    }
                }
            },
        }
    }
}

impl LogFollowerService for TransactionSubmitter {
    fn get_service_id(&self) -> ServiceId {
        SUBMITTER_SERVICE_ID.to_owned()
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Ui(request) => {
                debug!(?request, "submitting");
                let outcome = self.submit(request);
                self.event_writer.write(&[Event::Chain(outcome)])?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
