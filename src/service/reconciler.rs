//! Reconciler
//!
//! Optimistic edits live in the workbench until the chain decides on
//! them: a rejection rolls the pixel back, a confirmation refreshes the
//! snapshot right away instead of waiting for the next poll.
use super::*;
use tracing::debug;
use crate::{
    canvas::CanvasIdRef,
    chain::SharedChainClient,
    event::ChainEvent,
    store::SharedStateStore,
    workbench::PaintCommand,
};

pub const RECONCILER_SERVICE_ID: &str = "reconciler";

pub struct Reconciler {
    chain: SharedChainClient,
    store: SharedStateStore,
    event_writer: event_log::SharedWriter,
}

impl Reconciler {
    pub fn new(
        chain: SharedChainClient,
        store: SharedStateStore,
        event_writer: event_log::SharedWriter,
    ) -> Self {
        Self {
            chain,
            store,
            event_writer,
        }
    }

    fn refresh(&self, canvas_id: CanvasIdRef) -> Result<()> {
        let canvas = match self.chain.get_canvas(canvas_id)? {
            Some(canvas) => canvas,
            None => {
                warn!(%canvas_id, "canvas vanished from chain");
                return Ok(());
            }
        };

        if self.store.store_canvas(canvas.clone())? {
            self.event_writer
                .write(&[Event::Chain(ChainEvent::CanvasUpdated {
                    canvas_id: canvas_id.to_owned(),
                })])?;
        }
        self.store
            .update_open_workbench(canvas_id, &mut |workbench| workbench.prune_painted(&canvas))?;
        Ok(())
    }
}

impl LogFollowerService for Reconciler {
    fn get_service_id(&self) -> ServiceId {
        RECONCILER_SERVICE_ID.to_owned()
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Chain(ChainEvent::PaintRejected {
                canvas_id, pixel, ..
            }) => {
                let command = PaintCommand { pixel };
                if !self
                    .store
                    .update_open_workbench(&canvas_id, &mut |workbench| command.rollback(workbench))?
                {
                    debug!(%canvas_id, "workbench closed before the rejection arrived");
                }
                Ok(())
            }
            Event::Chain(ChainEvent::PaintConfirmed { canvas_id, .. })
            | Event::Chain(ChainEvent::BidAccepted { canvas_id, .. })
            | Event::Chain(ChainEvent::Settled { canvas_id, .. }) => self.refresh(&canvas_id),
            _ => Ok(()),
        }
    }
}
