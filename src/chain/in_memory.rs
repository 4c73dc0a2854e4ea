use super::*;
use crate::auction::{ensure_valid_bid, HighestBid};
use crate::canvas::{CREATE_FEE, COOLDOWN_MS, MAX_CONTRIBUTION, SEED_MAX, TOTAL_PIXELS};
use crate::clock::{SharedClock, Timestamp};
use crate::grid::CANVAS_GRID;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Default)]
struct ChainState {
    next_id: u64,
    canvases: BTreeMap<CanvasId, Canvas>,
    last_paint: BTreeMap<(CanvasId, Address), Timestamp>,
    nfts: Vec<Nft>,
}

impl ChainState {
    fn new_object_id(&mut self) -> String {
        self.next_id += 1;
        format!("0x{:064x}", self.next_id)
    }

    fn canvas_mut(&mut self, canvas_id: CanvasIdRef) -> Result<&mut Canvas, ChainError> {
        self.canvases
            .get_mut(canvas_id)
            .ok_or_else(|| ChainError::UnknownCanvas(canvas_id.to_owned()))
    }
}

/// Local chain that enforces the canvas contract rules in-process.
///
/// Useful for unit-tests and for running the client without a node.
pub struct InMemoryChain {
    clock: SharedClock,
    auction_duration_ms: u64,
    state: Mutex<ChainState>,
}

impl InMemoryChain {
    pub fn new(clock: SharedClock, auction_duration_ms: u64) -> Self {
        Self {
            clock,
            auction_duration_ms,
            state: Mutex::new(ChainState::default()),
        }
    }

    pub fn new_shared(clock: SharedClock, auction_duration_ms: u64) -> Arc<Self> {
        Arc::new(Self::new(clock, auction_duration_ms))
    }

    #[cfg(test)]
    pub fn nfts(&self) -> Vec<Nft> {
        self.state.lock().nfts.clone()
    }

    fn paint(
        &self,
        sender: AddressRef,
        canvas_id: CanvasIdRef,
        coord: Coord,
        color: Color,
    ) -> Result<(), ChainError> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        let key = (canvas_id.to_owned(), sender.to_owned());
        let last_paint = state.last_paint.get(&key).copied();

        let canvas = state.canvas_mut(canvas_id)?;
        let index = CANVAS_GRID.coord_to_index(coord)? as usize;

        if canvas.completed {
            return Err(ChainError::CanvasCompleted);
        }
        if canvas.filled[index] {
            return Err(ChainError::AlreadyPainted(coord));
        }
        if let Some(last) = last_paint {
            let ready_at = last + COOLDOWN_MS;
            if now < ready_at {
                return Err(ChainError::Cooldown(ready_at - now));
            }
        }
        if canvas.contributed_by(sender) >= MAX_CONTRIBUTION {
            return Err(ChainError::ContributionLimit);
        }

        canvas.filled[index] = true;
        canvas.colors[index] = color;
        canvas.total_painted += 1;
        *canvas.contributions.entry(sender.to_owned()).or_default() += 1;

        if canvas.total_painted == TOTAL_PIXELS {
            canvas.completed = true;
            canvas.auction.running = true;
            canvas.auction.end_time = now + self.auction_duration_ms;
            debug!(?canvas_id, end_time = canvas.auction.end_time, "canvas completed");
        }

        state.last_paint.insert(key, now);
        Ok(())
    }

    fn bid(&self, sender: AddressRef, canvas_id: CanvasIdRef, amount: Amount) -> Result<(), ChainError> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        let canvas = state.canvas_mut(canvas_id)?;

        if !canvas.auction.running || canvas.auction.settled {
            return Err(BidError::AuctionNotRunning.into());
        }
        if now >= canvas.auction.end_time {
            return Err(BidError::AuctionEnded.into());
        }
        ensure_valid_bid(canvas.auction.highest_amount(), amount)?;

        canvas.auction.highest_bid = Some(HighestBid {
            bidder: sender.to_owned(),
            amount,
        });
        Ok(())
    }

    fn settle(&self, canvas_id: CanvasIdRef, name: &str) -> Result<Nft, ChainError> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        let nft_id = state.new_object_id();
        let canvas = state.canvas_mut(canvas_id)?;

        if canvas.auction.settled {
            return Err(ChainError::AlreadySettled);
        }
        if !canvas.auction.running {
            return Err(BidError::AuctionNotRunning.into());
        }
        if now < canvas.auction.end_time {
            return Err(ChainError::AuctionNotEnded);
        }

        canvas.auction.running = false;
        canvas.auction.settled = true;
        canvas.auction.sale_amount = canvas.auction.highest_amount();

        let owner = canvas
            .auction
            .highest_bid
            .as_ref()
            .map(|b| b.bidder.clone())
            .unwrap_or_else(|| canvas.proposer.clone());
        let nft = Nft {
            id: nft_id,
            canvas_id: canvas.id.clone(),
            title: name.to_owned(),
            owner,
        };
        state.nfts.push(nft.clone());
        Ok(nft)
    }

    fn create(&self, sender: AddressRef, request: CreateCanvas) -> Result<CanvasId, ChainError> {
        if request.payment < CREATE_FEE {
            return Err(ChainError::InsufficientPayment {
                paid: request.payment,
                fee: CREATE_FEE,
            });
        }
        if request.seeds.len() > SEED_MAX {
            return Err(CanvasError::TooManySeeds.into());
        }
        let draft = crate::canvas::CanvasDraft::new(
            &request.title,
            crate::canvas::SeedSet::from_seeds(request.seeds)?,
        )?;

        let mut state = self.state.lock();
        let id = state.new_object_id();
        let mut canvas = Canvas::empty(id.clone(), draft.title, sender.to_owned());
        for seed in draft.seeds.seeds() {
            let index = CANVAS_GRID.coord_to_index(seed.coord())? as usize;
            canvas.filled[index] = true;
            canvas.colors[index] = seed.color;
            canvas.total_painted += 1;
            *canvas.contributions.entry(sender.to_owned()).or_default() += 1;
        }
        state.canvases.insert(id.clone(), canvas);
        Ok(id)
    }
}

impl ChainClient for InMemoryChain {
    fn get_canvas(&self, canvas_id: CanvasIdRef) -> Result<Option<Canvas>> {
        Ok(self.state.lock().canvases.get(canvas_id).cloned())
    }

    fn list_canvases(&self) -> Result<Vec<Canvas>> {
        Ok(self.state.lock().canvases.values().cloned().collect())
    }

    fn create_canvas(&self, sender: AddressRef, request: CreateCanvas) -> Result<CanvasId> {
        Ok(self.create(sender, request)?)
    }

    fn paint_pixel(
        &self,
        sender: AddressRef,
        canvas_id: CanvasIdRef,
        coord: Coord,
        color: Color,
    ) -> Result<()> {
        Ok(self.paint(sender, canvas_id, coord, color)?)
    }

    fn place_bid(&self, sender: AddressRef, canvas_id: CanvasIdRef, amount: Amount) -> Result<()> {
        Ok(self.bid(sender, canvas_id, amount)?)
    }

    fn settle_auction(
        &self,
        _sender: AddressRef,
        canvas_id: CanvasIdRef,
        name: &str,
    ) -> Result<Nft> {
        Ok(self.settle(canvas_id, name)?)
    }
}
