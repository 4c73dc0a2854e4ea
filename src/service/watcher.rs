//! Auction watcher
//!
//! Re-evaluates the countdown of every running auction on a fixed tick
//! and reports urgency changes and the end of each auction exactly once.
use super::*;
use crate::{
    canvas::CanvasId,
    clock::SharedClock,
    countdown::{Countdown, Urgency},
    event::AuctionEvent,
    store::SharedStateStore,
};
use std::collections::BTreeMap;
use tracing::debug;

pub const AUCTION_WATCHER_SERVICE_ID: &str = "auction-watcher";

struct Watched {
    countdown: Countdown,
    urgency: Option<Urgency>,
}

pub struct AuctionWatcher {
    store: SharedStateStore,
    event_writer: event_log::SharedWriter,
    clock: SharedClock,
    tick: Duration,
    watched: BTreeMap<CanvasId, Watched>,
}

impl AuctionWatcher {
    pub fn new(
        store: SharedStateStore,
        event_writer: event_log::SharedWriter,
        clock: SharedClock,
        tick: Duration,
    ) -> Self {
        Self {
            store,
            event_writer,
            clock,
            tick,
            watched: BTreeMap::new(),
        }
    }

    /// Evaluate all auctions once at the current clock time
    pub fn check_now(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();

        for canvas in self.store.list_canvases()? {
            if !canvas.auction.running || canvas.auction.settled {
                self.watched.remove(&canvas.id);
                continue;
            }
            let deadline = canvas.auction.end_time;

            let watched = self
                .watched
                .entry(canvas.id.clone())
                .or_insert_with(|| Watched {
                    countdown: Countdown::new(deadline),
                    urgency: None,
                });
            if watched.countdown.deadline() != deadline {
                debug!(canvas_id = %canvas.id, deadline, "auction deadline changed");
                watched.countdown.rearm(deadline);
                watched.urgency = None;
            }

            let tick = watched.countdown.tick(now);
            if watched.urgency != Some(tick.urgency) {
                info!(canvas_id = %canvas.id, urgency = ?tick.urgency, "auction urgency changed");
                watched.urgency = Some(tick.urgency);
                events.push(Event::Auction(AuctionEvent::UrgencyChanged {
                    canvas_id: canvas.id.clone(),
                    urgency: tick.urgency,
                }));
            }
            if tick.ended_now {
                info!(canvas_id = %canvas.id, "auction ended");
                events.push(Event::Auction(AuctionEvent::Ended {
                    canvas_id: canvas.id.clone(),
                }));
            }
        }

        if !events.is_empty() {
            self.event_writer.write(&events)?;
        }
        Ok(events)
    }
}

impl LoopService for AuctionWatcher {
    fn get_service_id(&self) -> ServiceId {
        AUCTION_WATCHER_SERVICE_ID.to_owned()
    }

    fn run_iteration(&mut self) -> Result<()> {
        self.check_now()?;
        thread::sleep(self.tick);
        Ok(())
    }
}
