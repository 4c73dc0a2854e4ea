//! Canvas poller
//!
//! The data-fetching layer: refreshes every canvas snapshot from the
//! chain on a fixed interval and announces the ones that changed.
use super::*;
use crate::{
    chain::SharedChainClient,
    event::ChainEvent,
    store::SharedStateStore,
};
use std::time::Instant;
use tracing::debug;

pub const CANVAS_POLLER_SERVICE_ID: &str = "canvas-poller";

/// Upper bound on a single idle sleep, so stop requests are noticed quickly
const IDLE_SLEEP: Duration = Duration::from_millis(100);

pub struct CanvasPoller {
    chain: SharedChainClient,
    store: SharedStateStore,
    event_writer: event_log::SharedWriter,
    interval: Duration,
    next_poll: Option<Instant>,
}

impl CanvasPoller {
    pub fn new(
        chain: SharedChainClient,
        store: SharedStateStore,
        event_writer: event_log::SharedWriter,
        interval: Duration,
    ) -> Self {
        Self {
            chain,
            store,
            event_writer,
            interval,
            next_poll: None,
        }
    }

    /// Fetch every canvas once; returns how many snapshots changed
    pub fn poll_now(&mut self) -> Result<usize> {
        let mut updated = Vec::new();
        for canvas in self.chain.list_canvases()? {
            let canvas_id = canvas.id.clone();
            if self.store.store_canvas(canvas)? {
                updated.push(Event::Chain(ChainEvent::CanvasUpdated { canvas_id }));
            }
        }
        if !updated.is_empty() {
            debug!(count = updated.len(), "canvas snapshots updated");
            self.event_writer.write(&updated)?;
        }
        Ok(updated.len())
    }
}

impl LoopService for CanvasPoller {
    fn get_service_id(&self) -> ServiceId {
        CANVAS_POLLER_SERVICE_ID.to_owned()
    }

    fn run_iteration(&mut self) -> Result<()> {
        let now = Instant::now();
        match self.next_poll {
            Some(due) if now < due => {
                thread::sleep((due - now).min(IDLE_SLEEP));
                Ok(())
            }
            _ => {
                self.next_poll = Some(now + self.interval);
                // a failed fetch is retried on the next poll
                if let Err(e) = self.poll_now() {
                    warn!(error = %e, "canvas poll failed");
                }
                Ok(())
            }
        }
    }
}
