pub mod poller;
pub mod reconciler;
pub mod submitter;
pub mod ui;
pub mod watcher;

pub use self::{poller::*, reconciler::*, submitter::*, ui::*, watcher::*};
use crate::{event::Event, event_log};
use anyhow::{bail, format_err, Result};
use std::{
    sync::{
        atomic::{self, AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use tracing::{error, info, warn};

pub type ServiceId = String;

/// How long a log follower waits for new events before re-checking the stop flags
const LOG_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// A service that handles events on the log
pub trait LogFollowerService: Send + Sync {
    fn get_service_id(&self) -> ServiceId;

    fn handle_event(&mut self, event: Event) -> Result<()>;
}

/// A service that is a loop that does something
pub trait LoopService: Send + Sync {
    fn get_service_id(&self) -> ServiceId;

    fn run_iteration(&mut self) -> Result<()>;
}

/// Service execution control instance
///
/// All services are basically a loop, and we would like to be able to
/// gracefully terminate them, and handle any top-level error of any
/// of them by gracefully stopping everything else.
#[derive(Clone, Default)]
pub struct ServiceControl {
    stop_all: Arc<AtomicBool>,
}

impl ServiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_all(&self) {
        self.stop_all.store(true, Ordering::SeqCst);
    }

    pub fn spawn_log_follower(
        &self,
        mut service: impl LogFollowerService + 'static,
        event_reader: event_log::SharedReader,
    ) -> JoinHandle {
        let service_id = service.get_service_id();
        let mut offset = match event_reader.get_start_offset() {
            Ok(offset) => offset,
            // report the failure through the handle, as if the thread failed on its own
            Err(e) => {
                return JoinHandle::new(
                    service_id,
                    Arc::new(AtomicBool::new(false)),
                    thread::spawn(move || Err(e)),
                )
            }
        };

        self.spawn_loop_raw(service_id, move || {
            let event_log::WithOffset {
                offset: new_offset,
                data: events,
            } = event_reader.read(offset, 1, Some(LOG_READ_TIMEOUT))?;

            for event in events {
                service.handle_event(event.details)?;
            }
            offset = new_offset;
            Ok(())
        })
    }

    pub fn spawn_loop(&self, mut service: impl LoopService + 'static) -> JoinHandle {
        self.spawn_loop_raw(service.get_service_id(), move || service.run_iteration())
    }

    /// Start a new service as a loop, with a certain body
    ///
    /// This will take care of checking termination condition and
    /// handling any errors returned by `f`
    fn spawn_loop_raw<F>(&self, service_id: ServiceId, mut f: F) -> JoinHandle
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));

        JoinHandle::new(
            service_id.clone(),
            stop.clone(),
            thread::spawn({
                let stop_all = self.stop_all.clone();
                move || {
                    info!(service = %service_id, "service started");
                    let res = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        while !stop.load(atomic::Ordering::SeqCst)
                            && !stop_all.load(atomic::Ordering::SeqCst)
                        {
                            if let Err(e) = f() {
                                stop_all.store(true, atomic::Ordering::SeqCst);
                                return Err(e);
                            }
                        }
                        Ok(())
                    })) {
                        Err(_e) => {
                            stop_all.store(true, atomic::Ordering::SeqCst);
                            bail!("service {service_id} panicked");
                        }
                        Ok(res) => res,
                    };
                    match &res {
                        Ok(()) => info!(service = %service_id, "service stopped"),
                        Err(e) => error!(service = %service_id, error = %e, "service failed"),
                    }
                    res
                }
            }),
        )
    }
}

/// Simple thread join wrapper that stops and joins the thread on drop
pub struct JoinHandle {
    service_id: ServiceId,
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<Result<()>>>,
}

impl JoinHandle {
    fn new(
        service_id: ServiceId,
        stop: Arc<AtomicBool>,
        handle: thread::JoinHandle<Result<()>>,
    ) -> Self {
        JoinHandle {
            service_id,
            stop,
            thread: Some(handle),
        }
    }

    fn join_mut(&mut self) -> Result<()> {
        if let Some(h) = self.thread.take() {
            h.join()
                .map_err(|e| format_err!("join of {} failed: {:?}", self.service_id, e))?
        } else {
            Ok(())
        }
    }

    pub fn join(mut self) -> Result<()> {
        self.join_mut()
    }
}

impl Drop for JoinHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Err(e) = self.join_mut() {
            warn!(service = %self.service_id, error = %e, "service ended with an error");
        }
    }
}
