#[cfg(test)]
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch
pub type Timestamp = u64;

pub trait Clock {
    fn now_ms(&self) -> Timestamp;
}

pub type SharedClock = Arc<dyn Clock + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new_shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Timestamp)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock(Mutex<Timestamp>);

#[cfg(test)]
impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: Timestamp) {
        *self.0.lock() = now;
    }

    pub fn advance(&self, ms: u64) {
        *self.0.lock() += ms;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        *self.0.lock()
    }
}
