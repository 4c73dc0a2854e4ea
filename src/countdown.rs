//! Auction countdown
//!
//! Pure functions over an explicit `now`; re-evaluating them on a timer
//! is up to the caller (see `service::watcher`).
use crate::clock::Timestamp;
use serde::{Deserialize, Serialize};

pub const SECOND_MS: u64 = 1000;
pub const MINUTE_MS: u64 = 60 * SECOND_MS;
pub const HOUR_MS: u64 = 60 * MINUTE_MS;
pub const DAY_MS: u64 = 24 * HOUR_MS;

pub const CRITICAL_BELOW_MS: u64 = 5 * MINUTE_MS;
pub const ENDING_SOON_BELOW_MS: u64 = HOUR_MS;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub total_ms: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Remaining {
    pub fn from_ms(total_ms: u64) -> Self {
        Self {
            total_ms,
            days: total_ms / DAY_MS,
            hours: (total_ms % DAY_MS) / HOUR_MS,
            minutes: (total_ms % HOUR_MS) / MINUTE_MS,
            seconds: (total_ms % MINUTE_MS) / SECOND_MS,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_ms == 0
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::of(self.total_ms)
    }
}

/// Time left until `deadline`, clamped at zero
pub fn remaining(deadline: Timestamp, now: Timestamp) -> Remaining {
    Remaining::from_ms(deadline.saturating_sub(now))
}

/// Ordered from the least to the most advanced state
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Normal,
    EndingSoon,
    Critical,
    Ended,
}

impl Urgency {
    pub fn of(remaining_ms: u64) -> Self {
        if remaining_ms == 0 {
            Urgency::Ended
        } else if remaining_ms < CRITICAL_BELOW_MS {
            Urgency::Critical
        } else if remaining_ms < ENDING_SOON_BELOW_MS {
            Urgency::EndingSoon
        } else {
            Urgency::Normal
        }
    }
}

/// Short form used in lists: `2d 3h`, `4h 10m`, `7m` or `Ended`
pub fn format_compact(remaining: &Remaining) -> String {
    if remaining.is_zero() {
        "Ended".to_owned()
    } else if remaining.days > 0 {
        format!("{}d {}h", remaining.days, remaining.hours)
    } else if remaining.hours > 0 {
        format!("{}h {}m", remaining.hours, remaining.minutes)
    } else {
        format!("{}m", remaining.minutes)
    }
}

/// `DD:HH:MM:SS`, zero padded
pub fn format_clock(remaining: &Remaining) -> String {
    format!(
        "{:02}:{:02}:{:02}:{:02}",
        remaining.days, remaining.hours, remaining.minutes, remaining.seconds
    )
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tick {
    pub remaining: Remaining,
    pub urgency: Urgency,
    /// Set on the first tick that observes the deadline, never again
    pub ended_now: bool,
}

/// Tracks one deadline across repeated evaluations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    deadline: Timestamp,
    latest_now: Timestamp,
    ended_reported: bool,
}

impl Countdown {
    pub fn new(deadline: Timestamp) -> Self {
        Self {
            deadline,
            latest_now: 0,
            ended_reported: false,
        }
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn tick(&mut self, now: Timestamp) -> Tick {
        // a clock stepping backwards must not revive the auction
        self.latest_now = self.latest_now.max(now);
        let remaining = remaining(self.deadline, self.latest_now);
        let urgency = remaining.urgency();

        let ended_now = urgency == Urgency::Ended && !self.ended_reported;
        if ended_now {
            self.ended_reported = true;
        }

        Tick {
            remaining,
            urgency,
            ended_now,
        }
    }

    pub fn rearm(&mut self, deadline: Timestamp) {
        *self = Self::new(deadline);
    }
}
