//! Append-only event log
//!
//! Services talk to each other only through this log: each one reads
//! from its own offset and appends what it produced.
mod in_memory;

pub use self::in_memory::*;

use crate::event::Event;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

pub type Offset = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithOffset<T> {
    pub offset: Offset,
    pub data: T,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    pub offset: Offset,
    pub details: Event,
}

pub trait Reader {
    /// Read up to `limit` events starting at `offset`
    ///
    /// When nothing is available yet, blocks for up to `timeout` (forever
    /// on `None`). The returned offset is where the next read should start.
    fn read(
        &self,
        offset: Offset,
        limit: usize,
        timeout: Option<Duration>,
    ) -> Result<WithOffset<Vec<LogEvent>>>;

    fn get_start_offset(&self) -> Result<Offset>;
}

pub trait Writer {
    /// Append events, returning the offset past the last one written
    fn write(&self, events: &[Event]) -> Result<Offset>;
}

pub type SharedReader = Arc<dyn Reader + Sync + Send + 'static>;
pub type SharedWriter = Arc<dyn Writer + Sync + Send + 'static>;
