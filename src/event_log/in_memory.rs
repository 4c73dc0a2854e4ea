use super::*;
use anyhow::format_err;
use parking_lot::{Condvar, Mutex, MutexGuard};

type InMemoryLogInner = Vec<Event>;

pub struct InMemoryLog {
    inner: Mutex<InMemoryLogInner>,
    condvar: Condvar,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            condvar: Condvar::new(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, InMemoryLogInner> {
        self.inner.lock()
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for InMemoryLog {
    fn read(
        &self,
        offset: Offset,
        limit: usize,
        timeout: Option<Duration>,
    ) -> Result<WithOffset<Vec<LogEvent>>> {
        let offset_usize = usize::try_from(offset)?;

        let mut events = self.lock();

        if events.len() == offset_usize && limit > 0 {
            if let Some(timeout) = timeout {
                if !timeout.is_zero() {
                    self.condvar.wait_for(&mut events, timeout);
                }
            } else {
                self.condvar.wait(&mut events);
            }
        }

        let data: Vec<_> = events
            .get(offset_usize..)
            .ok_or_else(|| format_err!("offset {offset} out of bounds"))?
            .iter()
            .take(limit)
            .zip(offset..)
            .map(|(e, offset)| LogEvent {
                offset,
                details: e.clone(),
            })
            .collect();

        Ok(WithOffset {
            offset: offset + u64::try_from(data.len())?,
            data,
        })
    }

    fn get_start_offset(&self) -> Result<Offset> {
        Ok(0)
    }
}

impl Writer for InMemoryLog {
    fn write(&self, events: &[Event]) -> Result<Offset> {
        let mut log = self.lock();

        log.extend_from_slice(events);
        self.condvar.notify_all();

        Ok(u64::try_from(log.len())?)
    }
}

pub fn new_in_memory_shared() -> (SharedWriter, SharedReader) {
    let log = Arc::new(InMemoryLog::new());
    (log.clone(), log)
}
