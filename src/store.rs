use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{CaptureError, Result};
use crate::record::LogRecord;

/// Ordered, append-only destination for [`LogRecord`]s.
///
/// Implementations must serialize every append and every read of the
/// underlying sequence through one lock owned by the store, so that readers
/// observe a single total order of appends.
pub trait LogStore: Send + Sync {
    /// Append a record. The record is visible to every read that starts after
    /// this call returns.
    fn add(&self, record: LogRecord);

    /// Number of records currently held. Never decreases.
    fn count(&self) -> usize;

    /// The record at `index`.
    ///
    /// **Returns**
    /// - `Err(CaptureError::OutOfRange)` if `index >= count()` at call time.
    fn get(&self, index: usize) -> Result<LogRecord>;

    /// Copy of all records in insertion order, taken under the store lock.
    fn snapshot(&self) -> Vec<LogRecord>;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Iterate over a snapshot. Appends racing with the iteration are not
    /// observed by it and cannot invalidate it.
    fn iter(&self) -> std::vec::IntoIter<LogRecord> {
        self.snapshot().into_iter()
    }
}

/// A store that can be handed to several loggers and read back by tests.
pub type SharedLogStore = Arc<dyn LogStore>;

/// Default [`LogStore`]: a vector behind a mutex.
///
/// Reads and writes contend on the same lock; capture is not a hot path.
#[derive(Default)]
pub struct MemoryLogStore {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records, e.g. to seed expectations or merge stores.
    pub fn with_records(records: Vec<LogRecord>) -> Self {
        MemoryLogStore { records: Mutex::new(records) }
    }

    /// A fresh store behind a [`SharedLogStore`] handle.
    pub fn shared() -> SharedLogStore {
        Arc::new(Self::new())
    }
}

impl LogStore for MemoryLogStore {
    fn add(&self, record: LogRecord) {
        self.records.lock().push(record);
    }

    fn count(&self) -> usize {
        self.records.lock().len()
    }

    fn get(&self, index: usize) -> Result<LogRecord> {
        let records = self.records.lock();
        records.get(index).cloned().ok_or(CaptureError::OutOfRange {
            index,
            count: records.len(),
        })
    }

    fn snapshot(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }
}

impl std::fmt::Debug for MemoryLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLogStore").field("count", &self.count()).finish()
    }
}
