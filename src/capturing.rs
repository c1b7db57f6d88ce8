use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::event::{EventId, BEGIN_SCOPE_EVENT_ID, END_SCOPE_EVENT_ID};
use crate::logger::{Logger, ScopeGuard};
use crate::record::{LogRecord, LogState, LoggedError};
use crate::severity::Severity;
use crate::store::{MemoryLogStore, SharedLogStore};

/// A [`Logger`] that appends every call to a [`LogStore`](crate::LogStore).
///
/// `log` records unconditionally. The minimum severity only drives
/// [`is_enabled`](Logger::is_enabled), so callers that check it first see
/// gating and callers that don't still get every call captured.
///
/// Scopes are recorded as two `Debug` records carrying
/// [`BEGIN_SCOPE_EVENT_ID`] and [`END_SCOPE_EVENT_ID`]. Nesting is not
/// checked.
pub struct CapturingLogger {
    store: SharedLogStore,
    category: Option<Arc<str>>,
    minimum_severity: AtomicU8,
}

impl CapturingLogger {
    /// A logger with its own empty store.
    pub fn new() -> Self {
        Self::with_store(MemoryLogStore::shared())
    }

    pub fn with_store(store: SharedLogStore) -> Self {
        CapturingLogger {
            store,
            category: None,
            minimum_severity: AtomicU8::new(Severity::Trace as u8),
        }
    }

    /// A logger over a new store seeded with `records`.
    pub fn with_records(records: Vec<LogRecord>) -> Self {
        Self::with_store(Arc::new(MemoryLogStore::with_records(records)))
    }

    pub fn with_minimum_severity(self, severity: Severity) -> Self {
        self.set_minimum_severity(severity);
        self
    }

    /// Stamp `category` on every record this logger produces.
    pub fn with_category(mut self, category: impl Into<Arc<str>>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn minimum_severity(&self) -> Severity {
        Severity::from_u8(self.minimum_severity.load(Ordering::Relaxed))
    }

    /// Takes effect for subsequent `is_enabled` calls only; captured
    /// records are kept.
    pub fn set_minimum_severity(&self, severity: Severity) {
        self.minimum_severity.store(severity as u8, Ordering::Relaxed);
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The store this logger writes to.
    pub fn logs(&self) -> &SharedLogStore {
        &self.store
    }

    fn append(&self, record: LogRecord) {
        self.store.add(stamp(record, self.category.as_deref()));
    }
}

fn stamp(record: LogRecord, category: Option<&str>) -> LogRecord {
    match category {
        Some(category) => record.with_category(category),
        None => record,
    }
}

impl Default for CapturingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CapturingLogger {
    /// Shares the store and copies the current threshold.
    fn clone(&self) -> Self {
        CapturingLogger {
            store: Arc::clone(&self.store),
            category: self.category.clone(),
            minimum_severity: AtomicU8::new(self.minimum_severity.load(Ordering::Relaxed)),
        }
    }
}

impl fmt::Debug for CapturingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturingLogger")
            .field("category", &self.category)
            .field("minimum_severity", &self.minimum_severity())
            .field("count", &self.store.count())
            .finish()
    }
}

impl Logger for CapturingLogger {
    fn is_enabled(&self, severity: Severity) -> bool {
        severity >= self.minimum_severity()
    }

    fn log<S, F>(
        &self,
        severity: Severity,
        event_id: EventId,
        state: Option<S>,
        error: Option<LoggedError>,
        formatter: F,
    ) where
        S: fmt::Debug + Send + Sync + 'static,
        F: FnOnce(Option<&S>, Option<&LoggedError>) -> String,
    {
        let message = formatter(state.as_ref(), error.as_ref());
        let state = state.map(LogState::new);
        self.append(LogRecord::new(severity, event_id, state, error, message));
    }

    fn begin_scope<S>(&self, state: S) -> ScopeGuard
    where
        S: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        let begin = format!("Begin Scope: {}", state);
        let end = format!("End Scope: {}", state);
        let state = LogState::new(state);

        self.append(LogRecord::new(
            Severity::Debug,
            BEGIN_SCOPE_EVENT_ID,
            Some(state.clone()),
            None,
            begin,
        ));

        let store = Arc::clone(&self.store);
        let category = self.category.clone();
        ScopeGuard::new(move || {
            let record = LogRecord::new(Severity::Debug, END_SCOPE_EVENT_ID, Some(state), None, end);
            store.add(stamp(record, category.as_deref()));
        })
    }
}
