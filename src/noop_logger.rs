use std::fmt;

use crate::event::EventId;
use crate::logger::{Logger, ScopeGuard};
use crate::record::LoggedError;
use crate::severity::Severity;

/// A logger that drops every call.
///
/// Useful for code under test whose logging is irrelevant to the assertion.
/// The formatter is never invoked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn is_enabled(&self, _severity: Severity) -> bool {
        false
    }

    fn log<S, F>(
        &self,
        _severity: Severity,
        _event_id: EventId,
        _state: Option<S>,
        _error: Option<LoggedError>,
        _formatter: F,
    ) where
        S: fmt::Debug + Send + Sync + 'static,
        F: FnOnce(Option<&S>, Option<&LoggedError>) -> String,
    {
    }

    fn begin_scope<S>(&self, _state: S) -> ScopeGuard
    where
        S: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        ScopeGuard::noop()
    }
}
