use std::fmt;

use crate::event::EventId;
use crate::record::LoggedError;
use crate::severity::Severity;

/// The logging-call contract shared by the capturing, no-op and forwarding
/// loggers.
///
/// Application code written against `L: Logger` can be handed a
/// [`CapturingLogger`](crate::CapturingLogger) in tests.
pub trait Logger: Send + Sync {
    /// Whether calls at `severity` are wanted. Advisory: `log` does not
    /// consult it.
    fn is_enabled(&self, severity: Severity) -> bool;

    /// Log one call. `formatter` renders the final message from the state and
    /// the error.
    fn log<S, F>(
        &self,
        severity: Severity,
        event_id: EventId,
        state: Option<S>,
        error: Option<LoggedError>,
        formatter: F,
    ) where
        S: fmt::Debug + Send + Sync + 'static,
        F: FnOnce(Option<&S>, Option<&LoggedError>) -> String;

    /// Open a scope around subsequent calls. The scope ends when the returned
    /// guard is closed or dropped.
    fn begin_scope<S>(&self, state: S) -> ScopeGuard
    where
        S: fmt::Display + fmt::Debug + Send + Sync + 'static;
}

/// Handle for an open scope.
///
/// The close action runs exactly once: on the first [`close`](Self::close)
/// or on drop, whichever comes first. Later closes do nothing.
#[must_use = "dropping the guard closes the scope immediately"]
pub struct ScopeGuard {
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl ScopeGuard {
    pub fn new(on_close: impl FnOnce() + Send + 'static) -> Self {
        ScopeGuard { on_close: Some(Box::new(on_close)) }
    }

    /// A guard with nothing to do on close.
    pub fn noop() -> Self {
        ScopeGuard { on_close: None }
    }

    pub fn close(&mut self) {
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.on_close.is_none()
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard").field("closed", &self.is_closed()).finish()
    }
}

/// Message helpers over any [`Logger`]. Each call records the message as its
/// state, with event id 0, and does not check `is_enabled`.
pub trait LoggerExt: Logger {
    fn log_message(&self, severity: Severity, message: impl Into<String>) {
        let message: String = message.into();
        self.log(severity, EventId::default(), Some(message), None, |m, _| {
            m.cloned().unwrap_or_default()
        });
    }

    fn log_error(&self, severity: Severity, error: LoggedError, message: impl Into<String>) {
        let message: String = message.into();
        self.log(severity, EventId::default(), Some(message), Some(error), |m, _| {
            m.cloned().unwrap_or_default()
        });
    }

    fn trace(&self, message: impl Into<String>) {
        self.log_message(Severity::Trace, message);
    }

    fn debug(&self, message: impl Into<String>) {
        self.log_message(Severity::Debug, message);
    }

    fn information(&self, message: impl Into<String>) {
        self.log_message(Severity::Information, message);
    }

    fn warning(&self, message: impl Into<String>) {
        self.log_message(Severity::Warning, message);
    }

    fn error(&self, message: impl Into<String>) {
        self.log_message(Severity::Error, message);
    }

    fn critical(&self, message: impl Into<String>) {
        self.log_message(Severity::Critical, message);
    }
}

impl<L: Logger> LoggerExt for L {}
