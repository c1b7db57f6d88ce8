use std::fmt;
use std::sync::Arc;

use tracing::Level;

use crate::event::{EventId, BEGIN_SCOPE_EVENT_ID, END_SCOPE_EVENT_ID};
use crate::layer::FORWARD_TARGET;
use crate::logger::{Logger, ScopeGuard};
use crate::record::LoggedError;
use crate::severity::Severity;

/// A logger that forwards every call to the `tracing` facade.
///
/// Lets code written against [`Logger`] run under a normal subscriber in
/// production. `Critical` is emitted at `ERROR`. The category, the severity,
/// the event id and the error travel as event fields, which lets a
/// [`CaptureLayer`](crate::CaptureLayer) rebuild the original call.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    category: Arc<str>,
}

impl TracingLogger {
    pub fn new(category: impl Into<Arc<str>>) -> Self {
        TracingLogger { category: category.into() }
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

// `tracing::event!` needs the level at compile time.
macro_rules! forward {
    ($severity:expr, $($fields:tt)*) => {
        match $severity {
            Severity::Trace => tracing::event!(target: FORWARD_TARGET, Level::TRACE, $($fields)*),
            Severity::Debug => tracing::event!(target: FORWARD_TARGET, Level::DEBUG, $($fields)*),
            Severity::Information => tracing::event!(target: FORWARD_TARGET, Level::INFO, $($fields)*),
            Severity::Warning => tracing::event!(target: FORWARD_TARGET, Level::WARN, $($fields)*),
            Severity::Error | Severity::Critical => tracing::event!(target: FORWARD_TARGET, Level::ERROR, $($fields)*),
        }
    };
}

fn emit(category: &str, severity: Severity, event_id: &EventId, error: Option<&LoggedError>, message: &str) {
    let event_name = event_id.name.as_deref().unwrap_or("");
    let error = error.map(|e| e.to_string());
    forward!(
        severity,
        category = category,
        severity = %severity,
        event_id = event_id.id,
        event_name = event_name,
        error = error.as_deref(),
        "{}",
        message
    );
}

impl Logger for TracingLogger {
    fn is_enabled(&self, severity: Severity) -> bool {
        match severity {
            Severity::Trace => tracing::enabled!(target: FORWARD_TARGET, Level::TRACE),
            Severity::Debug => tracing::enabled!(target: FORWARD_TARGET, Level::DEBUG),
            Severity::Information => tracing::enabled!(target: FORWARD_TARGET, Level::INFO),
            Severity::Warning => tracing::enabled!(target: FORWARD_TARGET, Level::WARN),
            Severity::Error | Severity::Critical => tracing::enabled!(target: FORWARD_TARGET, Level::ERROR),
        }
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
        emit(&self.category, severity, &event_id, error.as_ref(), &message);
    }

    fn begin_scope<S>(&self, state: S) -> ScopeGuard
    where
        S: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        let begin = format!("Begin Scope: {}", state);
        emit(&self.category, Severity::Debug, &BEGIN_SCOPE_EVENT_ID, None, &begin);

        let category = Arc::clone(&self.category);
        let end = format!("End Scope: {}", state);
        ScopeGuard::new(move || {
            emit(&category, Severity::Debug, &END_SCOPE_EVENT_ID, None, &end);
        })
    }
}
