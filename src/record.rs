use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::event::EventId;
use crate::severity::Severity;

/// Error object attached to a log call. Shared so a test can compare identity
/// with [`Arc::ptr_eq`] against the error it provoked.
pub type LoggedError = Arc<dyn Error + Send + Sync + 'static>;

/// The structured payload handed to a log call before formatting.
///
/// Keeps the original value for typed retrieval and a `Debug` rendering for
/// generic inspection.
#[derive(Clone)]
pub struct LogState {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    rendered: String,
}

impl LogState {
    pub fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        let rendered = format!("{:?}", value);
        LogState {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            rendered,
        }
    }

    /// The original value, if it was of type `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `Debug` rendering of the original value.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Debug for LogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl Serialize for LogState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.rendered)
    }
}

/// One captured log call. Immutable once built; stores hand out clones.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    severity: Severity,
    event_id: EventId,
    category: Option<String>,
    state: Option<LogState>,
    #[serde(serialize_with = "serialize_error")]
    error: Option<LoggedError>,
    message: String,
}

impl LogRecord {
    pub fn new(
        severity: Severity,
        event_id: EventId,
        state: Option<LogState>,
        error: Option<LoggedError>,
        message: impl Into<String>,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            severity,
            event_id,
            category: None,
            state,
            error,
            message: message.into(),
        }
    }

    /// Stamp the category of the logger that produced this record.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn state(&self) -> Option<&LogState> {
        self.state.as_ref()
    }

    /// Typed view of the state; `None` when absent or of another type.
    pub fn state_as<T: 'static>(&self) -> Option<&T> {
        self.state.as_ref().and_then(|s| s.downcast_ref::<T>())
    }

    pub fn error(&self) -> Option<&LoggedError> {
        self.error.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// JSON snapshot, handy when printing captured logs from a failing test.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn serialize_error<S: Serializer>(error: &Option<LoggedError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
