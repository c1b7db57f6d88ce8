use parking_lot::Mutex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::event::EventId;
use crate::logger::{Logger, ScopeGuard};
use crate::provider::LoggerProvider;
use crate::record::LoggedError;
use crate::severity::Severity;

/// Target of this crate's own diagnostics. Never captured.
pub(crate) const INTERNAL_TARGET: &str = "capturing_log::internal";

/// Target used by [`TracingLogger`](crate::TracingLogger) for forwarded calls.
pub(crate) const FORWARD_TARGET: &str = "capturing_log::forward";

/// `tracing_subscriber` layer that routes events into capturing loggers.
///
/// Each event goes to the logger the [`LoggerProvider`] creates for the
/// event's target, and is recorded only if that logger is enabled for the
/// event's severity. Event fields become the record's state as
/// [`EventFields`]; the `message` field becomes the rendered message.
///
/// With span capture on, a span is bracketed by one pair of scope records
/// whose state is a [`SpanScope`]: the begin record on its first enter, the
/// end record when the span closes.
#[derive(Clone)]
pub struct CaptureLayer {
    provider: LoggerProvider,
    capture_spans: bool,
}

impl CaptureLayer {
    pub fn new(provider: LoggerProvider) -> Self {
        CaptureLayer { provider, capture_spans: true }
    }

    pub fn with_span_capture(mut self, capture_spans: bool) -> Self {
        self.capture_spans = capture_spans;
        self
    }

    pub fn provider(&self) -> &LoggerProvider {
        &self.provider
    }
}

/// Structured fields of a captured `tracing` event, excluding `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventFields {
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl EventFields {
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

/// Scope state recorded for an entered span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanScope {
    pub name: &'static str,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl fmt::Display for SpanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        if self.fields.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}

/// Error text recorded from an event's `error` field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EventError {
    pub message: String,
}

#[derive(Default)]
struct OpenBracket {
    opened: bool,
    guard: Option<ScopeGuard>,
}

struct SpanBracket(Mutex<OpenBracket>);

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target() == INTERNAL_TARGET {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut error: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
            error: &mut error,
        };
        event.record(&mut visitor);

        let mut severity = Severity::from(*meta.level());
        let mut event_id = EventId {
            id: meta.line().map(|line| line as i32).unwrap_or(0),
            name: Some(Cow::Borrowed(meta.name())),
        };
        let mut category = meta.target().to_string();

        if meta.target() == FORWARD_TARGET {
            if let Some(forwarded) = fields.remove("category").and_then(into_string) {
                category = forwarded;
            }
            if let Some(forwarded) = fields
                .remove("severity")
                .and_then(into_string)
                .and_then(|s| s.parse().ok())
            {
                severity = forwarded;
            }
            let id = fields.remove("event_id").and_then(|v| v.as_i64());
            let name = fields.remove("event_name").and_then(into_string);
            if let Some(id) = id {
                event_id = EventId {
                    id: id as i32,
                    name: name.filter(|n| !n.is_empty()).map(Cow::Owned),
                };
            }
        }

        let logger = self.provider.create_logger(&category);
        if !logger.is_enabled(severity) {
            return;
        }

        let error = error.map(|message| Arc::new(EventError { message }) as LoggedError);
        let message = message.unwrap_or_default();
        logger.log(severity, event_id, Some(EventFields { fields }), error, move |_, _| message);
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if !self.capture_spans {
            return;
        }
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut scope = SpanScope {
            name: attrs.metadata().name(),
            fields: BTreeMap::new(),
        };
        let mut message = None;
        let mut error = None;
        attrs.record(&mut FieldVisitor {
            fields: &mut scope.fields,
            message: &mut message,
            error: &mut error,
        });
        if let Some(message) = message {
            scope.fields.insert("message".to_string(), serde_json::Value::String(message));
        }

        let mut extensions = span.extensions_mut();
        extensions.insert(scope);
        extensions.insert(SpanBracket(Mutex::new(OpenBracket::default())));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(scope) = extensions.get_mut::<SpanScope>() {
            let mut message = None;
            let mut error = None;
            values.record(&mut FieldVisitor {
                fields: &mut scope.fields,
                message: &mut message,
                error: &mut error,
            });
        };
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if !self.capture_spans {
            return;
        }
        let Some(span) = ctx.span(id) else {
            return;
        };
        let target = span.metadata().target();
        if target == INTERNAL_TARGET {
            return;
        }

        let extensions = span.extensions();
        let (Some(scope), Some(bracket)) = (
            extensions.get::<SpanScope>(),
            extensions.get::<SpanBracket>(),
        ) else {
            return;
        };

        // One bracket per span: later enters (e.g. each poll of an
        // instrumented future) reuse the scope opened by the first.
        let mut bracket = bracket.0.lock();
        if bracket.opened {
            return;
        }
        bracket.opened = true;

        let logger = self.provider.create_logger(target);
        if logger.is_enabled(Severity::Debug) {
            bracket.guard = Some(logger.begin_scope(scope.clone()));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let guard = span
            .extensions()
            .get::<SpanBracket>()
            .and_then(|bracket| bracket.0.lock().guard.take());
        drop(guard);
    }
}

fn into_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }
}

/// Collects event or span fields into JSON values.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
    pub error: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => *self.message = Some(value.to_string()),
            "error" => *self.error = Some(value.to_string()),
            name => {
                self.fields
                    .insert(name.to_string(), serde_json::Value::String(value.to_string()));
            }
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if field.name() == "error" {
            *self.error = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else if field.name() == "error" {
            *self.error = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_scope_renders_name_and_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), serde_json::Value::from(7));
        fields.insert("user".to_string(), serde_json::Value::from("ada"));
        let scope = SpanScope { name: "request", fields };
        assert_eq!(scope.to_string(), "request{id=7, user=\"ada\"}");

        let bare = SpanScope { name: "tick", fields: BTreeMap::new() };
        assert_eq!(bare.to_string(), "tick");
    }
}
