//! Integration tests for the tracing bridge (`CaptureLayer` and `init_capture*`).
//!
//! Each test installs a thread-scoped subscriber, so tests can run in parallel.
//!
//! Run with: `cargo test --test layer_tests`

use std::sync::Arc;

use tracing::Instrument;

use capturing_log::{
    init_capture, init_capture_with_config, CaptureConfig, CategoryStoreRegistry, EventFields,
    EventId, LogStore, LoggedError, Logger, LoggerExt, LoggerProvider, Severity, SpanScope,
    TracingLogger, BEGIN_SCOPE_EVENT_ID, END_SCOPE_EVENT_ID,
};

fn capture() -> (CategoryStoreRegistry, LoggerProvider) {
    let registry = CategoryStoreRegistry::new();
    let provider = LoggerProvider::from_registry(registry.clone());
    (registry, provider)
}

#[test]
fn events_are_routed_by_target() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    tracing::info!(target: "app::orders", order_id = 17u64, paid = true, "order placed");
    tracing::warn!(target: "app::billing", "card declined");

    let orders = registry.get("app::orders").unwrap();
    assert_eq!(orders.count(), 1);
    let placed = orders.get(0).unwrap();
    assert_eq!(placed.severity(), Severity::Information);
    assert_eq!(placed.message(), "order placed");
    assert_eq!(placed.category(), Some("app::orders"));

    let fields = placed.state_as::<EventFields>().unwrap();
    assert_eq!(fields.get("order_id"), Some(&serde_json::json!(17)));
    assert_eq!(fields.get("paid"), Some(&serde_json::json!(true)));
    assert!(fields.get("message").is_none());

    let billing = registry.get("app::billing").unwrap();
    assert_eq!(billing.get(0).unwrap().severity(), Severity::Warning);
}

#[test]
fn default_threshold_gates_bridged_events() {
    let (registry, provider) = capture();
    let config = CaptureConfig {
        minimum_severity: Some(Severity::Warning),
        ..CaptureConfig::default()
    };
    let _guard = init_capture_with_config(provider.clone(), config);

    tracing::debug!(target: "app::gate", "dropped");
    tracing::info!(target: "app::gate", "dropped too");
    tracing::error!(target: "app::gate", "kept");

    assert_eq!(provider.default_minimum_severity(), Severity::Warning);
    let store = registry.get("app::gate").unwrap();
    assert_eq!(store.count(), 1);
    assert_eq!(store.get(0).unwrap().message(), "kept");
}

#[test]
fn entered_spans_become_scopes() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    let span = tracing::info_span!(target: "app::jobs", "job", id = 7);
    {
        let _entered = span.enter();
        tracing::info!(target: "app::jobs", "working");
    }
    assert_eq!(registry.get("app::jobs").unwrap().count(), 2);
    drop(span);

    let store = registry.get("app::jobs").unwrap();
    let records = store.snapshot();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].event_id(), &BEGIN_SCOPE_EVENT_ID);
    assert_eq!(records[0].message(), "Begin Scope: job{id=7}");
    assert_eq!(records[0].state_as::<SpanScope>().unwrap().name, "job");
    assert_eq!(records[1].message(), "working");
    assert_eq!(records[2].event_id(), &END_SCOPE_EVENT_ID);
    assert_eq!(records[2].message(), "End Scope: job{id=7}");
}

#[test]
fn reentering_a_span_keeps_one_bracket() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    let span = tracing::info_span!(target: "app::batch", "batch");
    span.in_scope(|| tracing::info!(target: "app::batch", "first"));
    span.in_scope(|| tracing::info!(target: "app::batch", "second"));
    let copy = span.clone();
    drop(span);
    assert_eq!(registry.get("app::batch").unwrap().count(), 3);
    drop(copy);

    let messages: Vec<String> = registry
        .get("app::batch")
        .unwrap()
        .iter()
        .map(|r| r.message().to_string())
        .collect();
    assert_eq!(messages, ["Begin Scope: batch", "first", "second", "End Scope: batch"]);
}

#[tokio::test]
async fn instrumented_future_is_one_scope_across_polls() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    async {
        tracing::info!(target: "app::poll", "start");
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        tracing::info!(target: "app::poll", "done");
    }
    .instrument(tracing::info_span!(target: "app::poll", "job"))
    .await;

    let records = registry.get("app::poll").unwrap().snapshot();
    let begins = records.iter().filter(|r| r.event_id() == &BEGIN_SCOPE_EVENT_ID).count();
    let ends = records.iter().filter(|r| r.event_id() == &END_SCOPE_EVENT_ID).count();
    assert_eq!((begins, ends), (1, 1));
    let messages: Vec<&str> = records.iter().map(|r| r.message()).collect();
    assert_eq!(messages, ["Begin Scope: job", "start", "done", "End Scope: job"]);
}

#[test]
fn span_capture_can_be_disabled() {
    let (registry, provider) = capture();
    let config = CaptureConfig {
        capture_spans: false,
        ..CaptureConfig::default()
    };
    let _guard = init_capture_with_config(provider, config);

    let span = tracing::info_span!(target: "app::quiet", "quiet");
    span.in_scope(|| tracing::info!(target: "app::quiet", "inside"));

    let store = registry.get("app::quiet").unwrap();
    assert_eq!(store.count(), 1);
    assert_eq!(store.get(0).unwrap().message(), "inside");
}

#[test]
fn error_field_is_captured_as_the_record_error() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    let failure = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    tracing::error!(
        target: "app::disk",
        error = &failure as &(dyn std::error::Error + 'static),
        "write failed"
    );

    let record = registry.get("app::disk").unwrap().get(0).unwrap();
    assert_eq!(record.error().map(|e| e.to_string()).as_deref(), Some("disk full"));
    assert_eq!(record.message(), "write failed");
}

#[test]
fn display_and_debug_error_fields_are_captured_as_the_record_error() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    let failure = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    tracing::error!(target: "app::volume", error = %failure, "write failed");
    tracing::warn!(target: "app::volume", error = ?"quota", "near limit");

    let records = registry.get("app::volume").unwrap().snapshot();
    assert_eq!(records[0].error().map(|e| e.to_string()).as_deref(), Some("disk full"));
    let fields = records[0].state_as::<EventFields>().unwrap();
    assert!(fields.get("error").is_none());
    assert_eq!(records[1].error().map(|e| e.to_string()).as_deref(), Some("\"quota\""));
}

#[test]
fn forwarded_calls_are_rebuilt_by_the_layer() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    let logger = TracingLogger::new("payments");
    assert!(logger.is_enabled(Severity::Trace));
    let error: LoggedError = Arc::new(std::io::Error::new(std::io::ErrorKind::Other, "gateway down"));
    logger.log(
        Severity::Critical,
        EventId::named(42, "Charge"),
        Some("card"),
        Some(error),
        |s, e| format!("charge by {} failed: {}", s.unwrap(), e.unwrap()),
    );
    {
        let _scope = logger.begin_scope("refund");
        logger.information("refunding");
    }

    let records = registry.get("payments").unwrap().snapshot();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].severity(), Severity::Critical);
    assert_eq!(records[0].event_id(), &EventId::named(42, "Charge"));
    assert_eq!(records[0].event_id().name.as_deref(), Some("Charge"));
    assert_eq!(records[0].message(), "charge by card failed: gateway down");
    assert_eq!(records[0].error().unwrap().to_string(), "gateway down");
    assert_eq!(records[1].event_id(), &BEGIN_SCOPE_EVENT_ID);
    assert_eq!(records[1].message(), "Begin Scope: refund");
    assert_eq!(records[2].event_id(), &EventId::new(0));
    assert_eq!(records[3].event_id(), &END_SCOPE_EVENT_ID);
}

#[test]
fn internal_diagnostics_are_not_captured() {
    let (registry, provider) = capture();
    let _guard = init_capture(provider);

    registry.get_or_create("direct");
    assert_eq!(registry.categories(), ["direct"]);
}

#[test]
fn nothing_is_captured_after_the_guard_drops() {
    let (registry, provider) = capture();
    {
        let _guard = init_capture(provider);
        tracing::info!(target: "app::scoped", "captured");
    }
    tracing::info!(target: "app::scoped", "not captured");

    assert_eq!(registry.get("app::scoped").unwrap().count(), 1);
}
