use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::env::{
    env_or, parse_flag, CAPTURING_LOG_CAPTURE_SPANS_ENV, CAPTURING_LOG_MIN_SEVERITY_ENV,
    CAPTURING_LOG_STDOUT_ENV,
};
use crate::error::{CaptureError, Result};
use crate::layer::{CaptureLayer, INTERNAL_TARGET};
use crate::provider::LoggerProvider;
use crate::severity::Severity;

/// Configuration of the tracing bridge.
///
/// **Fields**
/// - `minimum_severity`: when set, overrides the provider's default minimum
///   severity before the layer is installed.
/// - `capture_spans`: record each span as one scope begin/end pair (first enter to close).
/// - `enable_stdout`: also print events through a `fmt` layer writing to the
///   test writer, so they show up in `cargo test` output of failing tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub minimum_severity: Option<Severity>,
    pub capture_spans: bool,
    pub enable_stdout: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            minimum_severity: None,
            capture_spans: true,
            enable_stdout: false,
        }
    }
}

impl CaptureConfig {
    /// Defaults overridden by the `CAPTURING_LOG_*` environment variables.
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let min = env_or(CAPTURING_LOG_MIN_SEVERITY_ENV, "");
        let spans = env_or(CAPTURING_LOG_CAPTURE_SPANS_ENV, "");
        let stdout = env_or(CAPTURING_LOG_STDOUT_ENV, "");

        Self {
            minimum_severity: min.parse().ok(),
            capture_spans: parse_flag(&spans).unwrap_or(defaults.capture_spans),
            enable_stdout: parse_flag(&stdout).unwrap_or(defaults.enable_stdout),
        }
    }
}

fn build_layer(provider: LoggerProvider, config: &CaptureConfig) -> CaptureLayer {
    if let Some(severity) = config.minimum_severity {
        provider.set_default_minimum_severity(severity);
    }
    CaptureLayer::new(provider).with_span_capture(config.capture_spans)
}

/// Route `tracing` events on the current thread into `provider` until the
/// returned guard is dropped.
///
/// Thread-scoped, so parallel tests each capture their own events.
pub fn init_capture_with_config(provider: LoggerProvider, config: CaptureConfig) -> DefaultGuard {
    let layer = build_layer(provider, &config);

    // Two arms because the stacked subscriber types differ.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_default(subscriber)
    }
}

/// [`init_capture_with_config`] with [`CaptureConfig::default`].
pub fn init_capture(provider: LoggerProvider) -> DefaultGuard {
    init_capture_with_config(provider, CaptureConfig::default())
}

/// Install the bridge as the process-wide subscriber.
///
/// **Returns**
/// - `Err(CaptureError::SubscriberInstall)` if a global subscriber is
///   already set.
pub fn init_global_capture(provider: LoggerProvider, config: CaptureConfig) -> Result<()> {
    let layer = build_layer(provider, &config);

    let installed = if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    };
    installed.map_err(|e| CaptureError::SubscriberInstall(e.to_string()))?;

    tracing::debug!(target: INTERNAL_TARGET, ?config, "installed global capturing subscriber");
    Ok(())
}
