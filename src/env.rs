//! Environment variable names read by [`CaptureConfig::from_env`](crate::CaptureConfig::from_env).
//!
//! These are purely helpers; providers and stores never read the
//! environment themselves.

/// Default minimum severity for loggers created by the bridged provider,
/// e.g. `debug` or `warning`.
pub const CAPTURING_LOG_MIN_SEVERITY_ENV: &str = "CAPTURING_LOG_MIN_SEVERITY";

/// Whether entered spans are recorded as scopes (`true`/`false`).
pub const CAPTURING_LOG_CAPTURE_SPANS_ENV: &str = "CAPTURING_LOG_CAPTURE_SPANS";

/// Whether captured events are also printed through the test writer.
pub const CAPTURING_LOG_STDOUT_ENV: &str = "CAPTURING_LOG_STDOUT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag; `1`, `true`, `yes` and `on` are true.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
