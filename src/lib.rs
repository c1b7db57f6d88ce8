//! In-memory log capture for asserting on logging behavior in tests.
//!
//! - [`CapturingLogger`] records every call, including scope begin/end
//!   markers, into a [`LogStore`].
//! - [`LoggerProvider`] hands out loggers per category, writing either to one
//!   shared store or to per-category stores kept in a [`CategoryStoreRegistry`].
//! - [`CaptureLayer`] bridges the `tracing` facade into a provider, so code
//!   that logs through `tracing` macros can be asserted on the same way.
//!
//! ```
//! use capturing_log::{CategoryStoreRegistry, LoggerExt, LoggerProvider, LogStore};
//!
//! let registry = CategoryStoreRegistry::new();
//! let provider = LoggerProvider::from_registry(registry.clone());
//!
//! provider.create_logger("orders").information("order placed");
//!
//! let store = registry.get("orders").unwrap();
//! assert_eq!(store.get(0).unwrap().message(), "order placed");
//! assert!(registry.try_get("payments").is_none());
//! ```

pub mod severity;
pub mod event;
pub mod record;
pub mod error;
pub mod store;
pub mod logger;
pub mod capturing;
pub mod noop_logger;
pub mod forwarding;
pub mod registry;
pub mod provider;
pub mod layer;

pub mod init;
pub mod env;

pub use capturing::CapturingLogger;
pub use error::{CaptureError, Result};
pub use event::{EventId, BEGIN_SCOPE_EVENT_ID, END_SCOPE_EVENT_ID};
pub use forwarding::TracingLogger;
pub use init::{init_capture, init_capture_with_config, init_global_capture, CaptureConfig};
pub use layer::{CaptureLayer, EventError, EventFields, SpanScope};
pub use logger::{Logger, LoggerExt, ScopeGuard};
pub use noop_logger::NoopLogger;
pub use provider::LoggerProvider;
pub use record::{LogRecord, LogState, LoggedError};
pub use registry::{category_of, CategoryStoreRegistry};
pub use severity::Severity;
pub use store::{LogStore, MemoryLogStore, SharedLogStore};
