use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::capturing::CapturingLogger;
use crate::registry::{category_of, CategoryStoreRegistry};
use crate::severity::Severity;
use crate::store::{MemoryLogStore, SharedLogStore};

type StoreResolver = dyn Fn(&str) -> SharedLogStore + Send + Sync;

enum StoreSource {
    Shared(SharedLogStore),
    Resolver(Arc<StoreResolver>),
}

struct ProviderInner {
    source: StoreSource,
    default_minimum_severity: AtomicU8,
}

/// Hands out a [`CapturingLogger`] per category.
///
/// Runs in one of two modes, fixed at construction:
/// - shared: every logger writes to the same store;
/// - resolver: the store is looked up by category name, e.g. in a
///   [`CategoryStoreRegistry`].
///
/// Cloning yields another handle to the same provider. Issued loggers hold
/// their own reference to their store, so dropping every provider handle
/// leaves them and their stores untouched.
#[derive(Clone)]
pub struct LoggerProvider {
    inner: Arc<ProviderInner>,
}

impl LoggerProvider {
    /// Shared mode over a fresh store.
    pub fn new() -> Self {
        Self::with_shared_store(MemoryLogStore::shared())
    }

    /// Shared mode: every created logger writes to `store`.
    pub fn with_shared_store(store: SharedLogStore) -> Self {
        Self::from_source(StoreSource::Shared(store))
    }

    /// Resolver mode: `resolver` picks the store for each category.
    pub fn with_resolver<F>(resolver: F) -> Self
    where
        F: Fn(&str) -> SharedLogStore + Send + Sync + 'static,
    {
        Self::from_source(StoreSource::Resolver(Arc::new(resolver)))
    }

    /// Resolver mode over `registry`, creating one store per unseen category.
    pub fn from_registry(registry: CategoryStoreRegistry) -> Self {
        Self::with_resolver(move |category| registry.get_or_create(category))
    }

    fn from_source(source: StoreSource) -> Self {
        LoggerProvider {
            inner: Arc::new(ProviderInner {
                source,
                default_minimum_severity: AtomicU8::new(Severity::Trace as u8),
            }),
        }
    }

    pub fn with_default_minimum_severity(self, severity: Severity) -> Self {
        self.set_default_minimum_severity(severity);
        self
    }

    /// Threshold given to each logger created from now on.
    pub fn default_minimum_severity(&self) -> Severity {
        Severity::from_u8(self.inner.default_minimum_severity.load(Ordering::Relaxed))
    }

    /// Loggers already issued keep their own threshold.
    pub fn set_default_minimum_severity(&self, severity: Severity) {
        self.inner
            .default_minimum_severity
            .store(severity as u8, Ordering::Relaxed);
    }

    /// The store used in shared mode; `None` in resolver mode.
    pub fn shared_store(&self) -> Option<&SharedLogStore> {
        match &self.inner.source {
            StoreSource::Shared(store) => Some(store),
            StoreSource::Resolver(_) => None,
        }
    }

    /// A new logger for `category`, bound to the store the active mode selects.
    pub fn create_logger(&self, category: &str) -> CapturingLogger {
        let store = match &self.inner.source {
            StoreSource::Shared(store) => Arc::clone(store),
            StoreSource::Resolver(resolve) => resolve(category),
        };
        CapturingLogger::with_store(store)
            .with_category(category)
            .with_minimum_severity(self.default_minimum_severity())
    }

    /// A logger whose category is the type name of `T`.
    pub fn create_logger_for<T: ?Sized>(&self) -> CapturingLogger {
        self.create_logger(category_of::<T>())
    }
}

impl Default for LoggerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.inner.source {
            StoreSource::Shared(_) => "shared",
            StoreSource::Resolver(_) => "resolver",
        };
        f.debug_struct("LoggerProvider")
            .field("mode", &mode)
            .field("default_minimum_severity", &self.default_minimum_severity())
            .finish()
    }
}
