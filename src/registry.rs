use dashmap::DashMap;
use std::sync::Arc;

use crate::error::{CaptureError, Result};
use crate::layer::INTERNAL_TARGET;
use crate::store::{MemoryLogStore, SharedLogStore};

/// Category name used for `T`, as passed to
/// [`LoggerProvider::create_logger_for`](crate::LoggerProvider::create_logger_for).
pub fn category_of<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// Lazily populated map from category name to [`LogStore`](crate::LogStore).
///
/// Cloning yields another handle to the same map, so test setup can keep one
/// handle and give another to a provider via
/// [`LoggerProvider::from_registry`](crate::LoggerProvider::from_registry).
/// Entries are never removed.
#[derive(Clone, Default)]
pub struct CategoryStoreRegistry {
    stores: Arc<DashMap<String, SharedLogStore>>,
}

impl CategoryStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store for `category`, created on first request.
    ///
    /// Concurrent first requests for one category all receive the same store.
    pub fn get_or_create(&self, category: &str) -> SharedLogStore {
        if let Some(store) = self.stores.get(category) {
            return Arc::clone(store.value());
        }

        let mut created = false;
        let store = Arc::clone(
            self.stores
                .entry(category.to_string())
                .or_insert_with(|| {
                    created = true;
                    MemoryLogStore::shared()
                })
                .value(),
        );

        if created {
            tracing::debug!(target: INTERNAL_TARGET, category, "created captured log store");
        }
        store
    }

    /// The store for `category`, or `None` when nothing was ever logged under it.
    pub fn try_get(&self, category: &str) -> Option<SharedLogStore> {
        self.stores.get(category).map(|store| Arc::clone(store.value()))
    }

    /// The store for `category`.
    ///
    /// **Returns**
    /// - `Err(CaptureError::NotFound)` when no logger was ever created for
    ///   `category`. Use [`try_get`](Self::try_get) when absence is plausible.
    pub fn get(&self, category: &str) -> Result<SharedLogStore> {
        self.try_get(category).ok_or_else(|| CaptureError::NotFound {
            category: category.to_string(),
        })
    }

    pub fn try_get_for<T: ?Sized>(&self) -> Option<SharedLogStore> {
        self.try_get(category_of::<T>())
    }

    pub fn get_for<T: ?Sized>(&self) -> Result<SharedLogStore> {
        self.get(category_of::<T>())
    }

    /// Registered category names, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl std::fmt::Debug for CategoryStoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryStoreRegistry")
            .field("categories", &self.categories())
            .finish()
    }
}
