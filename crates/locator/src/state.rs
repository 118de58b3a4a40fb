//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{PgStoreRepository, StoreRepository};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The pool behind the repository
/// is created once in `main` and injected here; handlers never reach for a
/// global connection.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Box<dyn StoreRepository>,
}

impl AppState {
    /// Create application state around any store repository.
    #[must_use]
    pub fn new(stores: impl StoreRepository) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                stores: Box::new(stores),
            }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(PgStoreRepository::new(pool))
    }

    /// Get a reference to the store repository.
    #[must_use]
    pub fn stores(&self) -> &dyn StoreRepository {
        self.inner.stores.as_ref()
    }
}
