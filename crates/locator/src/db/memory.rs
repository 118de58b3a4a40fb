//! In-memory store repository for handler tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use store_locator_core::{GeoPoint, StaleThreshold, StoreRecord, rank_by_distance};

use super::{RepositoryError, StoreRepository};

/// Rows that could not exist as a valid [`StoreRecord`] (null or empty ids).
type RawRow = (Option<String>, Option<DateTime<Utc>>);

#[derive(Default)]
struct Tables {
    stores: BTreeMap<String, StoreRecord>,
    raw: Vec<RawRow>,
}

/// Mutex-guarded map keyed by customer id, mirroring the unique constraint.
#[derive(Default)]
pub struct MemoryStoreRepository {
    tables: Mutex<Tables>,
    fail: bool,
}

impl MemoryStoreRepository {
    /// An empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose every call fails like a dropped connection.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Insert a row bypassing validation, e.g. a legacy row with a `NULL` id.
    #[allow(clippy::unwrap_used)]
    pub fn insert_raw(&self, customer_id: Option<&str>, order_date: Option<DateTime<Utc>>) {
        let mut tables = self.tables.lock().unwrap();
        tables.raw.push((customer_id.map(str::to_owned), order_date));
    }

    /// Snapshot of the stored records, ordered by customer id.
    #[allow(clippy::unwrap_used)]
    pub fn records(&self) -> Vec<StoreRecord> {
        self.tables.lock().unwrap().stores.values().cloned().collect()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl StoreRepository for MemoryStoreRepository {
    async fn upsert(&self, record: &StoreRecord) -> Result<(), RepositoryError> {
        self.check()?;
        self.tables
            .lock()
            .unwrap()
            .stores
            .insert(record.customer_id.as_str().to_owned(), record.clone());
        Ok(())
    }

    async fn stale_customer_ids(
        &self,
        threshold: StaleThreshold,
    ) -> Result<Vec<Option<String>>, RepositoryError> {
        self.check()?;
        let now = Utc::now();
        let tables = self.tables.lock().unwrap();

        let stored = tables
            .stores
            .values()
            .map(|r| (Some(r.customer_id.as_str().to_owned()), r.order_date));
        let raw = tables.raw.iter().cloned();

        Ok(stored
            .chain(raw)
            .filter(|(_, order_date)| order_date.is_some_and(|d| threshold.is_stale(d, now)))
            .map(|(id, _)| id)
            .collect())
    }

    async fn nearest_stores(
        &self,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, RepositoryError> {
        self.check()?;
        let stores: Vec<_> = self.tables.lock().unwrap().stores.values().cloned().collect();

        Ok(rank_by_distance(&origin, stores, limit)
            .into_iter()
            .map(|ranked| ranked.record)
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }
}
