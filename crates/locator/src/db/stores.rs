//! `PostgreSQL` store repository.
//!
//! All statements are parameterized, including the staleness interval which
//! is bound as an `int4` month count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_locator_core::{CustomerId, GeoPoint, StaleThreshold, StoreRecord};

use super::{RepositoryError, StoreRepository};

/// Repository for the `stores` table.
#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

/// Raw `stores` row.
#[derive(sqlx::FromRow)]
struct StoreRow {
    customer_id: Option<String>,
    name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    order_date: Option<DateTime<Utc>>,
}

impl TryFrom<StoreRow> for StoreRecord {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let customer_id = CustomerId::parse(row.customer_id.as_deref().unwrap_or_default())
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid customer_id in database: {e}")))?;

        Ok(Self {
            customer_id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            lat: row.lat,
            lng: row.lng,
            order_date: row.order_date,
        })
    }
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn upsert(&self, record: &StoreRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO stores (
                customer_id, name, address, lat, lng, city, state, zip_code, order_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (customer_id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                lat = EXCLUDED.lat,
                lng = EXCLUDED.lng,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                zip_code = EXCLUDED.zip_code,
                order_date = EXCLUDED.order_date
            ",
        )
        .bind(&record.customer_id)
        .bind(record.name.as_deref())
        .bind(record.address.as_deref())
        .bind(record.lat)
        .bind(record.lng)
        .bind(record.city.as_deref())
        .bind(record.state.as_deref())
        .bind(record.zip_code.as_deref())
        .bind(record.order_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn stale_customer_ids(
        &self,
        threshold: StaleThreshold,
    ) -> Result<Vec<Option<String>>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, Option<String>>(
            r"
            SELECT customer_id
            FROM stores
            WHERE order_date < NOW() - make_interval(months => $1)
            ORDER BY customer_id
            ",
        )
        .bind(threshold.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn nearest_stores(
        &self,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, RepositoryError> {
        // Ordered by the haversine term, which grows with great-circle distance
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT customer_id, name, address, city, state, zip_code, lat, lng, order_date
            FROM stores
            WHERE lat BETWEEN -90 AND 90
              AND lng BETWEEN -180 AND 180
            ORDER BY
                power(sin(radians(lat - $1) / 2), 2)
                + cos(radians($1)) * cos(radians(lat)) * power(sin(radians(lng - $2) / 2), 2)
            LIMIT $3
            ",
        )
        .bind(origin.lat())
        .bind(origin.lng())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let mut stores = Vec::with_capacity(rows.len());
        for row in rows {
            match StoreRecord::try_from(row) {
                Ok(store) => stores.push(store),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable store row"),
            }
        }
        Ok(stores)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
