//! Store records and the upsert payload they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::customer_id::{CustomerId, CustomerIdError};
use super::geo::GeoPoint;
use super::order_date::{OrderDate, OrderDateError};
use super::scalar::{LooseScalar, parse_coordinate};

/// Errors turning a [`StorePayload`] into a [`StoreRecord`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// `customer_id` is missing or invalid.
    #[error("invalid customer_id: {0}")]
    CustomerId(#[from] CustomerIdError),
    /// `order_date` is present but unparseable.
    #[error("invalid order_date: {0}")]
    OrderDate(#[from] OrderDateError),
}

/// Upsert request body as sent by clients.
///
/// Every field is optional and loosely typed; [`StorePayload::into_record`]
/// applies the coercion rules. Note the wire name `zipcode` for the stored
/// `zip_code` column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorePayload {
    pub customer_id: Option<LooseScalar>,
    pub name: Option<LooseScalar>,
    pub address: Option<LooseScalar>,
    pub city: Option<LooseScalar>,
    pub state: Option<LooseScalar>,
    pub zipcode: Option<LooseScalar>,
    pub lat: Option<LooseScalar>,
    pub lng: Option<LooseScalar>,
    pub order_date: Option<LooseScalar>,
}

impl StorePayload {
    /// Validate and coerce the payload.
    ///
    /// - `customer_id` is required.
    /// - Text fields keep their value; numbers become their decimal text.
    /// - `lat`/`lng` follow [`parse_coordinate`]: bad input becomes `None`.
    /// - A blank or absent `order_date` becomes `None`; anything else must parse.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if `customer_id` is missing or blank, or if
    /// `order_date` is present but unparseable.
    pub fn into_record(self) -> Result<StoreRecord, RecordError> {
        let customer_id = self
            .customer_id
            .map(LooseScalar::into_text)
            .ok_or(CustomerIdError::Empty)
            .and_then(|raw| CustomerId::parse(&raw))?;

        let order_date = match self.order_date.map(LooseScalar::into_text) {
            Some(raw) if !raw.trim().is_empty() => Some(OrderDate::parse(&raw)?.as_datetime()),
            _ => None,
        };

        Ok(StoreRecord {
            customer_id,
            name: self.name.map(LooseScalar::into_text),
            address: self.address.map(LooseScalar::into_text),
            city: self.city.map(LooseScalar::into_text),
            state: self.state.map(LooseScalar::into_text),
            zip_code: self.zipcode.map(LooseScalar::into_text),
            lat: parse_coordinate(self.lat.as_ref()),
            lng: parse_coordinate(self.lng.as_ref()),
            order_date,
        })
    }
}

/// One physical store, keyed by its customer identifier.
///
/// A write replaces every field of the stored row, so `None` here means the
/// column becomes `NULL`, not "keep the previous value".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRecord {
    pub customer_id: CustomerId,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub order_date: Option<DateTime<Utc>>,
}

impl StoreRecord {
    /// The store's position, if both coordinates are stored and in range.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.lat?, self.lng?).ok()
    }
}

/// A located store and its distance from a search origin.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStore {
    pub location: GeoPoint,
    pub distance_km: f64,
    pub record: StoreRecord,
}

/// Order stores by distance from `origin` and keep the first `limit`.
///
/// Records without a valid location are skipped.
#[must_use]
pub fn rank_by_distance(
    origin: &GeoPoint,
    stores: impl IntoIterator<Item = StoreRecord>,
    limit: usize,
) -> Vec<RankedStore> {
    let mut ranked: Vec<_> = stores
        .into_iter()
        .filter_map(|record| {
            let location = record.location()?;
            Some(RankedStore {
                location,
                distance_km: origin.distance_km(&location),
                record,
            })
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}
