//! Core types for the store locator.
//!
//! This module provides type-safe wrappers for the store domain.

pub mod customer_id;
pub mod geo;
pub mod order_date;
pub mod scalar;
pub mod store;
pub mod threshold;

pub use customer_id::{CustomerId, CustomerIdError};
pub use geo::{GeoError, GeoPoint};
pub use order_date::{OrderDate, OrderDateError};
pub use scalar::{LooseScalar, parse_coordinate};
pub use store::{RankedStore, RecordError, StorePayload, StoreRecord, rank_by_distance};
pub use threshold::StaleThreshold;
