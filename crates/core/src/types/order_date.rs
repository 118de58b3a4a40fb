//! Order date parsing.

use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

/// Errors that can occur when parsing an [`OrderDate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderDateError {
    /// The input matched none of the accepted formats.
    #[error("unrecognised order_date {0:?}")]
    Unrecognised(String),
}

/// Timestamp of the most recent order placed by a store.
///
/// Accepted input formats, tried in order:
///
/// - RFC 3339 with offset: `2024-01-01T09:30:00-05:00`
/// - Naive date-time, read as UTC: `2024-01-01T09:30:00` or `2024-01-01 09:30:00`
/// - Calendar date, read as midnight UTC: `2024-01-01`
///
/// ```
/// use store_locator_core::OrderDate;
///
/// let date = OrderDate::parse("2024-01-01").unwrap();
/// assert_eq!(date.to_string(), "2024-01-01T00:00:00+00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderDate(DateTime<Utc>);

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl OrderDate {
    /// Parse an order date.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDateError::Unrecognised`] if the input matches none of
    /// the accepted formats.
    pub fn parse(s: &str) -> Result<Self, OrderDateError> {
        let trimmed = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(naive.and_utc()));
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|date| Self(date.and_time(NaiveTime::default()).and_utc()))
            .map_err(|_| OrderDateError::Unrecognised(s.to_owned()))
    }

    /// Returns the instant as a UTC timestamp.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for OrderDate {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<OrderDate> for DateTime<Utc> {
    fn from(date: OrderDate) -> Self {
        date.0
    }
}

impl fmt::Display for OrderDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl std::str::FromStr for OrderDate {
    type Err = OrderDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
