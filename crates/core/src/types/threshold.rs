//! Staleness threshold for the stale-records report.

use chrono::{DateTime, Months, Utc};

/// Age threshold, in whole months, past which a store record counts as stale.
///
/// Built from the raw `months` query parameter with [`StaleThreshold::from_param`],
/// which reads the leading integer (`"3.5"` and `"3abc"` both mean 3). Missing,
/// non-numeric and non-positive input all fall back to
/// [`StaleThreshold::DEFAULT_MONTHS`]. Oversized values are clamped to
/// [`StaleThreshold::MAX_MONTHS`] so the cutoff stays inside the range
/// `PostgreSQL` timestamps can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleThreshold {
    months: u16,
}

impl StaleThreshold {
    /// Threshold used when the caller gives none (or an invalid one).
    pub const DEFAULT_MONTHS: u16 = 6;

    /// Largest accepted threshold (1000 years).
    pub const MAX_MONTHS: u16 = 12_000;

    /// Build a threshold from a validated month count.
    ///
    /// Zero falls back to the default; values above the maximum are clamped.
    #[must_use]
    pub fn new(months: u16) -> Self {
        if months == 0 {
            return Self::default();
        }
        Self {
            months: months.min(Self::MAX_MONTHS),
        }
    }

    /// Build a threshold from the raw query parameter.
    ///
    /// ```
    /// use store_locator_core::StaleThreshold;
    ///
    /// assert_eq!(StaleThreshold::from_param(Some("3")).months(), 3);
    /// assert_eq!(StaleThreshold::from_param(Some("3.5")).months(), 3);
    /// assert_eq!(StaleThreshold::from_param(Some("abc")).months(), 6);
    /// assert_eq!(StaleThreshold::from_param(Some("-5")).months(), 6);
    /// assert_eq!(StaleThreshold::from_param(None).months(), 6);
    /// ```
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.and_then(leading_integer) {
            Some(LeadingInteger::Positive(digits)) => {
                // Digit runs too long for u16 are still positive, so clamp
                Self::new(digits.parse::<u16>().unwrap_or(Self::MAX_MONTHS))
            }
            Some(LeadingInteger::NonPositive) | None => Self::default(),
        }
    }

    /// Number of months in the threshold.
    #[must_use]
    pub const fn months(&self) -> u16 {
        self.months
    }

    /// Month count as the `int4` bound to the `make_interval` query parameter.
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        i32::from(self.months)
    }

    /// The instant before which an order date is stale.
    ///
    /// Month arithmetic clamps to the last day of shorter months, matching
    /// `PostgreSQL`'s `timestamptz - interval`.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_sub_months(Months::new(u32::from(self.months)))
    }

    /// Whether an order placed at `order_date` is stale as of `now`.
    ///
    /// The comparison is strict: an order exactly at the cutoff is not stale.
    #[must_use]
    pub fn is_stale(&self, order_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.cutoff(now).is_some_and(|cutoff| order_date < cutoff)
    }
}

enum LeadingInteger<'a> {
    /// Digits of a value greater than zero, leading zeros stripped.
    Positive(&'a str),
    NonPositive,
}

/// Sign and digits at the start of `s`, after leading whitespace.
fn leading_integer(s: &str) -> Option<LeadingInteger<'_>> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, s.get(1..)?),
        Some(b'+') => (false, s.get(1..)?),
        _ => (false, s),
    };

    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let digits = rest.get(..len)?;
    if digits.is_empty() {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if negative || significant.is_empty() {
        Some(LeadingInteger::NonPositive)
    } else {
        Some(LeadingInteger::Positive(significant))
    }
}

impl Default for StaleThreshold {
    fn default() -> Self {
        Self {
            months: Self::DEFAULT_MONTHS,
        }
    }
}
