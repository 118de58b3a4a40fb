//! Lenient JSON scalars and the coordinate parse-or-null rule.
//!
//! Store payloads come from spreadsheets and export scripts, so a zip code may
//! arrive as `19103` or `"19103"` and a latitude as `40.1`, `"40.1"`, `""` or
//! `"n/a"`. [`LooseScalar`] accepts any JSON value at all; the helpers here
//! turn it into the text or coordinate values that get stored.

use serde::Deserialize;

/// A JSON value of whatever shape the client sent.
///
/// Arrays and objects land in [`LooseScalar::Other`] so a malformed field never
/// fails deserialization of the whole payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseScalar {
    /// A JSON string.
    Text(String),
    /// A JSON number, kept in its original textual precision.
    Number(serde_json::Number),
    /// A JSON boolean.
    Bool(bool),
    /// An array or object.
    Other(serde_json::Value),
}

impl LooseScalar {
    /// Converts the scalar to the text that would be stored in a text column.
    ///
    /// Numbers keep their JSON representation (`19103` becomes `"19103"`);
    /// arrays and objects become their compact JSON text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Other(value) => value.to_string(),
        }
    }
}

impl From<&str> for LooseScalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Parse a coordinate or fall back to `None`.
///
/// Falsy input (absent, null, `""`, `false`, numeric zero) is `None`. Any other
/// string is read by its longest leading decimal number, so `"40.1abc"` gives
/// `40.1` while `"abc"` gives `None`. Booleans, arrays, objects and non-finite
/// results (`"1e999"`) are `None` too. The function never fails.
///
/// # Examples
///
/// ```
/// use store_locator_core::{LooseScalar, parse_coordinate};
///
/// assert_eq!(parse_coordinate(Some(&LooseScalar::from("40.1"))), Some(40.1));
/// assert_eq!(parse_coordinate(Some(&LooseScalar::from("40.1abc"))), Some(40.1));
/// assert_eq!(parse_coordinate(Some(&LooseScalar::from(""))), None);
/// assert_eq!(parse_coordinate(Some(&LooseScalar::from("abc"))), None);
/// assert_eq!(parse_coordinate(None), None);
/// ```
#[must_use]
pub fn parse_coordinate(value: Option<&LooseScalar>) -> Option<f64> {
    let parsed = match value? {
        LooseScalar::Text(s) => float_prefix(s.trim_start())?.parse::<f64>().ok()?,
        LooseScalar::Number(n) => n.as_f64().filter(|n| n.abs() > 0.0)?,
        LooseScalar::Bool(_) | LooseScalar::Other(_) => return None,
    };

    parsed.is_finite().then_some(parsed)
}

/// Longest prefix of `s` shaped like a decimal number: optional sign, digits
/// with an optional fraction, then an optional exponent.
fn float_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = digits_at(bytes, end);
    end += int_digits;

    let mut mantissa_digits = int_digits;
    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_at(bytes, end + 1);
        if frac_digits > 0 {
            end += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits_at(bytes, end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }

    s.get(..end)
}

fn digits_at(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}
