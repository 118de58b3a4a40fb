//! Customer identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdError {
    /// The input is missing, empty, or only whitespace.
    #[error("customer_id cannot be empty")]
    Empty,
}

/// The stable external identifier of a store record.
///
/// Identifiers come from the upstream order system and are stored exactly as
/// provided (no trimming or case folding), so two payloads only address the
/// same record when their identifiers match byte for byte.
///
/// ## Constraints
///
/// - Must contain at least one non-whitespace character
/// - No length limit (the column is unbounded `TEXT`)
///
/// ## Examples
///
/// ```
/// use store_locator_core::CustomerId;
///
/// assert!(CustomerId::parse("C1").is_ok());
/// assert!(CustomerId::parse("").is_err());
/// assert!(CustomerId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Parse a `CustomerId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank.
    pub fn parse(s: &str) -> Result<Self, CustomerIdError> {
        if s.trim().is_empty() {
            return Err(CustomerIdError::Empty);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CustomerId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CustomerId {
    type Err = CustomerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CustomerId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CustomerId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CustomerId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
