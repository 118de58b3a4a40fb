//! Stale-record report command.
//!
//! Prints the same identifiers as `GET /api/get-old-stores`, one per line, so
//! archival scripts can pipe them without going through HTTP.
//!
//! ```bash
//! sl-cli stale --months 12 > stale_ids.txt
//! ```

use std::io::Write;

use store_locator::db::{PgStoreRepository, StoreRepository};
use store_locator::routes::stores::present_ids;
use store_locator_core::StaleThreshold;

use super::{CommandError, connect};

/// Write stale customer ids to `out`.
///
/// # Errors
///
/// Returns an error if the database cannot be reached, the query fails, or
/// writing to `out` fails.
pub async fn run(months: Option<&str>, out: &mut impl Write) -> Result<usize, CommandError> {
    let threshold = StaleThreshold::from_param(months);
    let repository = PgStoreRepository::new(connect().await?);

    let ids = repository.stale_customer_ids(threshold).await?;
    write_ids(ids, out)
}

/// Write non-empty ids one per line, returning how many were written.
fn write_ids(ids: Vec<Option<String>>, out: &mut impl Write) -> Result<usize, CommandError> {
    let ids = present_ids(ids);
    for id in &ids {
        writeln!(out, "{id}")?;
    }
    Ok(ids.len())
}
