//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! logged and captured to Sentry in full, while the client only ever sees the
//! fixed JSON message for the endpoint that failed.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use store_locator_core::RecordError;

use crate::db::RepositoryError;

/// Client-facing message for a failed store write.
pub const UPSERT_FAILED: &str = "DB insert failed";
/// Client-facing message for a failed stale-records lookup.
pub const STALE_LOOKUP_FAILED: &str = "Failed to retrieve old customer IDs";
/// Client-facing message for a failed nearby-stores lookup.
pub const NEARBY_LOOKUP_FAILED: &str = "Failed to retrieve nearby stores";

/// Application-level error type for the locator.
#[derive(Debug, Error)]
pub enum AppError {
    /// The upsert body is not a JSON object (or lacks the JSON content type).
    #[error("Unreadable store payload: {0}")]
    MalformedBody(#[from] JsonRejection),

    /// The upsert payload could not become a store record.
    #[error("Invalid store record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// Writing the store record failed.
    #[error("Store upsert failed: {0}")]
    Upsert(#[source] RepositoryError),

    /// Reading stale customer ids failed.
    #[error("Stale lookup failed: {0}")]
    StaleLookup(#[source] RepositoryError),

    /// Reading located stores failed.
    #[error("Nearby lookup failed: {0}")]
    NearbyLookup(#[source] RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // A rejected payload is the caller's problem; no Sentry event
            Self::MalformedBody(err) => {
                tracing::warn!(error = %err, "Unreadable store payload");
            }
            Self::InvalidRecord(err) => {
                tracing::warn!(error = %err, "Rejected store payload");
            }
            Self::Upsert(_) | Self::StaleLookup(_) | Self::NearbyLookup(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
            Self::BadRequest(_) => {}
        }

        let status = match &self {
            Self::MalformedBody(_)
            | Self::InvalidRecord(_)
            | Self::Upsert(_)
            | Self::StaleLookup(_)
            | Self::NearbyLookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::MalformedBody(_) | Self::InvalidRecord(_) | Self::Upsert(_) => {
                UPSERT_FAILED.to_string()
            }
            Self::StaleLookup(_) => STALE_LOOKUP_FAILED.to_string(),
            Self::NearbyLookup(_) => NEARBY_LOOKUP_FAILED.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
