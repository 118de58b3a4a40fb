//! Store ingestion and stale-record route handlers.
//!
//! The upsert endpoint is fed by the order export job; the stale-records
//! endpoint is polled by the archival job, which does the actual deletion.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::instrument;

use store_locator_core::{StaleThreshold, StorePayload};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Response for a successful upsert.
#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub success: bool,
}

/// Raw query pairs in request order.
///
/// Read as a list rather than a struct so a repeated or junk `months` falls
/// back locally instead of failing extraction.
pub type QueryPairs = Vec<(String, String)>;

/// Response for the stale-records report.
#[derive(Debug, Serialize)]
pub struct StaleResponse {
    pub delete_ids: Vec<String>,
}

/// Insert or fully overwrite one store record.
///
/// # Errors
///
/// Returns `AppError::MalformedBody` if the body is not a JSON object,
/// `AppError::InvalidRecord` if the payload has no usable `customer_id` or an
/// unparseable `order_date`, and `AppError::Upsert` if the write fails. All
/// surface as `500 {"error": "DB insert failed"}`.
#[instrument(skip_all)]
pub async fn upsert_store(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StorePayload>, JsonRejection>,
) -> Result<Json<UpsertResponse>> {
    let Json(payload) = payload?;
    let record = payload.into_record()?;

    tracing::info!(
        customer_id = %record.customer_id,
        name = ?record.name,
        address = ?record.address,
        city = ?record.city,
        state = ?record.state,
        zip_code = ?record.zip_code,
        lat = ?record.lat,
        lng = ?record.lng,
        order_date = ?record.order_date,
        "Incoming store payload"
    );

    state
        .stores()
        .upsert(&record)
        .await
        .map_err(AppError::Upsert)?;

    tracing::info!(customer_id = %record.customer_id, "Upserted store record");

    Ok(Json(UpsertResponse { success: true }))
}

/// List customer ids whose last order is older than `months` (default 6).
///
/// # Errors
///
/// Returns `AppError::StaleLookup` if the query fails.
#[instrument(skip_all, fields(months))]
pub async fn stale_stores(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<StaleResponse>> {
    let threshold = StaleThreshold::from_param(first_param(&pairs, "months"));
    tracing::Span::current().record("months", threshold.months());

    let rows = state
        .stores()
        .stale_customer_ids(threshold)
        .await
        .map_err(AppError::StaleLookup)?;

    let delete_ids = present_ids(rows);
    tracing::info!(count = delete_ids.len(), "Found stale store records");

    Ok(Json(StaleResponse { delete_ids }))
}

/// First value given for `name`, if any.
fn first_param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Drop `NULL` and empty identifiers.
pub fn present_ids(rows: Vec<Option<String>>) -> Vec<String> {
    rows.into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, Months, TimeZone, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory::MemoryStoreRepository;
    use crate::routes::router;

    fn app() -> (axum::Router, Arc<MemoryStoreRepository>) {
        let repo = Arc::new(MemoryStoreRepository::new());
        (router(AppState::new(Arc::clone(&repo))), repo)
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn upsert_request(method: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/api/post-store-data")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn stale_request(query: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/get-old-stores{query}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_scenario_then_stale_report() {
        let (app, repo) = app();

        let response = send(
            &app,
            upsert_request(
                "POST",
                &json!({
                    "customer_id": "C1",
                    "name": "Shop A",
                    "lat": "40.1",
                    "lng": "-75.2",
                    "order_date": "2024-01-01"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"success": true}));

        let stored = repo.records();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].lat, Some(40.1));
        assert_eq!(stored[0].lng, Some(-75.2));

        let response = send(&app, stale_request("?months=1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"delete_ids": ["C1"]}));
    }

    #[tokio::test]
    async fn test_second_upsert_overwrites_every_field() {
        let (app, repo) = app();

        let first = json!({
            "customer_id": "C1",
            "name": "Shop A",
            "address": "1 Main St",
            "city": "Philadelphia",
            "lat": "40.1",
            "lng": "-75.2",
            "order_date": "2024-01-01"
        });
        let second = json!({"customer_id": "C1", "name": "Shop B", "lat": "41.0"});

        assert_eq!(send(&app, upsert_request("POST", &first)).await.status(), StatusCode::OK);
        assert_eq!(send(&app, upsert_request("PUT", &second)).await.status(), StatusCode::OK);

        let stored = repo.records();
        assert_eq!(stored.len(), 1);
        let record = &stored[0];
        assert_eq!(record.name.as_deref(), Some("Shop B"));
        assert_eq!(record.lat, Some(41.0));
        // Full overwrite: fields missing from the second payload are cleared
        assert_eq!(record.address, None);
        assert_eq!(record.city, None);
        assert_eq!(record.lng, None);
        assert_eq!(record.order_date, None);
    }

    #[tokio::test]
    async fn test_upsert_bad_coordinates_are_stored_as_null() {
        let (app, repo) = app();

        for (id, lat, lng) in [
            ("A", json!(""), json!("abc")),
            ("B", Value::Null, json!("NaN")),
            ("C", json!(false), json!("   ")),
            ("E", json!([40.1]), json!({})),
            ("F", json!(0), json!(0.0)),
        ] {
            let body = json!({"customer_id": id, "lat": lat, "lng": lng});
            assert_eq!(send(&app, upsert_request("POST", &body)).await.status(), StatusCode::OK);
        }
        let body = json!({"customer_id": "D"});
        assert_eq!(send(&app, upsert_request("POST", &body)).await.status(), StatusCode::OK);

        for record in repo.records() {
            assert_eq!(record.lat, None, "{}", record.customer_id);
            assert_eq!(record.lng, None, "{}", record.customer_id);
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_leading_number_of_messy_coordinates() {
        let (app, repo) = app();

        let body = json!({"customer_id": "C1", "lat": "40.1abc", "lng": [-75.2]});
        let response = send(&app, upsert_request("POST", &body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let stored = repo.records();
        assert_eq!(stored[0].lat, Some(40.1));
        assert_eq!(stored[0].lng, None);
    }

    #[tokio::test]
    async fn test_upsert_unreadable_body_fails_generically() {
        let (app, repo) = app();

        let without_content_type = Request::builder()
            .method("POST")
            .uri("/api/post-store-data")
            .body(Body::from(json!({"customer_id": "C1"}).to_string()))
            .unwrap();
        let not_json = Request::builder()
            .method("POST")
            .uri("/api/post-store-data")
            .header("content-type", "application/json")
            .body(Body::from("{\"customer_id\": "))
            .unwrap();

        for request in [
            without_content_type,
            not_json,
            upsert_request("POST", &json!("C1")),
        ] {
            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json_body(response).await, json!({"error": "DB insert failed"}));
        }

        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_rejects_other_methods_without_touching_store() {
        let (app, repo) = app();

        for method in ["GET", "DELETE", "PATCH"] {
            let response = send(
                &app,
                upsert_request(method, &json!({"customer_id": "C1"})),
            )
            .await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty());
        }

        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_without_customer_id_fails_generically() {
        let (app, repo) = app();

        let response = send(&app, upsert_request("POST", &json!({"name": "Nameless"}))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "DB insert failed"}));
        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_persistence_failure_is_generic() {
        let app = router(AppState::new(MemoryStoreRepository::failing()));

        let response = send(&app, upsert_request("POST", &json!({"customer_id": "C1"}))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "DB insert failed"}));
    }

    #[tokio::test]
    async fn test_stale_threshold_boundaries() {
        let (app, repo) = app();
        let now = Utc::now();
        let three_months_ago = now.checked_sub_months(Months::new(3)).unwrap();

        repo.insert_raw(Some("OLD"), Some(three_months_ago - Duration::days(1)));
        repo.insert_raw(Some("RECENT"), now.checked_sub_months(Months::new(2)));
        repo.insert_raw(Some("UNDATED"), None);

        let response = send(&app, stale_request("?months=3")).await;
        assert_eq!(json_body(response).await, json!({"delete_ids": ["OLD"]}));
    }

    #[tokio::test]
    async fn test_stale_invalid_months_behave_like_default() {
        let (app, repo) = app();
        let now = Utc::now();
        repo.insert_raw(Some("SEVEN"), now.checked_sub_months(Months::new(7)));
        repo.insert_raw(Some("FIVE"), now.checked_sub_months(Months::new(5)));

        let default = json_body(send(&app, stale_request("")).await).await;
        assert_eq!(default, json!({"delete_ids": ["SEVEN"]}));

        for query in ["?months=abc", "?months=-5", "?months=0", "?months="] {
            let body = json_body(send(&app, stale_request(query)).await).await;
            assert_eq!(body, default, "{query}");
        }
    }

    #[tokio::test]
    async fn test_stale_months_uses_first_and_leading_integer() {
        let (app, repo) = app();
        let now = Utc::now();
        repo.insert_raw(Some("FOUR"), now.checked_sub_months(Months::new(4)));
        repo.insert_raw(Some("TWO"), now.checked_sub_months(Months::new(2)));

        for query in ["?months=3&months=1", "?months=3.5", "?months=3abc"] {
            let response = send(&app, stale_request(query)).await;
            assert_eq!(response.status(), StatusCode::OK, "{query}");
            assert_eq!(json_body(response).await, json!({"delete_ids": ["FOUR"]}), "{query}");
        }
    }

    #[tokio::test]
    async fn test_stale_never_returns_null_or_empty_ids() {
        let (app, repo) = app();
        let long_ago = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        repo.insert_raw(None, Some(long_ago));
        repo.insert_raw(Some(""), Some(long_ago));
        repo.insert_raw(Some("KEEP"), Some(long_ago));

        let body = json_body(send(&app, stale_request("?months=1")).await).await;
        assert_eq!(body, json!({"delete_ids": ["KEEP"]}));
    }

    #[tokio::test]
    async fn test_stale_rejects_other_methods() {
        let (app, _) = app();

        for method in ["POST", "PUT", "DELETE"] {
            let response = send(
                &app,
                Request::builder()
                    .method(method)
                    .uri("/api/get-old-stores")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        }
    }

    #[tokio::test]
    async fn test_stale_persistence_failure_is_generic() {
        let app = router(AppState::new(MemoryStoreRepository::failing()));

        let response = send(&app, stale_request("?months=3")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Failed to retrieve old customer IDs"})
        );
    }

    #[test]
    fn test_present_ids() {
        let rows = vec![Some("A".to_owned()), None, Some(String::new()), Some("B".to_owned())];
        assert_eq!(present_ids(rows), vec!["A", "B"]);
    }
}
