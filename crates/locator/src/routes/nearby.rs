//! Proximity search over stored stores.
//!
//! Returns a GeoJSON `FeatureCollection` ordered nearest-first, the same shape
//! the map front-end renders into its clustered layer and sidebar list.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use store_locator_core::{GeoPoint, LooseScalar, parse_coordinate, rank_by_distance};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Default number of features returned.
pub const DEFAULT_LIMIT: usize = 25;
/// Upper bound on `limit`.
pub const MAX_LIMIT: usize = 200;

/// Query parameters for a nearby search.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub limit: Option<String>,
}

/// GeoJSON feature collection.
#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

/// GeoJSON point feature for one store.
#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Geometry,
    pub properties: StoreProperties,
}

/// GeoJSON point geometry (`[lng, lat]`).
#[derive(Debug, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [f64; 2],
}

/// Feature properties shown in popups and the sidebar.
#[derive(Debug, Serialize)]
pub struct StoreProperties {
    pub customer_id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub distance_km: f64,
}

impl NearbyQuery {
    fn origin(&self) -> Result<GeoPoint> {
        let coordinate = |raw: &Option<String>, name: &str| {
            parse_coordinate(raw.as_deref().map(LooseScalar::from).as_ref())
                .ok_or_else(|| AppError::BadRequest(format!("{name} must be a number")))
        };
        let lat = coordinate(&self.lat, "lat")?;
        let lng = coordinate(&self.lng, "lng")?;

        GeoPoint::new(lat, lng).map_err(|e| AppError::BadRequest(e.to_string()))
    }

    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_LIMIT, |limit| limit.min(MAX_LIMIT))
    }
}

/// Stores with coordinates, nearest to `lat`/`lng` first.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `lat` or `lng` is missing or out of
/// range, and `AppError::NearbyLookup` if the query fails.
#[instrument(skip(state))]
pub async fn nearby_stores(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<FeatureCollection>> {
    let origin = query.origin()?;
    let limit = query.limit();

    let stores = state
        .stores()
        .nearest_stores(origin, limit)
        .await
        .map_err(AppError::NearbyLookup)?;

    let features = rank_by_distance(&origin, stores, limit)
        .into_iter()
        .map(|ranked| Feature {
            kind: "Feature",
            geometry: Geometry {
                kind: "Point",
                coordinates: ranked.location.to_geojson(),
            },
            properties: StoreProperties {
                customer_id: ranked.record.customer_id.into_inner(),
                name: ranked.record.name,
                address: ranked.record.address,
                city: ranked.record.city,
                state: ranked.record.state,
                zip_code: ranked.record.zip_code,
                distance_km: ranked.distance_km,
            },
        })
        .collect();

    Ok(Json(FeatureCollection {
        kind: "FeatureCollection",
        features,
    }))
}
