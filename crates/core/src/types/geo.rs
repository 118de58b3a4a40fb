//! Geographic points and great-circle distance.

use serde::Serialize;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

/// Errors that can occur when building a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeoError {
    /// Latitude outside `[-90, 90]` or not finite.
    #[error("latitude {0} is out of range")]
    Latitude(f64),
    /// Longitude outside `[-180, 180]` or not finite.
    #[error("longitude {0} is out of range")]
    Longitude(f64),
}

/// A WGS 84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Build a point from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is not finite or outside its range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Coordinates in GeoJSON order (`[lng, lat]`).
    #[must_use]
    pub const fn to_geojson(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}
