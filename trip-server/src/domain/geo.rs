//! Geographic coordinates.
//!
//! [`GeoPoint`] is a validated latitude/longitude pair. Construction rejects
//! out-of-range values, so the rest of the crate can assume every point it
//! handles is actually on the globe.

use std::fmt;

/// Mean Earth radius in miles, for great-circle distances.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Error returned when a coordinate pair is outside the valid range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: latitude {lat}, longitude {lng}")]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lng: f64,
}

/// A point on the globe.
///
/// Latitude is in degrees within `[-90, 90]`, longitude within `[-180, 180]`.
/// Both are guaranteed finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Build a point from raw degrees.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinate`] if either value is non-finite or out of
    /// range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if valid {
            Ok(GeoPoint { lat, lng })
        } else {
            Err(InvalidCoordinate { lat, lng })
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to `other` in miles, via the haversine formula.
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

        EARTH_RADIUS_MILES * 2.0 * a.sqrt().asin()
    }
}

/// Formats as `lat,lng`, the shape most routing APIs want in query strings.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}
