//! Geographic coordinate type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used for haversine distance.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors that can occur when constructing a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum GeoPointError {
    /// Longitude outside [-180, 180].
    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),
    /// Latitude outside [-90, 90].
    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),
    /// Coordinate is NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NotFinite,
}

/// A point on the Earth's surface as a longitude/latitude pair.
///
/// Longitude comes first throughout (the GeoJSON convention the original
/// data set uses).
///
/// ## Examples
///
/// ```
/// use shelter_finder_core::GeoPoint;
///
/// let berlin = GeoPoint::new(13.405, 52.52).unwrap();
/// let hamburg = GeoPoint::new(9.993, 53.551).unwrap();
///
/// // Roughly 255 km apart.
/// let d = berlin.distance_meters(&hamburg);
/// assert!((240_000.0..270_000.0).contains(&d));
///
/// assert!(GeoPoint::new(200.0, 0.0).is_err());
/// assert!(GeoPoint::new(0.0, 91.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Create a new point, validating coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is not finite or is outside
    /// its valid range.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoPointError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoPointError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointError::LatitudeOutOfRange(latitude));
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Great-circle distance to another point, in meters (haversine).
    #[must_use]
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_METERS * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_ranges() {
        assert!(GeoPoint::new(-180.0, -90.0).is_ok());
        assert!(GeoPoint::new(180.0, 90.0).is_ok());
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(matches!(
            GeoPoint::new(180.1, 0.0),
            Err(GeoPointError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -90.5),
            Err(GeoPointError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn new_rejects_non_finite() {
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(GeoPointError::NotFinite)
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::INFINITY),
            Err(GeoPointError::NotFinite)
        ));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(13.405, 52.52).unwrap();
        assert!(p.distance_meters(&p) < 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(-122.42, 37.77).unwrap();
        let b = GeoPoint::new(-122.27, 37.80).unwrap();
        let d1 = a.distance_meters(&b);
        let d2 = b.distance_meters(&a);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn one_degree_latitude_is_about_111_km() {
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(0.0, 1.0).unwrap();
        let d = a.distance_meters(&b);
        assert!((110_000.0..113_000.0).contains(&d), "got {d}");
    }
}
