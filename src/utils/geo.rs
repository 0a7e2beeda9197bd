use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} must be within [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} must be within [-180, 180]")]
    InvalidLongitude(f64),
}

/// A geographic point in decimal degrees.
///
/// Deserialization goes through [`Coordinate::new`], so a `Coordinate`
/// obtained from a request body is always within geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Only for compile-time tables that are covered by tests.
    pub(crate) const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance in kilometers between two valid coordinates.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance(a.lat, a.lng, b.lat, b.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_haversine_haldwani_delhi() {
        let haldwani = coord(29.2075, 79.5080);
        let delhi = coord(28.5850, 77.2080);

        let distance = distance_km(haldwani, delhi);
        // Roughly 230 km as the crow flies
        assert!(distance > 200.0 && distance < 260.0, "got {distance}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (coord(29.2075, 79.5080), coord(29.2225, 79.5167)),
            (coord(-33.8688, 151.2093), coord(51.5074, -0.1278)),
            (coord(0.0, 179.9), coord(0.0, -179.9)),
            (coord(90.0, 0.0), coord(-90.0, 0.0)),
        ];

        for (a, b) in pairs {
            assert_eq!(distance_km(a, b), distance_km(b, a));
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for c in [coord(29.2075, 79.5080), coord(-90.0, -180.0), coord(45.0, 180.0)] {
            assert_eq!(distance_km(c, c), 0.0);
        }
    }

    #[test]
    fn test_antipodal_distance_is_half_circumference() {
        let distance = distance_km(coord(0.0, 0.0), coord(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((distance - expected).abs() < 1e-6);
        assert!(!distance.is_nan());
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        assert_eq!(Coordinate::new(90.5, 0.0), Err(GeoError::InvalidLatitude(90.5)));
        assert_eq!(
            Coordinate::new(0.0, -180.1),
            Err(GeoError::InvalidLongitude(-180.1))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"lat": 29.2075, "lng": 79.508}"#).unwrap();
        assert_eq!(ok, coord(29.2075, 79.508));

        let bad = serde_json::from_str::<Coordinate>(r#"{"lat": 123.0, "lng": 79.508}"#);
        assert!(bad.is_err());
    }
}
