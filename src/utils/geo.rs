//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.000785;

/// A point on the Earth's surface in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to `other` in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        great_circle_distance_km(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points using the spherical law of cosines.
///
/// Both points are converted to spherical coordinates, with the colatitude
/// `phi = 90 - latitude` and `theta = longitude` in radians. The cosine of the
/// arc length is then `sin phi1 sin phi2 cos(theta1 - theta2) + cos phi1 cos phi2`.
pub fn great_circle_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    // The cosine of a zero arc lands just below 1.0, which acos turns into
    // a few centimeters
    if a == b {
        return 0.0;
    }

    let phi1 = (90.0 - a.latitude).to_radians();
    let phi2 = (90.0 - b.latitude).to_radians();
    let theta1 = a.longitude.to_radians();
    let theta2 = b.longitude.to_radians();

    let cos = phi1.sin() * phi2.sin() * (theta1 - theta2).cos() + phi1.cos() * phi2.cos();
    // Nearly antipodal points can land just outside [-1, 1]
    let arc = cos.clamp(-1.0, 1.0).acos();

    arc * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let points = [
            GeoPoint::new(50.0, 8.0),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(52.5, 13.4),
            GeoPoint::new(-33.9, 151.2),
            GeoPoint::new(89.9, -45.0),
            GeoPoint::new(-75.1, 123.4),
        ];
        for p in points {
            assert_eq!(great_circle_distance_km(p, p), 0.0, "{:?}", p);
        }
    }

    #[test]
    fn test_nearby_points_are_close() {
        // ~11 m apart at 50N
        let d = great_circle_distance_km(GeoPoint::new(50.0, 8.0), GeoPoint::new(50.0001, 8.0));
        assert!(d < 0.1, "unexpected distance {}", d);
    }

    #[test]
    fn test_symmetry() {
        let points = [
            GeoPoint::new(50.0, 8.0),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(-33.9, 151.2),
            GeoPoint::new(40.7, -74.0),
        ];
        for a in points {
            for b in points {
                let ab = great_circle_distance_km(a, b);
                let ba = great_circle_distance_km(b, a);
                assert!((ab - ba).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_known_distance() {
        // Roughly 5 900 km from Frankfurt area to the null island
        let d = GeoPoint::new(50.0, 8.0).distance_km(&GeoPoint::new(0.0, 0.0));
        assert!(d > 5500.0 && d < 6000.0, "unexpected distance {}", d);

        // One degree of latitude along a meridian
        let d = GeoPoint::new(0.0, 0.0).distance_km(&GeoPoint::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_antipodes() {
        let d = great_circle_distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
