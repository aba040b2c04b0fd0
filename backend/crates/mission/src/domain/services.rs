//! Domain Services
//!
//! Pure geofence logic: great-circle distance on a spherical Earth and the
//! eligibility decision built on it.

use crate::domain::value_objects::{GeoPoint, GeofenceError, MissionGeofence, Radius};
use serde::Serialize;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters (haversine formula)
///
/// Symmetric in its arguments and never negative.
pub fn haversine_distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude().to_radians();
    let phi2 = to.latitude().to_radians();
    let delta_phi = (to.latitude() - from.latitude()).to_radians();
    let delta_lambda = (to.longitude() - from.longitude()).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1]
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Is the user within `radius_m` meters of the target?
///
/// The boundary is inclusive. Malformed input (NaN, out-of-range degrees,
/// negative radius) is an error rather than a meaningless answer; callers
/// decide beforehand whether a mission needs the check at all.
pub fn is_inside_radius(
    user_lat: f64,
    user_lng: f64,
    target_lat: f64,
    target_lng: f64,
    radius_m: f64,
) -> Result<bool, GeofenceError> {
    let user = GeoPoint::new(user_lat, user_lng)?;
    let target = GeoPoint::new(target_lat, target_lng)?;
    let radius = Radius::new(radius_m)?;

    Ok(haversine_distance_m(user, target) <= radius.meters())
}

/// Outcome of a geofence check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Eligibility {
    /// Mission has no geofence
    Unrestricted,
    #[serde(rename_all = "camelCase")]
    Inside { distance_m: f64, radius_m: f64 },
    #[serde(rename_all = "camelCase")]
    Outside { distance_m: f64, radius_m: f64 },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Eligibility::Outside { .. })
    }

    pub fn distance_m(&self) -> Option<f64> {
        match self {
            Eligibility::Unrestricted => None,
            Eligibility::Inside { distance_m, .. } | Eligibility::Outside { distance_m, .. } => {
                Some(*distance_m)
            }
        }
    }

    pub fn radius_m(&self) -> Option<f64> {
        match self {
            Eligibility::Unrestricted => None,
            Eligibility::Inside { radius_m, .. } | Eligibility::Outside { radius_m, .. } => {
                Some(*radius_m)
            }
        }
    }
}

/// Evaluate a user position against an optional mission geofence
pub fn check_eligibility(geofence: Option<&MissionGeofence>, user: GeoPoint) -> Eligibility {
    let Some(fence) = geofence else {
        return Eligibility::Unrestricted;
    };

    let distance_m = haversine_distance_m(user, fence.center);
    let radius_m = fence.radius.meters();

    if distance_m <= radius_m {
        Eligibility::Inside {
            distance_m,
            radius_m,
        }
    } else {
        Eligibility::Outside {
            distance_m,
            radius_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISTANBUL: (f64, f64) = (41.0082, 28.9784);

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_same_point_is_inside_any_radius() {
        for radius in [0.0, 1.0, 100.0, 1e7] {
            assert!(is_inside_radius(ISTANBUL.0, ISTANBUL.1, ISTANBUL.0, ISTANBUL.1, radius).unwrap());
        }
        assert_eq!(
            haversine_distance_m(point(ISTANBUL.0, ISTANBUL.1), point(ISTANBUL.0, ISTANBUL.1)),
            0.0
        );
    }

    #[test]
    fn test_istanbul_center_radius_100() {
        assert!(is_inside_radius(41.0082, 28.9784, 41.0082, 28.9784, 100.0).unwrap());
    }

    #[test]
    fn test_istanbul_one_km_north_is_outside_50m() {
        assert!(!is_inside_radius(41.0180, 28.9784, 41.0082, 28.9784, 50.0).unwrap());

        let d = haversine_distance_m(point(41.0180, 28.9784), point(41.0082, 28.9784));
        assert!((d - 1090.0).abs() < 5.0, "distance was {d}");
    }

    #[test]
    fn test_one_degree_of_latitude_at_equator() {
        assert!(is_inside_radius(1.0, 0.0, 0.0, 0.0, 111_320.0).unwrap());

        let d = haversine_distance_m(point(1.0, 0.0), point(0.0, 0.0));
        assert!((d - 111_195.0).abs() < 1.0, "distance was {d}");
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let user = point(41.0180, 28.9784);
        let center = point(ISTANBUL.0, ISTANBUL.1);
        let exact = haversine_distance_m(user, center);

        assert!(is_inside_radius(41.0180, 28.9784, ISTANBUL.0, ISTANBUL.1, exact).unwrap());
        assert!(!is_inside_radius(41.0180, 28.9784, ISTANBUL.0, ISTANBUL.1, exact - 0.01).unwrap());
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (point(41.0082, 28.9784), point(40.9923, 29.0244)),
            (point(-33.8688, 151.2093), point(51.5074, -0.1278)),
            (point(0.0, 179.9), point(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_distance_m(a, b), haversine_distance_m(b, a));
        }
    }

    #[test]
    fn test_monotonic_in_radius() {
        let (lat, lng) = (41.0150, 28.9850);
        let mut was_inside = false;
        for radius in (0..40).map(|i| i as f64 * 50.0) {
            let inside = is_inside_radius(lat, lng, ISTANBUL.0, ISTANBUL.1, radius).unwrap();
            assert!(!was_inside || inside, "flipped back outside at {radius} m");
            was_inside = inside;
        }
        assert!(was_inside);
    }

    #[test]
    fn test_distance_never_negative_across_dateline_and_poles() {
        let d = haversine_distance_m(point(0.0, 179.9), point(0.0, -179.9));
        assert!(d > 0.0 && d < 25_000.0, "distance was {d}");

        let d = haversine_distance_m(point(90.0, 0.0), point(90.0, 120.0));
        assert!(d >= 0.0 && d < 1e-6, "distance was {d}");

        let d = haversine_distance_m(point(0.0, 0.0), point(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_malformed_input_fails_loudly() {
        assert_eq!(
            is_inside_radius(f64::NAN, 0.0, 0.0, 0.0, 10.0),
            Err(GeofenceError::NonFiniteCoordinate)
        );
        assert_eq!(
            is_inside_radius(0.0, 0.0, 91.0, 0.0, 10.0),
            Err(GeofenceError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            is_inside_radius(0.0, 0.0, 0.0, 0.0, -1.0),
            Err(GeofenceError::InvalidRadius(-1.0))
        );
    }

    #[test]
    fn test_check_eligibility_without_geofence() {
        let anywhere = point(-33.8688, 151.2093);
        let result = check_eligibility(None, anywhere);
        assert_eq!(result, Eligibility::Unrestricted);
        assert!(result.is_eligible());
        assert_eq!(result.distance_m(), None);
    }

    #[test]
    fn test_check_eligibility_inside_and_outside() {
        let fence = MissionGeofence::new(point(ISTANBUL.0, ISTANBUL.1), Radius::new(50.0).unwrap());

        let inside = check_eligibility(Some(&fence), point(ISTANBUL.0, ISTANBUL.1));
        assert!(inside.is_eligible());
        assert_eq!(inside.distance_m(), Some(0.0));
        assert_eq!(inside.radius_m(), Some(50.0));

        let outside = check_eligibility(Some(&fence), point(41.0180, 28.9784));
        assert!(!outside.is_eligible());
        assert!(matches!(outside, Eligibility::Outside { distance_m, .. } if distance_m > 1000.0));
    }
}
