//! Domain Value Objects
//!
//! Immutable value types for the mission domain.

use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed geographic input
///
/// Raised when coordinates or a radius cannot describe a real place. This is
/// a caller bug, never a "no restriction" signal.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeofenceError {
    #[error("Coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("Latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),

    #[error("Radius {0} must be a finite, non-negative number of meters")]
    InvalidRadius(f64),

    #[error("Geofence needs latitude, longitude and radius together")]
    Incomplete,
}

/// A position on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub const MAX_LATITUDE: f64 = 90.0;
    pub const MAX_LONGITUDE: f64 = 180.0;

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeofenceError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeofenceError::NonFiniteCoordinate);
        }
        if !(-Self::MAX_LATITUDE..=Self::MAX_LATITUDE).contains(&latitude) {
            return Err(GeofenceError::LatitudeOutOfRange(latitude));
        }
        if !(-Self::MAX_LONGITUDE..=Self::MAX_LONGITUDE).contains(&longitude) {
            return Err(GeofenceError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Geofence radius in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Radius(f64);

impl Radius {
    pub fn new(meters: f64) -> Result<Self, GeofenceError> {
        if meters.is_finite() && meters >= 0.0 {
            Ok(Self(meters))
        } else {
            Err(GeofenceError::InvalidRadius(meters))
        }
    }

    pub fn meters(&self) -> f64 {
        self.0
    }
}

/// Circular area a user must be inside to submit a mission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionGeofence {
    pub center: GeoPoint,
    pub radius: Radius,
}

impl MissionGeofence {
    pub fn new(center: GeoPoint, radius: Radius) -> Self {
        Self { center, radius }
    }

    /// Build from the nullable `location_*` columns of a mission
    ///
    /// Any missing part means the mission has no location restriction.
    pub fn from_columns(
        lat: Option<f64>,
        lng: Option<f64>,
        radius_m: Option<f64>,
    ) -> Result<Option<Self>, GeofenceError> {
        match (lat, lng, radius_m) {
            (Some(lat), Some(lng), Some(radius_m)) => Ok(Some(Self::new(
                GeoPoint::new(lat, lng)?,
                Radius::new(radius_m)?,
            ))),
            _ => Ok(None),
        }
    }

    /// Strict variant for admin input: all three or none
    pub fn from_input(
        lat: Option<f64>,
        lng: Option<f64>,
        radius_m: Option<f64>,
    ) -> Result<Option<Self>, GeofenceError> {
        match (lat, lng, radius_m) {
            (None, None, None) => Ok(None),
            (Some(_), Some(_), Some(_)) => Self::from_columns(lat, lng, radius_m),
            _ => Err(GeofenceError::Incomplete),
        }
    }
}

/// Points awarded for a mission or charged for a reward (always positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Points(i32);

impl Points {
    pub fn new(value: i32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<Points> for i64 {
    fn from(points: Points) -> Self {
        points.0 as i64
    }
}

/// Review state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_reviewed(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

/// Admin verdict on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn resulting_status(&self) -> SubmissionStatus {
        match self {
            ReviewDecision::Approve => SubmissionStatus::Approved,
            ReviewDecision::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// Which surface the caller comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Consumer app
    #[default]
    User,
    /// Brand dashboard
    Brand,
    /// Admin dashboard
    Admin,
}

impl ActorRole {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "user" => Some(ActorRole::User),
            "brand" => Some(ActorRole::Brand),
            "admin" => Some(ActorRole::Admin),
            _ => None,
        }
    }

    /// Missions are completed by end users only
    #[inline]
    pub const fn can_submit_missions(&self) -> bool {
        matches!(self, ActorRole::User)
    }

    #[inline]
    pub const fn can_create_missions(&self) -> bool {
        matches!(self, ActorRole::Brand | ActorRole::Admin)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, ActorRole::Admin)
    }
}

/// Identity asserted by the auth gateway for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: ActorRole) -> Self {
        Self { user_id, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_ranges() {
        assert!(GeoPoint::new(41.0082, 28.9784).is_ok());
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert_eq!(
            GeoPoint::new(90.5, 0.0),
            Err(GeofenceError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            GeoPoint::new(0.0, -181.0),
            Err(GeofenceError::LongitudeOutOfRange(-181.0))
        );
    }

    #[test]
    fn test_geo_point_rejects_non_finite() {
        assert_eq!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(GeofenceError::NonFiniteCoordinate)
        );
        assert_eq!(
            GeoPoint::new(0.0, f64::INFINITY),
            Err(GeofenceError::NonFiniteCoordinate)
        );
    }

    #[test]
    fn test_radius() {
        assert_eq!(Radius::new(0.0).unwrap().meters(), 0.0);
        assert_eq!(Radius::new(150.5).unwrap().meters(), 150.5);
        assert!(Radius::new(-1.0).is_err());
        assert!(Radius::new(f64::NAN).is_err());
        assert!(Radius::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_geofence_from_columns_missing_part_is_unrestricted() {
        assert_eq!(MissionGeofence::from_columns(None, None, None), Ok(None));
        assert_eq!(
            MissionGeofence::from_columns(Some(41.0), Some(29.0), None),
            Ok(None)
        );
        assert_eq!(
            MissionGeofence::from_columns(None, Some(29.0), Some(100.0)),
            Ok(None)
        );
    }

    #[test]
    fn test_geofence_from_columns_complete() {
        let fence = MissionGeofence::from_columns(Some(41.0), Some(29.0), Some(100.0))
            .unwrap()
            .unwrap();
        assert_eq!(fence.center.latitude(), 41.0);
        assert_eq!(fence.center.longitude(), 29.0);
        assert_eq!(fence.radius.meters(), 100.0);

        assert!(MissionGeofence::from_columns(Some(100.0), Some(29.0), Some(100.0)).is_err());
    }

    #[test]
    fn test_geofence_from_input_requires_all_or_none() {
        assert_eq!(MissionGeofence::from_input(None, None, None), Ok(None));
        assert_eq!(
            MissionGeofence::from_input(Some(41.0), None, Some(50.0)),
            Err(GeofenceError::Incomplete)
        );
        assert!(
            MissionGeofence::from_input(Some(41.0), Some(29.0), Some(50.0))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_points() {
        assert_eq!(Points::new(100).unwrap().value(), 100);
        assert!(Points::new(0).is_none());
        assert!(Points::new(-5).is_none());
    }

    #[test]
    fn test_submission_status_codes() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(SubmissionStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SubmissionStatus::from_code("archived"), None);
        assert!(!SubmissionStatus::Pending.is_reviewed());
        assert!(SubmissionStatus::Rejected.is_reviewed());
    }

    #[test]
    fn test_review_decision() {
        assert_eq!(
            ReviewDecision::Approve.resulting_status(),
            SubmissionStatus::Approved
        );
        assert_eq!(
            ReviewDecision::Reject.resulting_status(),
            SubmissionStatus::Rejected
        );
    }

    #[test]
    fn test_actor_role() {
        assert_eq!(ActorRole::from_code("Admin"), Some(ActorRole::Admin));
        assert_eq!(ActorRole::from_code("brand"), Some(ActorRole::Brand));
        assert_eq!(ActorRole::from_code("root"), None);
        assert!(!ActorRole::User.can_create_missions());
        assert!(ActorRole::Brand.can_create_missions());
        assert!(!ActorRole::Brand.is_admin());
    }
}
