//! Device Location
//!
//! The device position is sampled by the client app, which may fail
//! (permission denied, no fix, timeout). The backend only sees the report.

use crate::domain::value_objects::{GeoPoint, GeofenceError};
use crate::error::{MissionError, MissionResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a device position could not be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable")]
    Unavailable,

    #[error("Location request timed out")]
    Timeout,
}

/// Source of the submitting user's current position
///
/// Only asked when a mission actually has a geofence. Fails with
/// `LocationUnavailable` when no fix exists, or `InvalidGeofence` when the
/// reported coordinates are not a real place.
#[trait_variant::make(LocationProvider: Send)]
pub trait LocalLocationProvider {
    async fn current_position(&self) -> MissionResult<GeoPoint>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Report {
    Position(GeoPoint),
    Failed(LocationError),
    Invalid(GeofenceError),
}

/// Position (or failure) reported by the client together with the request
///
/// Coordinates are checked when they are read, so a bad report only matters
/// for missions that need it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedLocation(Report);

impl ReportedLocation {
    pub fn position(point: GeoPoint) -> Self {
        Self(Report::Position(point))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        match GeoPoint::new(latitude, longitude) {
            Ok(point) => Self::position(point),
            Err(e) => Self(Report::Invalid(e)),
        }
    }

    pub fn failed(error: LocationError) -> Self {
        Self(Report::Failed(error))
    }

    /// No report at all counts as "unavailable"
    pub fn missing() -> Self {
        Self::failed(LocationError::Unavailable)
    }

    pub fn point(&self) -> Option<GeoPoint> {
        match self.0 {
            Report::Position(point) => Some(point),
            _ => None,
        }
    }
}

impl LocationProvider for ReportedLocation {
    async fn current_position(&self) -> MissionResult<GeoPoint> {
        match self.0 {
            Report::Position(point) => Ok(point),
            Report::Failed(reason) => Err(MissionError::LocationUnavailable(reason)),
            Report::Invalid(e) => Err(MissionError::InvalidGeofence(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, LocationError, LocationProvider, ReportedLocation};
    use crate::domain::value_objects::GeofenceError;
    use crate::error::MissionError;

    #[tokio::test]
    async fn test_reported_position() {
        let point = GeoPoint::new(41.0, 29.0).unwrap();
        let reported = ReportedLocation::coordinates(41.0, 29.0);
        assert_eq!(reported.current_position().await.unwrap(), point);
        assert_eq!(reported.point(), Some(point));
    }

    #[tokio::test]
    async fn test_reported_failure() {
        let reported = ReportedLocation::failed(LocationError::PermissionDenied);
        assert!(matches!(
            reported.current_position().await,
            Err(MissionError::LocationUnavailable(LocationError::PermissionDenied))
        ));
        assert!(matches!(
            ReportedLocation::missing().current_position().await,
            Err(MissionError::LocationUnavailable(LocationError::Unavailable))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_report_fails_when_read() {
        let reported = ReportedLocation::coordinates(120.0, 0.0);
        assert_eq!(reported.point(), None);

        let err = reported.current_position().await.unwrap_err();
        assert!(matches!(
            err,
            MissionError::InvalidGeofence(GeofenceError::LatitudeOutOfRange(_))
        ));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_location_error_wire_codes() {
        let err: LocationError = serde_json::from_str(r#""permission_denied""#).unwrap();
        assert_eq!(err, LocationError::PermissionDenied);
        assert_eq!(
            serde_json::to_string(&LocationError::Timeout).unwrap(),
            r#""timeout""#
        );
    }
}
