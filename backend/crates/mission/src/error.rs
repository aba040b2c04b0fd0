//! Mission Error Types
//!
//! Domain-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Responses carry a user-facing message
//! (and often an action), because the apps show them verbatim.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::location::LocationError;
use crate::domain::value_objects::GeofenceError;

pub type MissionResult<T> = Result<T, MissionError>;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Mission not found")]
    MissionNotFound,

    /// Inactive or outside its schedule window
    #[error("Mission is not accepting submissions")]
    MissionClosed,

    #[error("Mission already submitted")]
    AlreadySubmitted,

    #[error("Outside mission area: {distance_m:.0} m from center, radius {radius_m:.0} m")]
    OutsideGeofence { distance_m: f64, radius_m: f64 },

    #[error("Cannot verify location: {0}")]
    LocationUnavailable(#[from] LocationError),

    #[error("Invalid geographic input: {0}")]
    InvalidGeofence(#[from] GeofenceError),

    #[error("Submission not found")]
    SubmissionNotFound,

    #[error("Submission already reviewed")]
    SubmissionAlreadyReviewed,

    #[error("Reward not found")]
    RewardNotFound,

    /// Inactive or out of stock
    #[error("Reward unavailable")]
    RewardUnavailable,

    #[error("Insufficient points: balance {balance}, cost {cost}")]
    InsufficientPoints { balance: i64, cost: i64 },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Caller identity missing or invalid")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MissionError {
    pub fn kind(&self) -> ErrorKind {
        use MissionError::*;
        match self {
            MissionNotFound | SubmissionNotFound | RewardNotFound => ErrorKind::NotFound,
            MissionClosed | RewardUnavailable => ErrorKind::Gone,
            AlreadySubmitted | SubmissionAlreadyReviewed | InsufficientPoints { .. } => {
                ErrorKind::Conflict
            }
            OutsideGeofence { .. } | Forbidden => ErrorKind::Forbidden,
            LocationUnavailable(_) => ErrorKind::UnprocessableEntity,
            InvalidGeofence(_) | Validation(_) | MissingHeader(_) => ErrorKind::BadRequest,
            Unauthorized => ErrorKind::Unauthorized,
            RateLimitExceeded => ErrorKind::TooManyRequests,
            Database(_) | Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    fn log(&self) {
        match self {
            MissionError::Database(e) => {
                tracing::error!(error = %e, "Mission database error");
            }
            MissionError::Internal(msg) => {
                tracing::error!(message = %msg, "Mission internal error");
            }
            MissionError::OutsideGeofence {
                distance_m,
                radius_m,
            } => {
                tracing::warn!(distance_m, radius_m, "Submission outside geofence");
            }
            MissionError::LocationUnavailable(reason) => {
                tracing::warn!(reason = %reason, "Submission location unavailable");
            }
            MissionError::RateLimitExceeded => {
                tracing::warn!("Mission rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Mission error");
            }
        }
    }
}

impl From<MissionError> for AppError {
    fn from(err: MissionError) -> Self {
        let kind = err.kind();
        match err {
            MissionError::OutsideGeofence { .. } => {
                AppError::new(kind, "You are too far from the mission location")
                    .with_action("Move closer to the mission area and try again")
            }
            MissionError::LocationUnavailable(_) => {
                AppError::new(kind, "We could not verify your location").with_action(
                    "Enable location access for the app and try again",
                )
            }
            MissionError::AlreadySubmitted => {
                AppError::new(kind, "You have already submitted this mission")
            }
            MissionError::MissionClosed => {
                AppError::new(kind, "This mission is no longer accepting submissions")
            }
            MissionError::InsufficientPoints { balance, cost } => AppError::new(
                kind,
                format!("This reward costs {cost} points; you have {balance}"),
            )
            .with_action("Complete more missions to earn points"),
            MissionError::RateLimitExceeded => {
                AppError::new(kind, "Too many requests").with_action("Wait a minute and try again")
            }
            // Never leak database or internal details to clients
            MissionError::Database(e) => AppError::new(kind, "Internal server error").with_source(e),
            MissionError::Internal(_) => AppError::new(kind, "Internal server error"),
            other => AppError::new(kind, other.to_string()),
        }
    }
}

impl IntoResponse for MissionError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<JsonRejection> for MissionError {
    fn from(rejection: JsonRejection) -> Self {
        MissionError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for MissionError {
    fn from(rejection: PathRejection) -> Self {
        MissionError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for MissionError {
    fn from(rejection: QueryRejection) -> Self {
        MissionError::Validation(rejection.body_text())
    }
}
