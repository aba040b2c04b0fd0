//! API DTOs (Data Transfer Objects)

use crate::application::check_eligibility::EligibilityOutput;
use crate::application::missions::CreateMissionInput;
use crate::application::review_submission::ReviewSubmissionOutput;
use crate::application::rewards::RedeemRewardOutput;
use crate::application::submit_mission::SubmitMissionOutput;
use crate::domain::entities::{Mission, Reward, Submission};
use crate::domain::location::{LocationError, ReportedLocation};
use crate::domain::value_objects::{GeoPoint, ReviewDecision, SubmissionStatus};
use chrono::{DateTime, Utc};
use kernel::id::{MissionId, RedemptionId, RewardId, SubmissionId, UserId};
use serde::{Deserialize, Serialize};

/// Device position as sampled by the client app
///
/// Either `{ latitude, longitude }` or `{ error }` when the device could not
/// produce a fix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub error: Option<LocationError>,
}

impl LocationReport {
    /// Coordinates are only validated once a geofence needs them
    pub fn into_reported(self) -> ReportedLocation {
        if let Some(error) = self.error {
            return ReportedLocation::failed(error);
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => ReportedLocation::coordinates(lat, lng),
            _ => ReportedLocation::missing(),
        }
    }
}

pub(crate) fn reported_location(report: Option<LocationReport>) -> ReportedLocation {
    report.map_or_else(ReportedLocation::missing, LocationReport::into_reported)
}

/// Request for POST /api/missions/{id}/eligibility
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EligibilityRequest {
    #[serde(default)]
    pub location: Option<LocationReport>,
}

/// Response for POST /api/missions/{id}/eligibility
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub mission_id: MissionId,
    pub eligible: bool,
    pub distance_m: Option<f64>,
    pub radius_m: Option<f64>,
}

impl From<EligibilityOutput> for EligibilityResponse {
    fn from(output: EligibilityOutput) -> Self {
        Self {
            mission_id: output.mission_id,
            eligible: output.eligibility.is_eligible(),
            distance_m: output.eligibility.distance_m(),
            radius_m: output.eligibility.radius_m(),
        }
    }
}

/// Request for POST /api/missions/{id}/submissions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMissionRequest {
    #[serde(default)]
    pub location: Option<LocationReport>,
    #[serde(default)]
    pub proof_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Response for POST /api/missions/{id}/submissions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMissionResponse {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub distance_m: Option<f64>,
}

impl From<SubmitMissionOutput> for SubmitMissionResponse {
    fn from(output: SubmitMissionOutput) -> Self {
        Self {
            submission_id: output.submission_id,
            status: output.status,
            distance_m: output.distance_m,
        }
    }
}

/// Request for POST /api/missions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMissionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub points: i32,
    #[serde(default)]
    pub location_lat: Option<f64>,
    #[serde(default)]
    pub location_lng: Option<f64>,
    #[serde(default)]
    pub location_radius: Option<f64>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<CreateMissionRequest> for CreateMissionInput {
    fn from(req: CreateMissionRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            points: req.points,
            location_lat: req.location_lat,
            location_lng: req.location_lng,
            location_radius: req.location_radius,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionResponse {
    pub id: MissionId,
    pub brand_id: Option<UserId>,
    pub title: String,
    pub description: String,
    pub points: i32,
    /// Absent for missions that can be completed anywhere
    pub geofence: Option<GeofenceResponse>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Mission> for MissionResponse {
    fn from(mission: Mission) -> Self {
        Self {
            id: mission.id,
            brand_id: mission.brand_id,
            title: mission.title,
            description: mission.description,
            points: mission.points.value(),
            geofence: mission.geofence.map(|fence| GeofenceResponse {
                latitude: fence.center.latitude(),
                longitude: fence.center.longitude(),
                radius_m: fence.radius.meters(),
            }),
            is_active: mission.is_active,
            starts_at: mission.starts_at,
            ends_at: mission.ends_at,
            created_at: mission.created_at,
        }
    }
}

/// Query for list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query for GET /api/admin/submissions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQueueQuery {
    /// Defaults to `pending`
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub mission_id: MissionId,
    pub user_id: UserId,
    pub status: SubmissionStatus,
    pub location: Option<GeoPoint>,
    pub distance_m: Option<f64>,
    pub proof_url: Option<String>,
    pub note: Option<String>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            mission_id: submission.mission_id,
            user_id: submission.user_id,
            status: submission.status,
            location: submission.location,
            distance_m: submission.distance_m,
            proof_url: submission.proof_url,
            note: submission.note,
            review_note: submission.review_note,
            created_at: submission.created_at,
            reviewed_at: submission.reviewed_at,
        }
    }
}

/// Request for POST /api/admin/submissions/{id}/review
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub submission: SubmissionResponse,
    pub points_awarded: Option<i32>,
}

impl From<ReviewSubmissionOutput> for ReviewResponse {
    fn from(output: ReviewSubmissionOutput) -> Self {
        Self {
            submission: output.submission.into(),
            points_awarded: output.points_awarded,
        }
    }
}

/// Response for GET /api/me/points
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub user_id: UserId,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardResponse {
    pub id: RewardId,
    pub title: String,
    pub description: String,
    pub cost: i32,
    /// `null` means unlimited
    pub stock: Option<i32>,
}

impl From<Reward> for RewardResponse {
    fn from(reward: Reward) -> Self {
        Self {
            id: reward.id,
            title: reward.title,
            description: reward.description,
            cost: reward.cost.value(),
            stock: reward.stock,
        }
    }
}

/// Response for POST /api/rewards/{id}/redeem
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub redemption_id: RedemptionId,
    pub reward_id: RewardId,
    pub points_spent: i32,
    pub balance: i64,
    pub redeemed_at: DateTime<Utc>,
}

impl From<RedeemRewardOutput> for RedeemResponse {
    fn from(output: RedeemRewardOutput) -> Self {
        Self {
            redemption_id: output.redemption.id,
            reward_id: output.redemption.reward_id,
            points_spent: output.redemption.points_spent.value(),
            balance: output.balance,
            redeemed_at: output.redemption.created_at,
        }
    }
}

/// Response for GET /api/health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
