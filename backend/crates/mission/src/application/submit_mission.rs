//! Submit Mission Use Case

use crate::application::check_eligibility::locate;
use crate::application::config::MissionConfig;
use crate::domain::entities::Submission;
use crate::domain::location::LocationProvider;
use crate::domain::repository::{MissionRepository, RateLimitRepository, SubmissionRepository};
use crate::domain::services::{Eligibility, check_eligibility};
use crate::domain::value_objects::{Actor, GeoPoint, SubmissionStatus};
use crate::error::{MissionError, MissionResult};
use chrono::Utc;
use kernel::id::{MissionId, SubmissionId};
use std::net::IpAddr;
use std::sync::Arc;

const MAX_NOTE_LEN: usize = 1000;
const MAX_PROOF_URL_LEN: usize = 2048;

/// Input DTO for submit mission
#[derive(Debug, Clone)]
pub struct SubmitMissionInput {
    pub mission_id: MissionId,
    pub actor: Actor,
    pub proof_url: Option<String>,
    pub note: Option<String>,
    pub client_ip: Option<IpAddr>,
}

/// Output DTO for submit mission
#[derive(Debug, Clone)]
pub struct SubmitMissionOutput {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub distance_m: Option<f64>,
}

pub struct SubmitMissionUseCase<M, S, R>
where
    M: MissionRepository,
    S: SubmissionRepository,
    R: RateLimitRepository,
{
    mission_repo: Arc<M>,
    submission_repo: Arc<S>,
    rate_limit_repo: Arc<R>,
    config: Arc<MissionConfig>,
}

impl<M, S, R> SubmitMissionUseCase<M, S, R>
where
    M: MissionRepository,
    S: SubmissionRepository,
    R: RateLimitRepository,
{
    pub fn new(
        mission_repo: Arc<M>,
        submission_repo: Arc<S>,
        rate_limit_repo: Arc<R>,
        config: Arc<MissionConfig>,
    ) -> Self {
        Self {
            mission_repo,
            submission_repo,
            rate_limit_repo,
            config,
        }
    }

    pub async fn execute<L>(
        &self,
        input: SubmitMissionInput,
        location: &L,
    ) -> MissionResult<SubmitMissionOutput>
    where
        L: LocationProvider + Sync,
    {
        if !input.actor.role.can_submit_missions() {
            return Err(MissionError::Forbidden);
        }
        let user_id = input.actor.user_id;

        let proof_url = normalize_text(input.proof_url, MAX_PROOF_URL_LEN, "proofUrl")?;
        let note = normalize_text(input.note, MAX_NOTE_LEN, "note")?;

        let rate_key = format!("submit:{}", user_id);
        let allowed = self
            .rate_limit_repo
            .check_rate_limit(&rate_key, &self.config.submission_rate_limit)
            .await?;
        if !allowed {
            return Err(MissionError::RateLimitExceeded);
        }

        let mission = self
            .mission_repo
            .find_mission(input.mission_id)
            .await?
            .ok_or(MissionError::MissionNotFound)?;

        if !mission.is_open_at(Utc::now()) {
            return Err(MissionError::MissionClosed);
        }

        if let Some(previous) = self
            .submission_repo
            .latest_submission(input.mission_id, user_id)
            .await?
        {
            if previous.blocks_resubmission(self.config.allow_resubmission_after_rejection) {
                tracing::debug!(
                    mission_id = %input.mission_id,
                    previous_id = %previous.id,
                    status = previous.status.code(),
                    "Duplicate submission"
                );
                return Err(MissionError::AlreadySubmitted);
            }
        }

        // Geofenced missions must be verified before anything is stored
        let (position, eligibility): (Option<GeoPoint>, Eligibility) = match &mission.geofence {
            None => (None, Eligibility::Unrestricted),
            Some(fence) => {
                let position = locate(location, self.config.location_timeout).await?;
                (Some(position), check_eligibility(Some(fence), position))
            }
        };

        if let Eligibility::Outside {
            distance_m,
            radius_m,
        } = eligibility
        {
            return Err(MissionError::OutsideGeofence {
                distance_m,
                radius_m,
            });
        }

        let submission = Submission::new(
            mission.id,
            user_id,
            position,
            eligibility.distance_m(),
            proof_url,
            note,
            input.client_ip,
        );
        self.submission_repo.create_submission(&submission).await?;

        tracing::info!(
            submission_id = %submission.id,
            mission_id = %mission.id,
            user_id = %user_id,
            distance_m = submission.distance_m,
            "Mission submitted"
        );

        Ok(SubmitMissionOutput {
            submission_id: submission.id,
            status: submission.status,
            distance_m: submission.distance_m,
        })
    }
}

/// Trim optional free text; blank becomes `None`
fn normalize_text(
    value: Option<String>,
    max_len: usize,
    field: &str,
) -> MissionResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max_len {
        return Err(MissionError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(Some(value.to_string()))
}
