//! Check Eligibility Use Case
//!
//! Lets the app tell a user whether they are close enough before they
//! bother uploading proof.

use crate::application::config::MissionConfig;
use crate::domain::location::{LocationError, LocationProvider};
use crate::domain::repository::MissionRepository;
use crate::domain::services::{Eligibility, check_eligibility};
use crate::domain::value_objects::GeoPoint;
use crate::error::{MissionError, MissionResult};
use kernel::id::MissionId;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EligibilityOutput {
    pub mission_id: MissionId,
    pub eligibility: Eligibility,
}

pub struct CheckEligibilityUseCase<M>
where
    M: MissionRepository,
{
    mission_repo: Arc<M>,
    config: Arc<MissionConfig>,
}

impl<M> CheckEligibilityUseCase<M>
where
    M: MissionRepository,
{
    pub fn new(mission_repo: Arc<M>, config: Arc<MissionConfig>) -> Self {
        Self {
            mission_repo,
            config,
        }
    }

    pub async fn execute<L>(
        &self,
        mission_id: MissionId,
        location: &L,
    ) -> MissionResult<EligibilityOutput>
    where
        L: LocationProvider + Sync,
    {
        let mission = self
            .mission_repo
            .find_mission(mission_id)
            .await?
            .ok_or(MissionError::MissionNotFound)?;

        // No geofence: the position is never needed
        let Some(fence) = mission.geofence else {
            return Ok(EligibilityOutput {
                mission_id,
                eligibility: Eligibility::Unrestricted,
            });
        };

        let position = locate(location, self.config.location_timeout).await?;
        let eligibility = check_eligibility(Some(&fence), position);

        tracing::debug!(
            mission_id = %mission_id,
            eligible = eligibility.is_eligible(),
            distance_m = eligibility.distance_m(),
            "Eligibility checked"
        );

        Ok(EligibilityOutput {
            mission_id,
            eligibility,
        })
    }
}

/// Ask the provider for a position, bounded by `timeout`. Never retried.
pub(crate) async fn locate<L>(provider: &L, timeout: Duration) -> MissionResult<GeoPoint>
where
    L: LocationProvider + Sync,
{
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_elapsed) => Err(MissionError::LocationUnavailable(LocationError::Timeout)),
    }
}
