//! Mission catalog: browse open missions, create new ones

use crate::application::config::MissionConfig;
use crate::domain::entities::Mission;
use crate::domain::repository::MissionRepository;
use crate::domain::value_objects::{Actor, ActorRole, MissionGeofence, Points};
use crate::error::{MissionError, MissionResult};
use chrono::{DateTime, Utc};
use kernel::id::MissionId;
use std::sync::Arc;

const TITLE_MAX_LEN: usize = 200;
const DESCRIPTION_MAX_LEN: usize = 5000;

#[derive(Debug, Clone, Default)]
pub struct CreateMissionInput {
    pub title: String,
    pub description: String,
    pub points: i32,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_radius: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

pub struct MissionCatalogUseCase<M>
where
    M: MissionRepository,
{
    mission_repo: Arc<M>,
    config: Arc<MissionConfig>,
}

impl<M> MissionCatalogUseCase<M>
where
    M: MissionRepository,
{
    pub fn new(mission_repo: Arc<M>, config: Arc<MissionConfig>) -> Self {
        Self {
            mission_repo,
            config,
        }
    }

    pub async fn list_open(&self, limit: Option<i64>) -> MissionResult<Vec<Mission>> {
        self.mission_repo
            .list_open_missions(Utc::now(), self.config.page_size(limit))
            .await
    }

    pub async fn get(&self, mission_id: MissionId) -> MissionResult<Mission> {
        self.mission_repo
            .find_mission(mission_id)
            .await?
            .ok_or(MissionError::MissionNotFound)
    }

    /// Admins and brands only; brand missions are attributed to the brand
    pub async fn create(&self, actor: &Actor, input: CreateMissionInput) -> MissionResult<Mission> {
        if !actor.role.can_create_missions() {
            return Err(MissionError::Forbidden);
        }

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(MissionError::Validation("title cannot be empty".into()));
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(MissionError::Validation(format!(
                "title must be at most {TITLE_MAX_LEN} characters"
            )));
        }

        let description = input.description.trim().to_string();
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(MissionError::Validation(format!(
                "description must be at most {DESCRIPTION_MAX_LEN} characters"
            )));
        }

        let points = Points::new(input.points)
            .ok_or_else(|| MissionError::Validation("points must be positive".into()))?;

        let geofence = MissionGeofence::from_input(
            input.location_lat,
            input.location_lng,
            input.location_radius,
        )?;

        if let (Some(start), Some(end)) = (input.starts_at, input.ends_at) {
            if start >= end {
                return Err(MissionError::Validation(
                    "startsAt must be before endsAt".into(),
                ));
            }
        }

        let brand_id = (actor.role == ActorRole::Brand).then_some(actor.user_id);

        let mission = Mission::new(
            brand_id,
            title,
            description,
            points,
            geofence,
            input.starts_at,
            input.ends_at,
        );
        self.mission_repo.create_mission(&mission).await?;

        tracing::info!(
            mission_id = %mission.id,
            created_by = %actor.user_id,
            points = mission.points.value(),
            geofenced = mission.geofence.is_some(),
            "Mission created"
        );

        Ok(mission)
    }
}
