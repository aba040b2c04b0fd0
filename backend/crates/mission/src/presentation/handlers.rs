//! HTTP Handlers

use crate::application::check_eligibility::CheckEligibilityUseCase;
use crate::application::config::MissionConfig;
use crate::application::live_stats::ensure_can_view_stats;
use crate::application::missions::MissionCatalogUseCase;
use crate::application::review_submission::{ReviewSubmissionInput, ReviewSubmissionUseCase};
use crate::application::rewards::RewardsUseCase;
use crate::application::submission_history::SubmissionHistoryUseCase;
use crate::application::submit_mission::{SubmitMissionInput, SubmitMissionUseCase};
use crate::domain::entities::DashboardStats;
use crate::domain::repository::{
    MissionRepository, RateLimitRepository, RewardRepository, StatsRepository,
    SubmissionRepository,
};
use crate::domain::value_objects::SubmissionStatus;
use crate::error::MissionResult;
use crate::presentation::dto::{
    CreateMissionRequest, EligibilityRequest, EligibilityResponse, HealthResponse, ListQuery,
    MissionResponse, PointsResponse, RedeemResponse, ReviewQueueQuery, ReviewRequest,
    ReviewResponse, RewardResponse, SubmissionResponse, SubmitMissionRequest,
    SubmitMissionResponse, reported_location,
};
use crate::presentation::middleware::{AppJson, AppPath, AppQuery, Caller, ClientIp};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use kernel::id::{MissionId, RewardId, SubmissionId};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;

/// Everything the mission handlers need from storage
pub trait MissionStore:
    MissionRepository
    + SubmissionRepository
    + RewardRepository
    + RateLimitRepository
    + StatsRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> MissionStore for T where
    T: MissionRepository
        + SubmissionRepository
        + RewardRepository
        + RateLimitRepository
        + StatsRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared state for mission handlers
#[derive(Clone)]
pub struct MissionAppState<R>
where
    R: MissionStore,
{
    pub repo: Arc<R>,
    pub config: Arc<MissionConfig>,
    /// Latest dashboard snapshot, kept fresh by `LiveStats`
    pub stats: watch::Receiver<DashboardStats>,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/missions
pub async fn list_missions<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    _caller: Caller,
    AppQuery(query): AppQuery<ListQuery>,
) -> MissionResult<Json<Vec<MissionResponse>>> {
    let use_case = MissionCatalogUseCase::new(state.repo.clone(), state.config.clone());

    let missions = use_case.list_open(query.limit).await?;

    Ok(Json(missions.into_iter().map(Into::into).collect()))
}

/// POST /api/missions
pub async fn create_mission<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
    AppJson(req): AppJson<CreateMissionRequest>,
) -> MissionResult<(StatusCode, Json<MissionResponse>)> {
    let use_case = MissionCatalogUseCase::new(state.repo.clone(), state.config.clone());

    let mission = use_case.create(&actor, req.into()).await?;

    Ok((StatusCode::CREATED, Json(mission.into())))
}

/// GET /api/missions/{id}
pub async fn get_mission<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    _caller: Caller,
    AppPath(mission_id): AppPath<MissionId>,
) -> MissionResult<Json<MissionResponse>> {
    let use_case = MissionCatalogUseCase::new(state.repo.clone(), state.config.clone());

    let mission = use_case.get(mission_id).await?;

    Ok(Json(mission.into()))
}

/// POST /api/missions/{id}/eligibility
pub async fn check_eligibility<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    _caller: Caller,
    AppPath(mission_id): AppPath<MissionId>,
    AppJson(req): AppJson<EligibilityRequest>,
) -> MissionResult<Json<EligibilityResponse>> {
    let location = reported_location(req.location);

    let use_case = CheckEligibilityUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case.execute(mission_id, &location).await?;

    Ok(Json(output.into()))
}

/// POST /api/missions/{id}/submissions
pub async fn submit_mission<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
    ClientIp(client_ip): ClientIp,
    AppPath(mission_id): AppPath<MissionId>,
    AppJson(req): AppJson<SubmitMissionRequest>,
) -> MissionResult<(StatusCode, Json<SubmitMissionResponse>)> {
    let location = reported_location(req.location);

    let use_case = SubmitMissionUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let input = SubmitMissionInput {
        mission_id,
        actor,
        proof_url: req.proof_url,
        note: req.note,
        client_ip,
    };

    let output = use_case.execute(input, &location).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

/// GET /api/me/submissions
pub async fn my_submissions<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
    AppQuery(query): AppQuery<ListQuery>,
) -> MissionResult<Json<Vec<SubmissionResponse>>> {
    let use_case = SubmissionHistoryUseCase::new(state.repo.clone(), state.config.clone());

    let submissions = use_case.mine(&actor, query.limit).await?;

    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// GET /api/me/points
pub async fn my_points<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
) -> MissionResult<Json<PointsResponse>> {
    let use_case = RewardsUseCase::new(state.repo.clone());

    let balance = use_case.balance(&actor).await?;

    Ok(Json(PointsResponse {
        user_id: actor.user_id,
        balance,
    }))
}

/// GET /api/rewards
pub async fn list_rewards<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    _caller: Caller,
) -> MissionResult<Json<Vec<RewardResponse>>> {
    let use_case = RewardsUseCase::new(state.repo.clone());

    let rewards = use_case.list().await?;

    Ok(Json(rewards.into_iter().map(Into::into).collect()))
}

/// POST /api/rewards/{id}/redeem
pub async fn redeem_reward<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
    AppPath(reward_id): AppPath<RewardId>,
) -> MissionResult<(StatusCode, Json<RedeemResponse>)> {
    let use_case = RewardsUseCase::new(state.repo.clone());

    let output = use_case.redeem(&actor, reward_id).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

/// GET /api/admin/submissions?status=
pub async fn review_queue<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
    AppQuery(query): AppQuery<ReviewQueueQuery>,
) -> MissionResult<Json<Vec<SubmissionResponse>>> {
    let use_case = SubmissionHistoryUseCase::new(state.repo.clone(), state.config.clone());

    let status = query.status.unwrap_or(SubmissionStatus::Pending);
    let submissions = use_case.by_status(&actor, status, query.limit).await?;

    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/submissions/{id}/review
pub async fn review_submission<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
    AppPath(submission_id): AppPath<SubmissionId>,
    AppJson(req): AppJson<ReviewRequest>,
) -> MissionResult<Json<ReviewResponse>> {
    let use_case = ReviewSubmissionUseCase::new(state.repo.clone(), state.repo.clone());

    let input = ReviewSubmissionInput {
        submission_id,
        decision: req.decision,
        note: req.note,
    };

    let output = use_case.execute(&actor, input).await?;

    Ok(Json(output.into()))
}

/// GET /api/admin/stats
pub async fn stats_snapshot<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
) -> MissionResult<Json<DashboardStats>> {
    ensure_can_view_stats(&actor)?;

    let stats = state.stats.borrow().clone();

    Ok(Json(stats))
}

/// GET /api/admin/stats/stream
///
/// Server-sent events: the current snapshot first, then one `stats` event
/// per refresh.
pub async fn stats_stream<R: MissionStore>(
    State(state): State<MissionAppState<R>>,
    Caller(actor): Caller,
) -> MissionResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    ensure_can_view_stats(&actor)?;

    tracing::debug!(user_id = %actor.user_id, "Stats stream opened");

    let stream = WatchStream::new(state.stats.clone())
        .map(|stats| Event::default().event("stats").json_data(stats));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
