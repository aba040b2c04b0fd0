//! Mission Router

use crate::application::config::MissionConfig;
use crate::domain::entities::DashboardStats;
use crate::infra::postgres::PgMissionRepository;
use crate::presentation::handlers::{self, MissionAppState, MissionStore};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::watch;

/// Create the mission router with PostgreSQL repository
pub fn mission_router(
    repo: PgMissionRepository,
    config: MissionConfig,
    stats: watch::Receiver<DashboardStats>,
) -> Router {
    mission_router_generic(repo, config, stats)
}

/// Create a generic mission router for any repository implementation
pub fn mission_router_generic<R>(
    repo: R,
    config: MissionConfig,
    stats: watch::Receiver<DashboardStats>,
) -> Router
where
    R: MissionStore,
{
    let state = MissionAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        stats,
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/missions",
            get(handlers::list_missions::<R>).post(handlers::create_mission::<R>),
        )
        .route("/missions/{id}", get(handlers::get_mission::<R>))
        .route(
            "/missions/{id}/eligibility",
            post(handlers::check_eligibility::<R>),
        )
        .route(
            "/missions/{id}/submissions",
            post(handlers::submit_mission::<R>),
        )
        .route("/me/submissions", get(handlers::my_submissions::<R>))
        .route("/me/points", get(handlers::my_points::<R>))
        .route("/rewards", get(handlers::list_rewards::<R>))
        .route("/rewards/{id}/redeem", post(handlers::redeem_reward::<R>))
        .route("/admin/submissions", get(handlers::review_queue::<R>))
        .route(
            "/admin/submissions/{id}/review",
            post(handlers::review_submission::<R>),
        )
        .route("/admin/stats", get(handlers::stats_snapshot::<R>))
        .route("/admin/stats/stream", get(handlers::stats_stream::<R>))
        .with_state(state)
}
