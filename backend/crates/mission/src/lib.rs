//! Missions Backend Module
//!
//! Brand-sponsored missions that users complete for points, some of them
//! only from inside a geofence.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, geofence math, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Rules
//! - A geofenced mission only accepts submissions reported from within its
//!   radius (great-circle distance, boundary inclusive)
//! - Missions without a complete geofence can be submitted from anywhere
//! - If the device position cannot be obtained the submission is refused
//! - Points are only credited when an admin approves, exactly once

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::MissionConfig;
pub use application::live_stats::LiveStats;
pub use domain::services::{haversine_distance_m, is_inside_radius};
pub use error::{MissionError, MissionResult};
pub use infra::postgres::{PgChangeFeed, PgMissionRepository};
pub use presentation::router::{mission_router, mission_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
