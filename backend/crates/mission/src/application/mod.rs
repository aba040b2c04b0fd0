//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod check_eligibility;
pub mod config;
pub mod live_stats;
pub mod missions;
pub mod review_submission;
pub mod rewards;
pub mod submission_history;
pub mod submit_mission;
