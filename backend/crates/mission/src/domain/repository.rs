//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entities::{
    DashboardStats, Mission, RedeemOutcome, Reward, Submission, TableChange,
};
use crate::domain::value_objects::{Points, SubmissionStatus};
use crate::error::MissionResult;
use chrono::{DateTime, Utc};
use kernel::id::{MissionId, RewardId, SubmissionId, UserId};
use platform::rate_limit::RateLimitConfig;

/// Mission repository trait
#[trait_variant::make(MissionRepository: Send)]
pub trait LocalMissionRepository {
    async fn create_mission(&self, mission: &Mission) -> MissionResult<()>;

    async fn find_mission(&self, mission_id: MissionId) -> MissionResult<Option<Mission>>;

    /// Missions accepting submissions at `now`, newest first
    async fn list_open_missions(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> MissionResult<Vec<Mission>>;
}

/// Submission repository trait
#[trait_variant::make(SubmissionRepository: Send)]
pub trait LocalSubmissionRepository {
    /// Fails with `AlreadySubmitted` if the user already has a pending or
    /// approved submission for the mission, however close the two inserts are
    async fn create_submission(&self, submission: &Submission) -> MissionResult<()>;

    async fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> MissionResult<Option<Submission>>;

    /// Most recent submission of `user_id` for `mission_id`
    async fn latest_submission(
        &self,
        mission_id: MissionId,
        user_id: UserId,
    ) -> MissionResult<Option<Submission>>;

    async fn list_user_submissions(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> MissionResult<Vec<Submission>>;

    /// Oldest first, so the review queue is worked in arrival order
    async fn list_submissions_by_status(
        &self,
        status: SubmissionStatus,
        limit: i64,
    ) -> MissionResult<Vec<Submission>>;

    /// Move a pending submission to `status` atomically
    ///
    /// Approvals credit `reward` points to the submitter in the same
    /// transaction. Returns `None` when the submission is no longer pending.
    async fn review_submission(
        &self,
        submission_id: SubmissionId,
        status: SubmissionStatus,
        review_note: Option<&str>,
        reward: Points,
    ) -> MissionResult<Option<Submission>>;
}

/// Points ledger and reward catalog
#[trait_variant::make(RewardRepository: Send)]
pub trait LocalRewardRepository {
    async fn points_balance(&self, user_id: UserId) -> MissionResult<i64>;

    async fn list_active_rewards(&self) -> MissionResult<Vec<Reward>>;

    async fn find_reward(&self, reward_id: RewardId) -> MissionResult<Option<Reward>>;

    /// Check stock and balance, then spend, in one transaction
    async fn redeem_reward(&self, reward_id: RewardId, user_id: UserId)
    -> MissionResult<RedeemOutcome>;
}

/// Rate limit repository trait
#[trait_variant::make(RateLimitRepository: Send)]
pub trait LocalRateLimitRepository {
    /// Count a request for `key`; true if it is within the limit
    async fn check_rate_limit(&self, key: &str, config: &RateLimitConfig) -> MissionResult<bool>;
}

#[trait_variant::make(StatsRepository: Send)]
pub trait LocalStatsRepository {
    async fn dashboard_stats(&self) -> MissionResult<DashboardStats>;
}

/// Stream of row-change notifications
#[trait_variant::make(ChangeFeed: Send)]
pub trait LocalChangeFeed {
    /// Next change; `None` once the feed has ended
    async fn next_change(&mut self) -> MissionResult<Option<TableChange>>;
}
