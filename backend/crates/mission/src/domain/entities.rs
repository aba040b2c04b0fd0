//! Domain Entities

use crate::domain::value_objects::{GeoPoint, MissionGeofence, Points, SubmissionStatus};
use chrono::{DateTime, Utc};
use kernel::id::{MissionId, RedemptionId, RewardId, SubmissionId, UserId};
use serde::Serialize;
use std::net::IpAddr;

/// A brand-sponsored task users complete for points
#[derive(Debug, Clone)]
pub struct Mission {
    pub id: MissionId,
    /// Set when a brand created the mission from its dashboard
    pub brand_id: Option<UserId>,
    pub title: String,
    pub description: String,
    pub points: Points,
    pub geofence: Option<MissionGeofence>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Mission {
    pub fn new(
        brand_id: Option<UserId>,
        title: String,
        description: String,
        points: Points,
        geofence: Option<MissionGeofence>,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: MissionId::new(),
            brand_id,
            title,
            description,
            points,
            geofence,
            is_active: true,
            starts_at,
            ends_at,
            created_at: Utc::now(),
        }
    }

    /// Accepting submissions at `now`: active and inside the schedule window
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now < end)
    }
}

/// A user's claim to have completed a mission
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub mission_id: MissionId,
    pub user_id: UserId,
    pub status: SubmissionStatus,
    /// Position reported at submit time (only for geofenced missions)
    pub location: Option<GeoPoint>,
    /// Distance to the geofence center in meters
    pub distance_m: Option<f64>,
    pub proof_url: Option<String>,
    pub note: Option<String>,
    pub review_note: Option<String>,
    pub client_ip: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn new(
        mission_id: MissionId,
        user_id: UserId,
        location: Option<GeoPoint>,
        distance_m: Option<f64>,
        proof_url: Option<String>,
        note: Option<String>,
        client_ip: Option<IpAddr>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            mission_id,
            user_id,
            status: SubmissionStatus::Pending,
            location,
            distance_m,
            proof_url,
            note,
            review_note: None,
            client_ip,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }

    /// Whether this submission stops the user from submitting the mission again
    pub fn blocks_resubmission(&self, allow_after_rejection: bool) -> bool {
        match self.status {
            SubmissionStatus::Pending | SubmissionStatus::Approved => true,
            SubmissionStatus::Rejected => !allow_after_rejection,
        }
    }
}

/// Something users can spend points on
#[derive(Debug, Clone)]
pub struct Reward {
    pub id: RewardId,
    pub title: String,
    pub description: String,
    pub cost: Points,
    /// `None` means unlimited
    pub stock: Option<i32>,
    pub is_active: bool,
}

impl Reward {
    pub fn is_available(&self) -> bool {
        self.is_active && self.stock.is_none_or(|left| left > 0)
    }
}

#[derive(Debug, Clone)]
pub struct Redemption {
    pub id: RedemptionId,
    pub reward_id: RewardId,
    pub user_id: UserId,
    pub points_spent: Points,
    pub created_at: DateTime<Utc>,
}

impl Redemption {
    pub fn new(reward: &Reward, user_id: UserId) -> Self {
        Self {
            id: RedemptionId::new(),
            reward_id: reward.id,
            user_id,
            points_spent: reward.cost,
            created_at: Utc::now(),
        }
    }
}

/// Result of an atomic redemption attempt
#[derive(Debug, Clone)]
pub enum RedeemOutcome {
    Redeemed(Redemption),
    InsufficientPoints { balance: i64 },
    Unavailable,
}

/// Admin dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_missions: i64,
    pub pending_submissions: i64,
    pub approved_submissions: i64,
    pub total_points_awarded: i64,
    pub total_redemptions: i64,
}

/// Kind of row change announced by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// Row-change notification, wire format `<table>:<OP>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChange {
    pub table: String,
    pub op: ChangeOp,
}

impl TableChange {
    /// Placeholder for "changes may have been missed", e.g. after a reconnect
    pub fn resync() -> Self {
        Self {
            table: "*".to_string(),
            op: ChangeOp::Update,
        }
    }

    pub fn parse(payload: &str) -> Option<Self> {
        let (table, op) = payload.split_once(':')?;
        let op = match op.trim().to_ascii_uppercase().as_str() {
            "INSERT" => ChangeOp::Insert,
            "UPDATE" => ChangeOp::Update,
            "DELETE" => ChangeOp::Delete,
            _ => return None,
        };
        let table = table.trim();
        if table.is_empty() {
            return None;
        }
        Some(Self {
            table: table.to_string(),
            op,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn mission() -> Mission {
        Mission::new(
            None,
            "Visit the flagship store".into(),
            "Take a photo at the entrance".into(),
            Points::new(50).unwrap(),
            None,
            None,
            None,
        )
    }

    #[test]
    fn test_mission_open_without_window() {
        let m = mission();
        assert!(m.is_open_at(Utc::now()));
    }

    #[test]
    fn test_mission_window() {
        let now = Utc::now();
        let mut m = mission();
        m.starts_at = Some(now + Duration::hours(1));
        assert!(!m.is_open_at(now));

        m.starts_at = Some(now - Duration::hours(1));
        m.ends_at = Some(now);
        assert!(!m.is_open_at(now), "end bound is exclusive");

        m.ends_at = Some(now + Duration::minutes(1));
        assert!(m.is_open_at(now));

        m.is_active = false;
        assert!(!m.is_open_at(now));
    }

    #[test]
    fn test_submission_starts_pending() {
        let s = Submission::new(
            MissionId::new(),
            UserId::new(),
            None,
            None,
            None,
            None,
            None,
        );
        assert_eq!(s.status, SubmissionStatus::Pending);
        assert!(s.reviewed_at.is_none());
        assert!(s.blocks_resubmission(true));
    }

    #[test]
    fn test_rejected_submission_blocking_follows_config() {
        let mut s = Submission::new(
            MissionId::new(),
            UserId::new(),
            None,
            None,
            None,
            None,
            None,
        );
        s.status = SubmissionStatus::Rejected;
        assert!(!s.blocks_resubmission(true));
        assert!(s.blocks_resubmission(false));
    }

    #[test]
    fn test_reward_availability() {
        let mut reward = Reward {
            id: RewardId::new(),
            title: "Coffee".into(),
            description: String::new(),
            cost: Points::new(100).unwrap(),
            stock: None,
            is_active: true,
        };
        assert!(reward.is_available());

        reward.stock = Some(0);
        assert!(!reward.is_available());

        reward.stock = Some(3);
        reward.is_active = false;
        assert!(!reward.is_available());
    }

    #[test]
    fn test_table_change_parse() {
        assert_eq!(
            TableChange::parse("submissions:INSERT"),
            Some(TableChange {
                table: "submissions".into(),
                op: ChangeOp::Insert
            })
        );
        assert_eq!(
            TableChange::parse("missions:update").map(|c| c.op),
            Some(ChangeOp::Update)
        );
        assert_eq!(TableChange::parse("missions"), None);
        assert_eq!(TableChange::parse(":DELETE"), None);
        assert_eq!(TableChange::parse("missions:TRUNCATE"), None);
    }
}
