//! PostgreSQL Repository Implementations

use crate::domain::entities::{
    DashboardStats, Mission, RedeemOutcome, Redemption, Reward, Submission, TableChange,
};
use crate::domain::repository::{
    ChangeFeed, MissionRepository, RateLimitRepository, RewardRepository, StatsRepository,
    SubmissionRepository,
};
use crate::domain::value_objects::{GeoPoint, MissionGeofence, Points, SubmissionStatus};
use crate::error::{MissionError, MissionResult};
use chrono::{DateTime, Utc};
use kernel::id::{MissionId, RewardId, SubmissionId, UserId};
use platform::rate_limit::RateLimitConfig;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use uuid::Uuid;

const OLD_WINDOW_MS: i64 = 3600_000; // 1 hour

const MISSION_COLUMNS: &str = r#"
    mission_id,
    brand_id,
    title,
    description,
    points,
    location_lat,
    location_lng,
    location_radius,
    is_active,
    starts_at,
    ends_at,
    created_at
"#;

const SUBMISSION_COLUMNS: &str = r#"
    submission_id,
    mission_id,
    user_id,
    status,
    location_lat,
    location_lng,
    distance_m,
    proof_url,
    note,
    review_note,
    host(client_ip) AS client_ip,
    created_at,
    reviewed_at
"#;

const REWARD_COLUMNS: &str = "reward_id, title, description, cost, stock, is_active";

/// Partial unique index allowing one pending or approved submission per user and mission
const ACTIVE_SUBMISSION_INDEX: &str = "submissions_one_active_idx";

fn is_active_submission_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(ACTIVE_SUBMISSION_INDEX)
        }
        _ => false,
    }
}

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgMissionRepository {
    pool: PgPool,
}

impl PgMissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drop rate limit windows older than an hour
    pub async fn cleanup_expired(&self) -> MissionResult<u64> {
        let cutoff_ms = Utc::now().timestamp_millis() - OLD_WINDOW_MS;

        let deleted = sqlx::query("DELETE FROM rate_limits WHERE window_start_ms < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(rate_limits = deleted, "Cleaned up expired rate limit windows");

        Ok(deleted)
    }
}

impl MissionRepository for PgMissionRepository {
    async fn create_mission(&self, mission: &Mission) -> MissionResult<()> {
        let (lat, lng, radius) = match mission.geofence {
            Some(fence) => (
                Some(fence.center.latitude()),
                Some(fence.center.longitude()),
                Some(fence.radius.meters()),
            ),
            None => (None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO missions (
                mission_id,
                brand_id,
                title,
                description,
                points,
                location_lat,
                location_lng,
                location_radius,
                is_active,
                starts_at,
                ends_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(mission.id.into_uuid())
        .bind(mission.brand_id.map(UserId::into_uuid))
        .bind(&mission.title)
        .bind(&mission.description)
        .bind(mission.points.value())
        .bind(lat)
        .bind(lng)
        .bind(radius)
        .bind(mission.is_active)
        .bind(mission.starts_at)
        .bind(mission.ends_at)
        .bind(mission.created_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(mission_id = %mission.id, "Mission row created");

        Ok(())
    }

    async fn find_mission(&self, mission_id: MissionId) -> MissionResult<Option<Mission>> {
        let row = sqlx::query_as::<_, MissionRow>(&format!(
            "SELECT {MISSION_COLUMNS} FROM missions WHERE mission_id = $1"
        ))
        .bind(mission_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MissionRow::into_mission).transpose()
    }

    async fn list_open_missions(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> MissionResult<Vec<Mission>> {
        let rows = sqlx::query_as::<_, MissionRow>(&format!(
            r#"
            SELECT {MISSION_COLUMNS}
            FROM missions
            WHERE is_active
              AND (starts_at IS NULL OR starts_at <= $1)
              AND (ends_at IS NULL OR ends_at > $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MissionRow::into_mission).collect()
    }
}

impl SubmissionRepository for PgMissionRepository {
    async fn create_submission(&self, submission: &Submission) -> MissionResult<()> {
        sqlx::query(
            r#"
            INSERT INTO submissions (
                submission_id,
                mission_id,
                user_id,
                status,
                location_lat,
                location_lng,
                distance_m,
                proof_url,
                note,
                client_ip,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::inet, $11)
            "#,
        )
        .bind(submission.id.into_uuid())
        .bind(submission.mission_id.into_uuid())
        .bind(submission.user_id.into_uuid())
        .bind(submission.status.code())
        .bind(submission.location.map(|p| p.latitude()))
        .bind(submission.location.map(|p| p.longitude()))
        .bind(submission.distance_m)
        .bind(&submission.proof_url)
        .bind(&submission.note)
        .bind(submission.client_ip.map(|ip| ip.to_string()))
        .bind(submission.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // A concurrent submit got there first
            if is_active_submission_conflict(&e) {
                MissionError::AlreadySubmitted
            } else {
                MissionError::Database(e)
            }
        })?;

        tracing::info!(
            submission_id = %submission.id,
            mission_id = %submission.mission_id,
            "Submission row created"
        );

        Ok(())
    }

    async fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> MissionResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = $1"
        ))
        .bind(submission_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubmissionRow::into_submission).transpose()
    }

    async fn latest_submission(
        &self,
        mission_id: MissionId,
        user_id: UserId,
    ) -> MissionResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE mission_id = $1 AND user_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(mission_id.into_uuid())
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubmissionRow::into_submission).transpose()
    }

    async fn list_user_submissions(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> MissionResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id.into_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    async fn list_submissions_by_status(
        &self,
        status: SubmissionStatus,
        limit: i64,
    ) -> MissionResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE status = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#
        ))
        .bind(status.code())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    async fn review_submission(
        &self,
        submission_id: SubmissionId,
        status: SubmissionStatus,
        review_note: Option<&str>,
        reward: Points,
    ) -> MissionResult<Option<Submission>> {
        let mut tx = self.pool.begin().await?;

        // Only a pending row can transition; a concurrent review finds nothing
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            UPDATE submissions
            SET status = $2, review_note = $3, reviewed_at = now()
            WHERE submission_id = $1 AND status = 'pending'
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(submission_id.into_uuid())
        .bind(status.code())
        .bind(review_note)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tracing::warn!(submission_id = %submission_id, "Submission no longer pending");
            return Ok(None);
        };
        let submission = row.into_submission()?;

        if status == SubmissionStatus::Approved {
            sqlx::query(
                r#"
                INSERT INTO points_ledger (user_id, delta, submission_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(submission.user_id.into_uuid())
            .bind(reward.value())
            .bind(submission.id.into_uuid())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            submission_id = %submission.id,
            status = status.code(),
            "Submission row reviewed"
        );

        Ok(Some(submission))
    }
}

impl RewardRepository for PgMissionRepository {
    async fn points_balance(&self, user_id: UserId) -> MissionResult<i64> {
        let balance = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM points_ledger WHERE user_id = $1",
        )
        .bind(user_id.into_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    async fn list_active_rewards(&self) -> MissionResult<Vec<Reward>> {
        let rows = sqlx::query_as::<_, RewardRow>(&format!(
            r#"
            SELECT {REWARD_COLUMNS}
            FROM rewards
            WHERE is_active AND (stock IS NULL OR stock > 0)
            ORDER BY cost ASC, title ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RewardRow::into_reward).collect()
    }

    async fn find_reward(&self, reward_id: RewardId) -> MissionResult<Option<Reward>> {
        let row = sqlx::query_as::<_, RewardRow>(&format!(
            "SELECT {REWARD_COLUMNS} FROM rewards WHERE reward_id = $1"
        ))
        .bind(reward_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RewardRow::into_reward).transpose()
    }

    async fn redeem_reward(
        &self,
        reward_id: RewardId,
        user_id: UserId,
    ) -> MissionResult<RedeemOutcome> {
        let mut tx = self.pool.begin().await?;

        // Serialize redemptions per user so two requests cannot spend the same points
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, RewardRow>(&format!(
            "SELECT {REWARD_COLUMNS} FROM rewards WHERE reward_id = $1 FOR UPDATE"
        ))
        .bind(reward_id.into_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(reward) = row.map(RewardRow::into_reward).transpose()? else {
            return Ok(RedeemOutcome::Unavailable);
        };
        if !reward.is_available() {
            return Ok(RedeemOutcome::Unavailable);
        }

        let balance = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM points_ledger WHERE user_id = $1",
        )
        .bind(user_id.into_uuid())
        .fetch_one(&mut *tx)
        .await?;

        if balance < i64::from(reward.cost) {
            return Ok(RedeemOutcome::InsufficientPoints { balance });
        }

        let redemption = Redemption::new(&reward, user_id);

        sqlx::query(
            "UPDATE rewards SET stock = stock - 1 WHERE reward_id = $1 AND stock IS NOT NULL",
        )
        .bind(reward.id.into_uuid())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO redemptions (redemption_id, reward_id, user_id, points_spent, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(redemption.id.into_uuid())
        .bind(redemption.reward_id.into_uuid())
        .bind(redemption.user_id.into_uuid())
        .bind(redemption.points_spent.value())
        .bind(redemption.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO points_ledger (user_id, delta, redemption_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.into_uuid())
        .bind(-redemption.points_spent.value())
        .bind(redemption.id.into_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RedeemOutcome::Redeemed(redemption))
    }
}

impl RateLimitRepository for PgMissionRepository {
    async fn check_rate_limit(&self, key: &str, config: &RateLimitConfig) -> MissionResult<bool> {
        let now_ms = Utc::now().timestamp_millis();
        let window_start = config.window_start_ms(now_ms);

        let count = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO rate_limits (limit_key, window_start_ms, request_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (limit_key, window_start_ms)
            DO UPDATE SET request_count = rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(key)
        .bind(window_start)
        .fetch_one(&self.pool)
        .await?;

        let allowed = config.allows(count.max(0) as u32);
        if !allowed {
            tracing::warn!(
                key = key,
                count = count,
                max = config.max_requests,
                "Rate limit exceeded"
            );
        }

        Ok(allowed)
    }
}

impl StatsRepository for PgMissionRepository {
    async fn dashboard_stats(&self) -> MissionResult<DashboardStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM missions WHERE is_active) AS active_missions,
                (SELECT COUNT(*) FROM submissions WHERE status = 'pending') AS pending_submissions,
                (SELECT COUNT(*) FROM submissions WHERE status = 'approved') AS approved_submissions,
                (SELECT COALESCE(SUM(delta), 0)::BIGINT FROM points_ledger WHERE delta > 0)
                    AS total_points_awarded,
                (SELECT COUNT(*) FROM redemptions) AS total_redemptions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            active_missions: row.active_missions,
            pending_submissions: row.pending_submissions,
            approved_submissions: row.approved_submissions,
            total_points_awarded: row.total_points_awarded,
            total_redemptions: row.total_redemptions,
        })
    }
}

/// Row changes delivered through `LISTEN <channel>`
pub struct PgChangeFeed {
    listener: PgListener,
}

impl PgChangeFeed {
    pub async fn connect(pool: &PgPool, channel: &str) -> MissionResult<Self> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(channel).await?;

        tracing::info!(channel = channel, "Listening for row changes");

        Ok(Self { listener })
    }
}

impl ChangeFeed for PgChangeFeed {
    async fn next_change(&mut self) -> MissionResult<Option<TableChange>> {
        loop {
            match self.listener.try_recv().await? {
                Some(notification) => match TableChange::parse(notification.payload()) {
                    Some(change) => return Ok(Some(change)),
                    None => {
                        tracing::warn!(
                            payload = notification.payload(),
                            "Ignoring malformed change notification"
                        );
                    }
                },
                None => {
                    // Listener reconnects on the next call; notifications may be lost
                    tracing::warn!("Change feed connection lost");
                    return Ok(Some(TableChange::resync()));
                }
            }
        }
    }
}

// Internal row types for sqlx mapping

#[derive(sqlx::FromRow)]
struct MissionRow {
    mission_id: Uuid,
    brand_id: Option<Uuid>,
    title: String,
    description: String,
    points: i32,
    location_lat: Option<f64>,
    location_lng: Option<f64>,
    location_radius: Option<f64>,
    is_active: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl MissionRow {
    fn into_mission(self) -> MissionResult<Mission> {
        let points = Points::new(self.points).ok_or_else(|| {
            MissionError::Internal(format!("mission {} has non-positive points", self.mission_id))
        })?;
        let geofence =
            MissionGeofence::from_columns(self.location_lat, self.location_lng, self.location_radius)
                .map_err(|e| {
                    MissionError::Internal(format!(
                        "mission {} has a malformed geofence: {e}",
                        self.mission_id
                    ))
                })?;

        Ok(Mission {
            id: MissionId::from(self.mission_id),
            brand_id: self.brand_id.map(UserId::from),
            title: self.title,
            description: self.description,
            points,
            geofence,
            is_active: self.is_active,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    submission_id: Uuid,
    mission_id: Uuid,
    user_id: Uuid,
    status: String,
    location_lat: Option<f64>,
    location_lng: Option<f64>,
    distance_m: Option<f64>,
    proof_url: Option<String>,
    note: Option<String>,
    review_note: Option<String>,
    client_ip: Option<String>,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl SubmissionRow {
    fn into_submission(self) -> MissionResult<Submission> {
        let status = SubmissionStatus::from_code(&self.status).ok_or_else(|| {
            MissionError::Internal(format!(
                "submission {} has unknown status {:?}",
                self.submission_id, self.status
            ))
        })?;
        let location = match (self.location_lat, self.location_lng) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).ok(),
            _ => None,
        };

        Ok(Submission {
            id: SubmissionId::from(self.submission_id),
            mission_id: MissionId::from(self.mission_id),
            user_id: UserId::from(self.user_id),
            status,
            location,
            distance_m: self.distance_m,
            proof_url: self.proof_url,
            note: self.note,
            review_note: self.review_note,
            client_ip: self.client_ip.and_then(|s| s.parse().ok()),
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RewardRow {
    reward_id: Uuid,
    title: String,
    description: String,
    cost: i32,
    stock: Option<i32>,
    is_active: bool,
}

impl RewardRow {
    fn into_reward(self) -> MissionResult<Reward> {
        let cost = Points::new(self.cost).ok_or_else(|| {
            MissionError::Internal(format!("reward {} has non-positive cost", self.reward_id))
        })?;

        Ok(Reward {
            id: RewardId::from(self.reward_id),
            title: self.title,
            description: self.description,
            cost,
            stock: self.stock,
            is_active: self.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    active_missions: i64,
    pending_submissions: i64,
    approved_submissions: i64,
    total_points_awarded: i64,
    total_redemptions: i64,
}
