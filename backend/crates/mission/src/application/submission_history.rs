//! Submission listings: a user's own history and the admin review queue

use crate::application::config::MissionConfig;
use crate::domain::entities::Submission;
use crate::domain::repository::SubmissionRepository;
use crate::domain::value_objects::{Actor, SubmissionStatus};
use crate::error::{MissionError, MissionResult};
use std::sync::Arc;

pub struct SubmissionHistoryUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
    config: Arc<MissionConfig>,
}

impl<S> SubmissionHistoryUseCase<S>
where
    S: SubmissionRepository,
{
    pub fn new(submission_repo: Arc<S>, config: Arc<MissionConfig>) -> Self {
        Self {
            submission_repo,
            config,
        }
    }

    pub async fn mine(&self, actor: &Actor, limit: Option<i64>) -> MissionResult<Vec<Submission>> {
        self.submission_repo
            .list_user_submissions(actor.user_id, self.config.page_size(limit))
            .await
    }

    /// Admin only
    pub async fn by_status(
        &self,
        actor: &Actor,
        status: SubmissionStatus,
        limit: Option<i64>,
    ) -> MissionResult<Vec<Submission>> {
        if !actor.role.is_admin() {
            return Err(MissionError::Forbidden);
        }
        self.submission_repo
            .list_submissions_by_status(status, self.config.page_size(limit))
            .await
    }
}
