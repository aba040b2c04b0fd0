//! Review Submission Use Case

use crate::domain::entities::Submission;
use crate::domain::repository::{MissionRepository, SubmissionRepository};
use crate::domain::value_objects::{Actor, ReviewDecision, SubmissionStatus};
use crate::error::{MissionError, MissionResult};
use kernel::id::SubmissionId;
use std::sync::Arc;

const MAX_REVIEW_NOTE_LEN: usize = 1000;

#[derive(Debug, Clone)]
pub struct ReviewSubmissionInput {
    pub submission_id: SubmissionId,
    pub decision: ReviewDecision,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewSubmissionOutput {
    pub submission: Submission,
    /// Points credited to the submitter (approvals only)
    pub points_awarded: Option<i32>,
}

pub struct ReviewSubmissionUseCase<M, S>
where
    M: MissionRepository,
    S: SubmissionRepository,
{
    mission_repo: Arc<M>,
    submission_repo: Arc<S>,
}

impl<M, S> ReviewSubmissionUseCase<M, S>
where
    M: MissionRepository,
    S: SubmissionRepository,
{
    pub fn new(mission_repo: Arc<M>, submission_repo: Arc<S>) -> Self {
        Self {
            mission_repo,
            submission_repo,
        }
    }

    pub async fn execute(
        &self,
        reviewer: &Actor,
        input: ReviewSubmissionInput,
    ) -> MissionResult<ReviewSubmissionOutput> {
        if !reviewer.role.is_admin() {
            return Err(MissionError::Forbidden);
        }

        let note = input
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if note
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_REVIEW_NOTE_LEN)
        {
            return Err(MissionError::Validation(format!(
                "note must be at most {MAX_REVIEW_NOTE_LEN} characters"
            )));
        }

        let submission = self
            .submission_repo
            .find_submission(input.submission_id)
            .await?
            .ok_or(MissionError::SubmissionNotFound)?;

        if submission.status.is_reviewed() {
            return Err(MissionError::SubmissionAlreadyReviewed);
        }

        let mission = self
            .mission_repo
            .find_mission(submission.mission_id)
            .await?
            .ok_or(MissionError::MissionNotFound)?;

        let status = input.decision.resulting_status();
        let reviewed = self
            .submission_repo
            .review_submission(submission.id, status, note.as_deref(), mission.points)
            .await?
            // Another reviewer got there first
            .ok_or(MissionError::SubmissionAlreadyReviewed)?;

        let points_awarded =
            (status == SubmissionStatus::Approved).then_some(mission.points.value());

        tracing::info!(
            submission_id = %reviewed.id,
            mission_id = %mission.id,
            reviewer_id = %reviewer.user_id,
            status = status.code(),
            points_awarded,
            "Submission reviewed"
        );

        Ok(ReviewSubmissionOutput {
            submission: reviewed,
            points_awarded,
        })
    }
}
