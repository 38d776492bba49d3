//! Administrator review workflow.
//!
//! Submissions queue up in an insertion-ordered registry. Reviewing one
//! updates the record and the owning participant's live progress in the
//! same operation, so the directory stays the source of truth for step
//! status. The registry entry's shard lock is held across the paired
//! directory update, giving per-submission mutual exclusion between
//! concurrent reviewers.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::info;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::auth::permissions::{ensure, Operation};
use crate::directory::ParticipantDirectory;
use crate::notify::{Notifier, Severity};
use crate::progress::{ProjectStep, StepStatus};
use crate::session::SessionStore;
use crate::types::{Participant, Result, TalmidError};

/// An artifact package attached to one step by one participant, awaiting
/// review. Immutable once reviewed, except for status and feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Unique identifier
    pub id: String,
    /// Owning participant
    pub participant_id: String,
    /// Denormalized for queue display and search
    pub participant_name: String,
    /// Denormalized for queue display and search
    pub participant_email: String,
    /// Step the package belongs to
    pub step: ProjectStep,
    /// Uploaded artifact location
    pub file_url: String,
    /// Repository or project link
    pub project_url: String,
    /// Free-text notes from the participant
    pub notes: String,
    /// When the package was submitted
    pub submitted_at: DateTime<Utc>,
    /// Review lifecycle state
    pub status: StepStatus,
    /// Reviewer feedback; present iff rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Submission {
    /// Build a submission for a participant's step, timestamped now.
    pub fn new(
        participant: &Participant,
        step: ProjectStep,
        file_url: impl Into<String>,
        project_url: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            participant_id: participant.id.clone(),
            participant_name: participant.name.clone(),
            participant_email: participant.email.clone(),
            step,
            file_url: file_url.into(),
            project_url: project_url.into(),
            notes: notes.into(),
            submitted_at: Utc::now(),
            status: StepStatus::Submitted,
            feedback: None,
        }
    }

    /// Whether the record is still awaiting review.
    pub fn is_reviewable(&self) -> bool {
        self.status == StepStatus::Submitted
    }
}

/// Predicate for listing the review queue.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    /// Case-insensitive substring over participant name and email
    pub search_text: Option<String>,
    /// Exact step match
    pub step: Option<ProjectStep>,
}

impl SubmissionFilter {
    /// Whether a submission satisfies every present predicate.
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(ref term) = self.search_text {
            let term = term.to_lowercase();
            let hit = submission.participant_name.to_lowercase().contains(&term)
                || submission.participant_email.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(step) = self.step {
            if submission.step != step {
                return false;
            }
        }
        true
    }
}

/// Insertion-ordered registry of submissions with concurrent access.
pub struct SubmissionRegistry {
    records: DashMap<String, Submission>,
    /// Ids in insertion order; listings are never re-sorted
    order: RwLock<Vec<String>>,
}

impl SubmissionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Append a submission, returning its id.
    pub fn insert(&self, submission: Submission) -> String {
        let id = submission.id.clone();
        self.records.insert(id.clone(), submission);
        if let Ok(mut order) = self.order.write() {
            order.push(id.clone());
        }
        id
    }

    /// Submission by id.
    pub fn get(&self, id: &str) -> Option<Submission> {
        self.records.get(id).map(|s| s.clone())
    }

    /// Apply a review outcome to a record still awaiting review.
    ///
    /// `propagate` runs while the entry lock is held; if it fails, the
    /// record is left unchanged (all-or-nothing).
    pub fn apply_review<F>(
        &self,
        id: &str,
        status: StepStatus,
        feedback: Option<String>,
        propagate: F,
    ) -> Result<Submission>
    where
        F: FnOnce(&Submission) -> Result<()>,
    {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| TalmidError::NotFound(format!("submission {id}")))?;
        if !entry.is_reviewable() {
            return Err(TalmidError::Validation(format!(
                "submission {id} is not awaiting review"
            )));
        }
        propagate(&entry)?;
        entry.status = status;
        entry.feedback = feedback;
        Ok(entry.clone())
    }

    /// Ids in insertion order; a listing restarts from this snapshot.
    pub fn order_snapshot(&self) -> Vec<String> {
        self.order.read().map(|order| order.clone()).unwrap_or_default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for SubmissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Administrator-facing review operations.
pub struct ReviewWorkflow {
    registry: Arc<SubmissionRegistry>,
    directory: Arc<ParticipantDirectory>,
    session: Arc<SessionStore>,
    notifier: Arc<Notifier>,
    /// Simulated review round-trip
    latency: Duration,
}

impl ReviewWorkflow {
    /// Wire the workflow over its stores.
    pub fn new(
        registry: Arc<SubmissionRegistry>,
        directory: Arc<ParticipantDirectory>,
        session: Arc<SessionStore>,
        notifier: Arc<Notifier>,
        latency: Duration,
    ) -> Self {
        Self {
            registry,
            directory,
            session,
            notifier,
            latency,
        }
    }

    /// Lazy, restartable listing of the queue in insertion order.
    ///
    /// Matching records are fetched as the iterator advances; calling
    /// again restarts from a fresh snapshot of the queue.
    pub fn list_submissions(
        &self,
        actor: &Participant,
        filter: &SubmissionFilter,
    ) -> Result<impl Iterator<Item = Submission>> {
        ensure(actor.role, Operation::ListSubmissions)?;
        let registry = Arc::clone(&self.registry);
        let filter = filter.clone();
        let ids = registry.order_snapshot();
        Ok(ids
            .into_iter()
            .filter_map(move |id| registry.get(&id))
            .filter(move |submission| filter.matches(submission)))
    }

    /// Approve a submitted record, unlocking the participant's next step.
    pub async fn approve(&self, actor: &Participant, submission_id: &str) -> Result<Submission> {
        ensure(actor.role, Operation::ReviewSubmission)?;
        tokio::time::sleep(self.latency).await;

        let submission = self.apply(submission_id, StepStatus::Approved, None)?;
        self.notifier.show(
            format!(
                "Submission by {} has been approved!",
                submission.participant_name
            ),
            Severity::Success,
        );
        info!(
            reviewer = %actor.email,
            participant = %submission.participant_email,
            step = %submission.step,
            "submission approved"
        );
        Ok(submission)
    }

    /// Reject a submitted record with mandatory feedback.
    pub async fn reject(
        &self,
        actor: &Participant,
        submission_id: &str,
        feedback: &str,
    ) -> Result<Submission> {
        ensure(actor.role, Operation::ReviewSubmission)?;
        if feedback.trim().is_empty() {
            return Err(TalmidError::FeedbackRequired);
        }
        tokio::time::sleep(self.latency).await;

        let submission = self.apply(
            submission_id,
            StepStatus::Rejected,
            Some(feedback.to_string()),
        )?;
        self.notifier.show(
            format!(
                "Submission by {} has been rejected with feedback.",
                submission.participant_name
            ),
            Severity::Error,
        );
        info!(
            reviewer = %actor.email,
            participant = %submission.participant_email,
            step = %submission.step,
            "submission rejected"
        );
        Ok(submission)
    }

    /// Review the record and propagate the outcome to the participant's
    /// live progress as one operation.
    fn apply(
        &self,
        submission_id: &str,
        status: StepStatus,
        feedback: Option<String>,
    ) -> Result<Submission> {
        let submission =
            self.registry
                .apply_review(submission_id, status, feedback, |submission| {
                    self.directory
                        .update(&submission.participant_id, |participant| {
                            participant.progress.set_status(submission.step, status)
                        })
                        .map(|_| ())
                })?;
        self.session.refresh_snapshot(&submission.participant_id)?;
        Ok(submission)
    }
}
