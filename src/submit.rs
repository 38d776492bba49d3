//! Participant submission workflow.
//!
//! Enforces sequential unlocking and the double-submit guard before a
//! step moves to "submitted", then queues the artifact package for
//! review. Preconditions are re-checked after the simulated round-trip,
//! so a duplicate trigger that slipped past a disabled button is still
//! refused here.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::auth::permissions::{ensure, Operation};
use crate::notify::{Notifier, Severity};
use crate::progress::{ProjectStep, StepStatus};
use crate::review::{Submission, SubmissionRegistry};
use crate::session::SessionStore;
use crate::types::{Result, TalmidError};

/// Participant-facing submission operations over the current session.
pub struct SubmissionWorkflow {
    session: Arc<SessionStore>,
    registry: Arc<SubmissionRegistry>,
    notifier: Arc<Notifier>,
    /// Simulated submission round-trip
    latency: Duration,
}

impl SubmissionWorkflow {
    /// Wire the workflow over its stores.
    pub fn new(
        session: Arc<SessionStore>,
        registry: Arc<SubmissionRegistry>,
        notifier: Arc<Notifier>,
        latency: Duration,
    ) -> Self {
        Self {
            session,
            registry,
            notifier,
            latency,
        }
    }

    /// Submit an artifact package for one step of the current session.
    ///
    /// The step must be unlocked and in a state that accepts submissions
    /// (pending or rejected); both artifact links are required. On
    /// success the step moves to "submitted" and the package joins the
    /// review queue.
    pub async fn submit_step(
        &self,
        step: ProjectStep,
        file_url: &str,
        project_url: &str,
        notes: &str,
    ) -> Result<Submission> {
        tokio::time::sleep(self.latency).await;

        let participant = self
            .session
            .current()
            .ok_or_else(|| TalmidError::Validation("no active session".to_string()))?;
        ensure(participant.role, Operation::SubmitStep)?;

        if file_url.trim().is_empty() {
            return Err(TalmidError::Validation(
                "a file upload link is required".to_string(),
            ));
        }
        if project_url.trim().is_empty() {
            return Err(TalmidError::Validation(
                "a project link is required".to_string(),
            ));
        }
        if participant.progress.is_locked(step) {
            return Err(TalmidError::Validation(format!(
                "{step} is locked until the previous step is approved"
            )));
        }
        let status = participant.progress.status(step);
        if !status.accepts_submission() {
            return Err(TalmidError::Validation(format!(
                "{step} is already {}",
                status.label().to_lowercase()
            )));
        }

        let updated = self
            .session
            .update_step_status(step, StepStatus::Submitted)?;
        if updated.is_none() {
            return Err(TalmidError::Validation("no active session".to_string()));
        }

        let submission = Submission::new(&participant, step, file_url, project_url, notes);
        self.registry.insert(submission.clone());

        self.notifier
            .show(format!("{step} submitted successfully!"), Severity::Success);
        info!(participant = %participant.email, step = %step, "step submitted");
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ParticipantDirectory;
    use crate::seed;
    use crate::session::MemorySnapshotStore;

    struct Fixture {
        session: Arc<SessionStore>,
        registry: Arc<SubmissionRegistry>,
        notifier: Arc<Notifier>,
        workflow: SubmissionWorkflow,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(ParticipantDirectory::new());
        seed::seed_directory(&directory).unwrap();
        let session = Arc::new(
            SessionStore::new(
                directory,
                Arc::new(MemorySnapshotStore::new()),
                Duration::ZERO,
            )
            .unwrap(),
        );
        let registry = Arc::new(SubmissionRegistry::new());
        let notifier = Arc::new(Notifier::with_defaults());
        let workflow = SubmissionWorkflow::new(
            session.clone(),
            registry.clone(),
            notifier.clone(),
            Duration::ZERO,
        );
        Fixture {
            session,
            registry,
            notifier,
            workflow,
        }
    }

    async fn login_demo_user(fixture: &Fixture) {
        fixture
            .session
            .login("user@example.com", "password")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_without_session() {
        let fixture = fixture();
        let err = fixture
            .workflow
            .submit_step(ProjectStep::Setup, "file://a", "https://b", "")
            .await
            .unwrap_err();
        assert!(matches!(err, TalmidError::Validation(_)));
    }

    #[tokio::test]
    async fn test_locked_step_is_refused() {
        let fixture = fixture();
        login_demo_user(&fixture).await;

        // Demo user: step2 submitted, so step3 is locked.
        let err = fixture
            .workflow
            .submit_step(ProjectStep::FinalSubmission, "file://a", "https://b", "")
            .await
            .unwrap_err();
        assert!(matches!(err, TalmidError::Validation(_)));
        assert!(fixture.registry.is_empty());
    }

    #[tokio::test]
    async fn test_missing_links_are_refused() {
        let fixture = fixture();
        login_demo_user(&fixture).await;
        fixture
            .session
            .update_step_status(ProjectStep::Implementation, StepStatus::Rejected)
            .unwrap();

        for (file_url, project_url) in [("", "https://b"), ("file://a", "  ")] {
            let err = fixture
                .workflow
                .submit_step(ProjectStep::Implementation, file_url, project_url, "")
                .await
                .unwrap_err();
            assert!(matches!(err, TalmidError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_double_submit_is_guarded() {
        let fixture = fixture();
        login_demo_user(&fixture).await;

        // Demo user's step2 is already under review.
        let err = fixture
            .workflow
            .submit_step(ProjectStep::Implementation, "file://a", "https://b", "")
            .await
            .unwrap_err();
        assert!(matches!(err, TalmidError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resubmission_after_rejection() {
        let fixture = fixture();
        login_demo_user(&fixture).await;
        fixture
            .session
            .update_step_status(ProjectStep::Implementation, StepStatus::Rejected)
            .unwrap();

        let submission = fixture
            .workflow
            .submit_step(
                ProjectStep::Implementation,
                "https://drive.google.com/file/d/rework",
                "https://github.com/user/project",
                "Addressed the feedback.",
            )
            .await
            .unwrap();

        assert_eq!(submission.status, StepStatus::Submitted);
        assert_eq!(
            fixture.session.current().unwrap().progress.step2,
            StepStatus::Submitted
        );
        assert_eq!(fixture.registry.len(), 1);

        let toast = &fixture.notifier.active()[0];
        assert_eq!(toast.severity, Severity::Success);
        assert!(toast.message.contains("Implementation"));
    }
}
