//! Program assembly.
//!
//! Wires the directory, review registry, session store, workflows and
//! notifier together, seeds the boot fixtures, and restores any persisted
//! session. A host embeds one `Program` per running instance.

use std::sync::Arc;

use crate::certificate::CertificateWorkflow;
use crate::config::Args;
use crate::directory::ParticipantDirectory;
use crate::notify::{self, Notifier, NotifierConfig};
use crate::review::{ReviewWorkflow, SubmissionRegistry};
use crate::seed;
use crate::session::{FileSnapshotStore, SessionStore, SnapshotStore};
use crate::submit::SubmissionWorkflow;
use crate::types::Result;

/// The assembled core, ready for a presentation layer.
pub struct Program {
    /// Effective configuration
    pub args: Args,
    /// Authoritative participant registry
    pub directory: Arc<ParticipantDirectory>,
    /// Review queue
    pub registry: Arc<SubmissionRegistry>,
    /// Single-session store
    pub session: Arc<SessionStore>,
    /// Participant-facing submission operations
    pub submissions: SubmissionWorkflow,
    /// Administrator-facing review operations
    pub review: ReviewWorkflow,
    /// Eligibility gate and purchase stub
    pub certificates: CertificateWorkflow,
    /// Transient notification channel
    pub notifier: Arc<Notifier>,
}

impl Program {
    /// Build a program backed by a file snapshot under `args.data_dir`.
    pub fn new(args: Args) -> Result<Self> {
        let snapshot = Arc::new(FileSnapshotStore::new(&args.data_dir));
        Self::with_snapshot(args, snapshot)
    }

    /// Build a program over an explicit snapshot store.
    pub fn with_snapshot(args: Args, snapshot: Arc<dyn SnapshotStore>) -> Result<Self> {
        let directory = Arc::new(ParticipantDirectory::new());
        let registry = Arc::new(SubmissionRegistry::new());
        seed::seed(&directory, &registry)?;

        let notifier = Arc::new(Notifier::new(NotifierConfig {
            ttl: args.notify_ttl(),
            ..Default::default()
        }));
        let session = Arc::new(SessionStore::new(
            directory.clone(),
            snapshot,
            args.auth_latency(),
        )?);

        let submissions = SubmissionWorkflow::new(
            session.clone(),
            registry.clone(),
            notifier.clone(),
            args.submit_latency(),
        );
        let review = ReviewWorkflow::new(
            registry.clone(),
            directory.clone(),
            session.clone(),
            notifier.clone(),
            args.review_latency(),
        );
        let certificates =
            CertificateWorkflow::new(session.clone(), notifier.clone(), args.payment_latency());

        Ok(Self {
            args,
            directory,
            registry,
            session,
            submissions,
            review,
            certificates,
            notifier,
        })
    }

    /// Start background maintenance (the notification sweep). Requires a
    /// running tokio runtime.
    pub fn start_maintenance(&self) {
        notify::spawn_cleanup_task(self.notifier.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{check_eligibility, PaymentDetails};
    use crate::progress::{ProjectStep, StepStatus};
    use crate::review::SubmissionFilter;
    use crate::session::MemorySnapshotStore;
    use clap::Parser;

    fn program() -> Program {
        let mut args = Args::parse_from(["talmid"]);
        args.simulated_latency_ms = 0;
        Program::with_snapshot(args, Arc::new(MemorySnapshotStore::new())).unwrap()
    }

    fn payment() -> PaymentDetails {
        PaymentDetails {
            name: "New Person".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_date: "12/27".to_string(),
            cvv: "123".to_string(),
            email: "new@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seeded_queue_is_listable() {
        let program = program();
        program.start_maintenance();
        let admin = program
            .directory
            .find_by_email(seed::DEMO_ADMIN_EMAIL)
            .unwrap();

        let queue: Vec<_> = program
            .review
            .list_submissions(&admin, &SubmissionFilter::default())
            .unwrap()
            .collect();
        assert_eq!(queue.len(), 5);
        assert_eq!(queue[0].participant_name, "Emily Johnson");
    }

    #[tokio::test]
    async fn test_full_journey_from_registration_to_certificate() {
        let program = program();
        let admin = program
            .directory
            .find_by_email(seed::DEMO_ADMIN_EMAIL)
            .unwrap();

        let fresh = program
            .session
            .register("New Person", "new@example.com", "pw")
            .await
            .unwrap();

        // Work through all three steps: submit, then have the admin
        // approve each in turn.
        for step in ProjectStep::all() {
            let submission = program
                .submissions
                .submit_step(
                    step,
                    "https://drive.google.com/file/d/walkthrough",
                    "https://github.com/newperson/project",
                    "Ready for review.",
                )
                .await
                .unwrap();
            program.review.approve(&admin, &submission.id).await.unwrap();

            let live = program.session.current().unwrap();
            assert_eq!(live.progress.status(step), StepStatus::Approved);
        }

        // All steps approved but not yet enough activity days.
        let current = program.session.current().unwrap();
        assert!(!check_eligibility(&current).eligible);
        let err = program
            .certificates
            .purchase_certificate(&payment())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::types::TalmidError::NotEligible(_)));

        for _ in 0..30 {
            program.directory.record_activity(&fresh.id).unwrap();
        }

        let receipt = program
            .certificates
            .purchase_certificate(&payment())
            .await
            .unwrap();
        assert_eq!(receipt.participant_id, fresh.id);
        assert!(program.session.current().unwrap().payment_completed);
    }

    #[tokio::test]
    async fn test_review_refreshes_active_session_snapshot() {
        let snapshot = Arc::new(MemorySnapshotStore::new());
        let mut args = Args::parse_from(["talmid"]);
        args.simulated_latency_ms = 0;
        let program = Program::with_snapshot(args, snapshot.clone()).unwrap();
        let admin = program
            .directory
            .find_by_email(seed::DEMO_ADMIN_EMAIL)
            .unwrap();

        program
            .session
            .register("New Person", "new@example.com", "pw")
            .await
            .unwrap();
        let submission = program
            .submissions
            .submit_step(
                ProjectStep::Setup,
                "https://drive.google.com/file/d/setup",
                "https://github.com/newperson/project",
                "",
            )
            .await
            .unwrap();
        program.review.approve(&admin, &submission.id).await.unwrap();

        let saved = snapshot.load().unwrap().unwrap();
        assert_eq!(saved.progress.step1, StepStatus::Approved);
    }
}
