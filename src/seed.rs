//! Boot-time fixtures.
//!
//! Two demo accounts with working credentials, plus the mock cohort and
//! review queue the admin console starts with. Cohort records carry no
//! usable credentials; they exist to be listed, searched, and reviewed.
//! Directory progress and queue entries are seeded consistently: a
//! participant with a step under review has every earlier step approved.

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::auth::password::hash_password;
use crate::directory::ParticipantDirectory;
use crate::progress::{ProjectProgress, ProjectStep, StepStatus};
use crate::review::{Submission, SubmissionRegistry};
use crate::types::{Participant, Result, Role, TalmidError};

/// Password shared by the two demo accounts.
pub const DEMO_PASSWORD: &str = "password";

/// Email of the demo administrator.
pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";

/// Email of the demo participant.
pub const DEMO_USER_EMAIL: &str = "user@example.com";

struct CohortEntry {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    college: Option<&'static str>,
    days_active: u32,
    progress: ProjectProgress,
    certificate_enabled: bool,
    payment_completed: bool,
}

fn cohort() -> Vec<CohortEntry> {
    use StepStatus::{Approved, Pending, Submitted};
    vec![
        CohortEntry {
            id: "3",
            name: "Emily Johnson",
            email: "emily.johnson@example.com",
            college: Some("Stanford University"),
            days_active: 28,
            progress: ProjectProgress::new(Approved, Approved, Submitted),
            certificate_enabled: false,
            payment_completed: false,
        },
        CohortEntry {
            id: "4",
            name: "Michael Smith",
            email: "michael.smith@example.com",
            college: Some("MIT"),
            days_active: 30,
            progress: ProjectProgress::new(Approved, Approved, Approved),
            certificate_enabled: true,
            payment_completed: true,
        },
        CohortEntry {
            id: "5",
            name: "Sarah Brown",
            email: "sarah.brown@example.com",
            college: Some("UC Berkeley"),
            days_active: 20,
            progress: ProjectProgress::new(Approved, Submitted, Pending),
            certificate_enabled: false,
            payment_completed: false,
        },
        CohortEntry {
            id: "6",
            name: "James Wilson",
            email: "james.wilson@example.com",
            college: Some("Harvard University"),
            days_active: 32,
            progress: ProjectProgress::new(Approved, Approved, Approved),
            certificate_enabled: true,
            payment_completed: true,
        },
        CohortEntry {
            id: "7",
            name: "Jessica Martinez",
            email: "jessica.martinez@example.com",
            college: Some("Georgia Tech"),
            days_active: 25,
            progress: ProjectProgress::new(Approved, Submitted, Pending),
            certificate_enabled: false,
            payment_completed: false,
        },
        CohortEntry {
            id: "8",
            name: "Daniel Lee",
            email: "daniel.lee@example.com",
            college: None,
            days_active: 5,
            progress: ProjectProgress::new(Submitted, Pending, Pending),
            certificate_enabled: false,
            payment_completed: false,
        },
        CohortEntry {
            id: "9",
            name: "Amanda Clark",
            email: "amanda.clark@example.com",
            college: None,
            days_active: 27,
            progress: ProjectProgress::new(Approved, Approved, Submitted),
            certificate_enabled: false,
            payment_completed: false,
        },
    ]
}

struct QueueEntry {
    email: &'static str,
    step: ProjectStep,
    file_url: &'static str,
    project_url: &'static str,
    submitted_at: (u32, u32, u32, u32),
    notes: &'static str,
}

fn queue() -> Vec<QueueEntry> {
    vec![
        QueueEntry {
            email: "emily.johnson@example.com",
            step: ProjectStep::FinalSubmission,
            file_url: "https://drive.google.com/file/d/example1",
            project_url: "https://github.com/emilyjohnson/project",
            submitted_at: (3, 20, 15, 30),
            notes: "Here is my final project submission with all requirements implemented.",
        },
        QueueEntry {
            email: "sarah.brown@example.com",
            step: ProjectStep::Implementation,
            file_url: "https://drive.google.com/file/d/example2",
            project_url: "https://github.com/sarahbrown/portfolio",
            submitted_at: (3, 19, 10, 15),
            notes: "I've implemented all the core features as requested.",
        },
        QueueEntry {
            email: "jessica.martinez@example.com",
            step: ProjectStep::Implementation,
            file_url: "https://drive.google.com/file/d/example3",
            project_url: "https://github.com/jessicam/portfolio-project",
            submitted_at: (3, 18, 14, 45),
            notes: "Please review my implementation of the main features.",
        },
        QueueEntry {
            email: "daniel.lee@example.com",
            step: ProjectStep::Setup,
            file_url: "https://drive.google.com/file/d/example4",
            project_url: "https://github.com/daniellee/portfolio",
            submitted_at: (3, 21, 9, 30),
            notes: "Initial project setup completed as per requirements.",
        },
        QueueEntry {
            email: "amanda.clark@example.com",
            step: ProjectStep::FinalSubmission,
            file_url: "https://drive.google.com/file/d/example5",
            project_url: "https://github.com/amandac/portfolio-complete",
            submitted_at: (3, 17, 16, 0),
            notes: "Final project with all features implemented and documentation.",
        },
    ]
}

fn seeded_at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Install the demo accounts and the mock cohort.
///
/// Seeded ids are stable across restarts so a persisted session snapshot
/// can re-attach to its directory record.
pub fn seed_directory(directory: &ParticipantDirectory) -> Result<()> {
    let demo_hash = hash_password(DEMO_PASSWORD)?;

    let mut admin = Participant::new("Admin User", DEMO_ADMIN_EMAIL, Role::Administrator);
    admin.id = "1".to_string();
    admin.days_active = 30;
    admin.progress = ProjectProgress::new(
        StepStatus::Approved,
        StepStatus::Approved,
        StepStatus::Approved,
    );
    admin.certificate_enabled = true;
    admin.payment_completed = true;
    directory.insert(admin, demo_hash.clone())?;

    let mut user = Participant::new("Test User", DEMO_USER_EMAIL, Role::Participant);
    user.id = "2".to_string();
    user.college = Some("Test University".to_string());
    user.linkedin = Some("linkedin.com/in/testuser".to_string());
    user.days_active = 12;
    user.progress = ProjectProgress::new(
        StepStatus::Approved,
        StepStatus::Submitted,
        StepStatus::Pending,
    );
    directory.insert(user, demo_hash)?;

    for entry in cohort() {
        let mut participant = Participant::new(entry.name, entry.email, Role::Participant);
        participant.id = entry.id.to_string();
        participant.college = entry.college.map(str::to_string);
        participant.days_active = entry.days_active;
        participant.progress = entry.progress;
        participant.certificate_enabled = entry.certificate_enabled;
        participant.payment_completed = entry.payment_completed;
        directory.insert(participant, String::new())?;
    }

    info!(accounts = directory.len(), "directory seeded");
    Ok(())
}

/// Queue the mock submissions against their seeded owners.
pub fn seed_submissions(
    directory: &ParticipantDirectory,
    registry: &SubmissionRegistry,
) -> Result<()> {
    for entry in queue() {
        let participant = directory.find_by_email(entry.email).ok_or_else(|| {
            TalmidError::NotFound(format!("seeded participant {}", entry.email))
        })?;
        let (month, day, hour, minute) = entry.submitted_at;
        let mut submission = Submission::new(
            &participant,
            entry.step,
            entry.file_url,
            entry.project_url,
            entry.notes,
        );
        submission.submitted_at = seeded_at(month, day, hour, minute);
        registry.insert(submission);
    }

    info!(submissions = registry.len(), "review queue seeded");
    Ok(())
}

/// Install every boot-time fixture.
pub fn seed(directory: &ParticipantDirectory, registry: &SubmissionRegistry) -> Result<()> {
    seed_directory(directory)?;
    seed_submissions(directory, registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_accounts_and_queue() {
        let directory = ParticipantDirectory::new();
        let registry = SubmissionRegistry::new();
        seed(&directory, &registry).unwrap();

        // Two demo accounts plus the seven-member cohort.
        assert_eq!(directory.len(), 9);
        assert_eq!(registry.len(), 5);

        let admin = directory.find_by_email(DEMO_ADMIN_EMAIL).unwrap();
        assert_eq!(admin.role, Role::Administrator);
        assert!(admin.progress.all_approved());

        let user = directory.find_by_email(DEMO_USER_EMAIL).unwrap();
        assert_eq!(user.role, Role::Participant);
        assert_eq!(user.progress.step2, StepStatus::Submitted);
    }

    #[test]
    fn test_queue_owners_have_consistent_progress() {
        let directory = ParticipantDirectory::new();
        let registry = SubmissionRegistry::new();
        seed(&directory, &registry).unwrap();

        for id in registry.order_snapshot() {
            let submission = registry.get(&id).unwrap();
            let owner = directory.get(&submission.participant_id).unwrap();

            // The queued step is under review and was reachable.
            assert_eq!(owner.progress.status(submission.step), StepStatus::Submitted);
            assert!(!owner.progress.is_locked(submission.step));
        }
    }

    #[test]
    fn test_cohort_cannot_login() {
        let directory = ParticipantDirectory::new();
        seed_directory(&directory).unwrap();

        assert!(directory
            .authenticate("emily.johnson@example.com", DEMO_PASSWORD)
            .is_err());
    }
}
