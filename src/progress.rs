//! Step progression model for the three project milestones.
//!
//! Pure data types shared by every workflow as common vocabulary: no I/O,
//! no side effects. The unlock rule lives here so the submission and
//! review workflows cannot drift apart on it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Number of project milestones in a track.
pub const STEP_COUNT: usize = 3;

/// Review lifecycle of a single project step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Nothing submitted yet
    #[default]
    Pending,
    /// Artifact package attached, awaiting review
    Submitted,
    /// Approved by an administrator; terminal for the step
    Approved,
    /// Sent back with feedback; may be resubmitted
    Rejected,
}

impl StepStatus {
    /// Display label used by the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Not Started",
            Self::Submitted => "Under Review",
            Self::Approved => "Approved",
            Self::Rejected => "Needs Revision",
        }
    }

    /// Whether a new artifact package may be attached in this state
    pub fn accepts_submission(&self) -> bool {
        matches!(self, Self::Pending | Self::Rejected)
    }
}

/// The three sequential project milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ProjectStep {
    /// Development environment and repository setup
    Setup,
    /// Core feature implementation
    Implementation,
    /// Completed project ready for final review
    FinalSubmission,
}

impl ProjectStep {
    /// All steps in track order
    pub fn all() -> [Self; STEP_COUNT] {
        [Self::Setup, Self::Implementation, Self::FinalSubmission]
    }

    /// Zero-based position in the track
    pub fn index(&self) -> usize {
        match self {
            Self::Setup => 0,
            Self::Implementation => 1,
            Self::FinalSubmission => 2,
        }
    }

    /// Step at a zero-based position
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Setup),
            1 => Some(Self::Implementation),
            2 => Some(Self::FinalSubmission),
            _ => None,
        }
    }

    /// Step preceding this one in the track, if any
    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::Setup => None,
            Self::Implementation => Some(Self::Setup),
            Self::FinalSubmission => Some(Self::Implementation),
        }
    }

    /// Dashboard title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Setup => "Project Setup",
            Self::Implementation => "Implementation",
            Self::FinalSubmission => "Final Submission",
        }
    }

    /// Dashboard description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Setup => {
                "Set up your development environment and create the initial project structure."
            }
            Self::Implementation => {
                "Implement the core features of your project according to the requirements."
            }
            Self::FinalSubmission => "Complete your project and prepare it for final review.",
        }
    }
}

impl fmt::Display for ProjectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Per-participant status of the three milestones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ProjectProgress {
    /// Project setup
    pub step1: StepStatus,
    /// Implementation
    pub step2: StepStatus,
    /// Final submission
    pub step3: StepStatus,
}

impl ProjectProgress {
    /// Progress with explicit per-step statuses, in track order.
    pub fn new(step1: StepStatus, step2: StepStatus, step3: StepStatus) -> Self {
        Self { step1, step2, step3 }
    }

    /// Status of one step
    pub fn status(&self, step: ProjectStep) -> StepStatus {
        match step {
            ProjectStep::Setup => self.step1,
            ProjectStep::Implementation => self.step2,
            ProjectStep::FinalSubmission => self.step3,
        }
    }

    /// Replace the status of one step
    pub fn set_status(&mut self, step: ProjectStep, status: StepStatus) {
        match step {
            ProjectStep::Setup => self.step1 = status,
            ProjectStep::Implementation => self.step2 = status,
            ProjectStep::FinalSubmission => self.step3 = status,
        }
    }

    /// Number of approved steps
    pub fn approved_count(&self) -> usize {
        ProjectStep::all()
            .iter()
            .filter(|step| self.status(**step) == StepStatus::Approved)
            .count()
    }

    /// Whether every milestone has been approved
    pub fn all_approved(&self) -> bool {
        self.approved_count() == STEP_COUNT
    }

    /// Rounded share of approved steps, 0..=100
    pub fn completion_percentage(&self) -> u8 {
        let approved = self.approved_count() as f64;
        ((approved / STEP_COUNT as f64) * 100.0).round() as u8
    }

    /// A step is locked until the one before it has been approved.
    /// The first step is never locked.
    pub fn is_locked(&self, step: ProjectStep) -> bool {
        match step.previous() {
            Some(previous) => self.status(previous) != StepStatus::Approved,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_percentage_rounding() {
        let mut progress = ProjectProgress::default();
        assert_eq!(progress.completion_percentage(), 0);

        progress.set_status(ProjectStep::Setup, StepStatus::Approved);
        assert_eq!(progress.completion_percentage(), 33);

        progress.set_status(ProjectStep::Implementation, StepStatus::Approved);
        assert_eq!(progress.completion_percentage(), 67);

        progress.set_status(ProjectStep::FinalSubmission, StepStatus::Approved);
        assert_eq!(progress.completion_percentage(), 100);
    }

    #[test]
    fn test_completion_never_decreases_through_rejection_cycle() {
        let mut progress = ProjectProgress::new(
            StepStatus::Approved,
            StepStatus::Submitted,
            StepStatus::Pending,
        );
        let mut last = progress.completion_percentage();

        // Reject, resubmit, then approve step 2; the percentage must never
        // drop along the way.
        for status in [StepStatus::Rejected, StepStatus::Submitted, StepStatus::Approved] {
            progress.set_status(ProjectStep::Implementation, status);
            let now = progress.completion_percentage();
            assert!(now >= last, "completion dropped from {last} to {now}");
            last = now;
        }
        assert_eq!(last, 67);
    }

    #[test]
    fn test_first_step_never_locked() {
        let progress = ProjectProgress::default();
        assert!(!progress.is_locked(ProjectStep::Setup));
    }

    #[test]
    fn test_lock_follows_previous_approval() {
        let mut progress = ProjectProgress::default();
        assert!(progress.is_locked(ProjectStep::Implementation));
        assert!(progress.is_locked(ProjectStep::FinalSubmission));

        progress.set_status(ProjectStep::Setup, StepStatus::Submitted);
        assert!(progress.is_locked(ProjectStep::Implementation));

        progress.set_status(ProjectStep::Setup, StepStatus::Approved);
        assert!(!progress.is_locked(ProjectStep::Implementation));
        assert!(progress.is_locked(ProjectStep::FinalSubmission));
    }

    #[test]
    fn test_step_index_round_trip() {
        for step in ProjectStep::all() {
            assert_eq!(ProjectStep::from_index(step.index()), Some(step));
        }
        assert_eq!(ProjectStep::from_index(STEP_COUNT), None);
    }

    #[test]
    fn test_step_metadata() {
        assert_eq!(ProjectStep::Setup.title(), "Project Setup");
        assert_eq!(ProjectStep::FinalSubmission.to_string(), "Final Submission");
        for step in ProjectStep::all() {
            assert!(!step.description().is_empty());
        }
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&StepStatus::Submitted).unwrap();
        assert_eq!(json, "\"submitted\"");
    }
}
