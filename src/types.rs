//! Shared types for the Talmid core.
//!
//! With the `typescript` feature enabled, frontend-visible types can be
//! exported to TypeScript using ts-rs so the web dashboard and this core
//! agree on one vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::progress::ProjectProgress;

/// Role of an enrolled account.
///
/// Ordered so that a capability check can compare against a minimum role
/// (administrators retain every participant capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolled internship candidate
    Participant,
    /// Track administrator reviewing submissions
    Administrator,
}

impl Role {
    /// Whether this role carries administrator capabilities
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Participant => write!(f, "PARTICIPANT"),
            Role::Administrator => write!(f, "ADMINISTRATOR"),
        }
    }
}

/// An enrolled internship candidate or track administrator.
///
/// The flat record persisted by the session snapshot; credential material
/// is kept separately in the directory and never serialized here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique email address
    pub email: String,
    /// Account role
    pub role: Role,
    /// Institution name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    /// Professional network handle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    /// Days the participant has been active on the track; monotonically
    /// non-decreasing, driven by external activity tracking
    pub days_active: u32,
    /// Per-step submission lifecycle
    pub progress: ProjectProgress,
    /// Administrator override for certificate access, independent of
    /// computed eligibility
    pub certificate_enabled: bool,
    /// Set once by a successful certificate purchase
    pub payment_completed: bool,
}

impl Participant {
    /// Create a fresh participant with lifecycle defaults: all steps
    /// pending, zero activity days, no certificate access or payment.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            role,
            college: None,
            linkedin: None,
            days_active: 0,
            progress: ProjectProgress::default(),
            certificate_enabled: false,
            payment_completed: false,
        }
    }
}

/// Partial profile update merged into the current participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New institution name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    /// New professional network handle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl ProfileUpdate {
    /// Merge the present fields into a participant.
    pub fn apply(&self, participant: &mut Participant) {
        if let Some(ref name) = self.name {
            participant.name = name.clone();
        }
        if let Some(ref college) = self.college {
            participant.college = Some(college.clone());
        }
        if let Some(ref linkedin) = self.linkedin {
            participant.linkedin = Some(linkedin.clone());
        }
    }
}

/// Error types for the Talmid core.
#[derive(Debug, thiserror::Error)]
pub enum TalmidError {
    /// Email/password did not match a known account
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration email collides with an existing account
    #[error("Email already in use")]
    EmailAlreadyInUse,

    /// A rejection must carry feedback for the participant
    #[error("Feedback is required when rejecting a submission")]
    FeedbackRequired,

    /// Certificate requirements are not met
    #[error("Not eligible for certification: {0}")]
    NotEligible(String),

    /// A required field is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor lacks the capability for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Credential hashing or verification failure
    #[error("Auth error: {0}")]
    Auth(String),

    /// Session snapshot could not be read or written
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, TalmidError>;
