//! Capability checks for workflow entry points.
//!
//! Every workflow operation names a capability here instead of branching
//! on the actor's role at call sites. The mapping is a closed enum, so an
//! unknown operation cannot exist.

use serde::{Deserialize, Serialize};

use crate::types::{Result, Role, TalmidError};

/// Operations exposed by the core workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Attach an artifact package to a project step
    SubmitStep,
    /// Update the signed-in profile
    UpdateProfile,
    /// Purchase a certificate once eligible
    PurchaseCertificate,
    /// List and filter the review queue
    ListSubmissions,
    /// Approve or reject a submission
    ReviewSubmission,
    /// Manage participant accounts (listing, certificate override)
    ManageParticipants,
}

impl Operation {
    /// Human-readable description for logs and error messages
    pub fn description(&self) -> &'static str {
        match self {
            Operation::SubmitStep => "submit a project step",
            Operation::UpdateProfile => "update the profile",
            Operation::PurchaseCertificate => "purchase a certificate",
            Operation::ListSubmissions => "list submissions",
            Operation::ReviewSubmission => "review a submission",
            Operation::ManageParticipants => "manage participants",
        }
    }
}

/// Minimum role required for an operation.
pub fn required_role(operation: Operation) -> Role {
    match operation {
        Operation::SubmitStep | Operation::UpdateProfile | Operation::PurchaseCertificate => {
            Role::Participant
        }
        Operation::ListSubmissions
        | Operation::ReviewSubmission
        | Operation::ManageParticipants => Role::Administrator,
    }
}

/// Check whether a role may perform an operation.
pub fn is_allowed(role: Role, operation: Operation) -> bool {
    role >= required_role(operation)
}

/// Require a capability, failing with `Forbidden` otherwise.
pub fn ensure(role: Role, operation: Operation) -> Result<()> {
    if is_allowed(role, operation) {
        Ok(())
    } else {
        Err(TalmidError::Forbidden(format!(
            "{role} may not {}",
            operation.description()
        )))
    }
}
