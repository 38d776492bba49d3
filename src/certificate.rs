//! Certificate eligibility and purchase.
//!
//! Eligibility is recomputed from live participant state on demand and
//! never stored. Purchase validates card fields structurally only;
//! charge authorization is a stub to be replaced by a real payment
//! processor.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::auth::permissions::{ensure, Operation};
use crate::notify::{Notifier, Severity};
use crate::session::SessionStore;
use crate::types::{Participant, Result, TalmidError};

/// Certificate price in cents.
pub const CERTIFICATE_PRICE_CENTS: u32 = 4_900;

/// Days of activity required before certification.
pub const REQUIRED_ACTIVE_DAYS: u32 = 30;

/// Derived right to purchase a certificate. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct EligibilityVerdict {
    /// Whether every requirement is met
    pub eligible: bool,
    /// Human-readable unmet requirements; empty when eligible
    pub unmet: Vec<String>,
}

/// Compute eligibility from live participant state.
///
/// Eligible iff all three steps are approved and the participant has
/// been active for at least [`REQUIRED_ACTIVE_DAYS`].
pub fn check_eligibility(participant: &Participant) -> EligibilityVerdict {
    let mut unmet = Vec::new();
    if !participant.progress.all_approved() {
        unmet.push("Complete all project steps".to_string());
    }
    if participant.days_active < REQUIRED_ACTIVE_DAYS {
        unmet.push(format!(
            "Be active for {} more days",
            REQUIRED_ACTIVE_DAYS - participant.days_active
        ));
    }
    EligibilityVerdict {
        eligible: unmet.is_empty(),
        unmet,
    }
}

/// Card details collected by the purchase form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Cardholder name
    pub name: String,
    /// Card number
    pub card_number: String,
    /// Expiry date
    pub expiry_date: String,
    /// Card verification value
    pub cvv: String,
    /// Billing email
    pub email: String,
}

impl PaymentDetails {
    /// Structural validation only; no gateway integration.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("name", &self.name),
            ("card number", &self.card_number),
            ("expiry date", &self.expiry_date),
            ("CVV", &self.cvv),
            ("email", &self.email),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(TalmidError::Validation(format!(
                    "payment {field} is required"
                )));
            }
        }
        Ok(())
    }
}

/// Confirmation returned by a successful purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Unique receipt identifier
    pub id: String,
    /// Participant the certificate was purchased for
    pub participant_id: String,
    /// Amount charged, in cents
    pub amount_cents: u32,
    /// When the purchase was confirmed
    pub issued_at: DateTime<Utc>,
}

/// Purchase operations over the current session.
pub struct CertificateWorkflow {
    session: Arc<SessionStore>,
    notifier: Arc<Notifier>,
    /// Simulated payment round-trip
    latency: Duration,
}

impl CertificateWorkflow {
    /// Wire the workflow over the session store.
    pub fn new(session: Arc<SessionStore>, notifier: Arc<Notifier>, latency: Duration) -> Self {
        Self {
            session,
            notifier,
            latency,
        }
    }

    /// Eligibility of the current participant, if a session is active.
    pub fn current_eligibility(&self) -> Option<EligibilityVerdict> {
        self.session.current().map(|p| check_eligibility(&p))
    }

    /// Purchase a certificate for the current participant.
    ///
    /// Requires an eligible participant and structurally valid payment
    /// details. On success the participant's `payment_completed` flag is
    /// set and persisted, and a receipt is returned.
    pub async fn purchase_certificate(&self, details: &PaymentDetails) -> Result<Receipt> {
        tokio::time::sleep(self.latency).await;

        let participant = self
            .session
            .current()
            .ok_or_else(|| TalmidError::Validation("no active session".to_string()))?;
        ensure(participant.role, Operation::PurchaseCertificate)?;

        let verdict = check_eligibility(&participant);
        if !verdict.eligible {
            return Err(TalmidError::NotEligible(verdict.unmet.join("; ")));
        }
        details.validate()?;

        self.session.mark_payment_completed()?;

        let receipt = Receipt {
            id: uuid::Uuid::new_v4().to_string(),
            participant_id: participant.id.clone(),
            amount_cents: CERTIFICATE_PRICE_CENTS,
            issued_at: Utc::now(),
        };
        self.notifier
            .show("Certificate purchase successful!", Severity::Success);
        info!(participant = %participant.email, receipt = %receipt.id, "certificate purchased");
        Ok(receipt)
    }
}
