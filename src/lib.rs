//! Talmid - progress and certification core for Lamad internship tracks
//!
//! "Well done, good and faithful servant" - Matthew 25:21
//!
//! Talmid tracks a participant's journey through the three project
//! milestones of an internship track: sequential step submission, an
//! administrator review queue, and certification once every step is
//! approved and enough activity days have accumulated. It is consumed
//! in-process by a presentation layer; there is no wire protocol.
//!
//! ## Components
//!
//! - **Progress**: step status model and unlock rules
//! - **Directory**: authoritative participant registry
//! - **Session**: single-session auth with a persisted snapshot
//! - **Submit**: participant-facing step submission workflow
//! - **Review**: administrator approve/reject queue
//! - **Certificate**: eligibility gate and purchase stub
//! - **Notify**: transient auto-expiring notifications

pub mod auth;
pub mod certificate;
pub mod config;
pub mod directory;
pub mod logging;
pub mod notify;
pub mod program;
pub mod progress;
pub mod review;
pub mod seed;
pub mod session;
pub mod submit;
pub mod types;

pub use config::Args;
pub use program::Program;
pub use types::{Participant, ProfileUpdate, Result, Role, TalmidError};
