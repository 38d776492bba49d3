//! Session store.
//!
//! At most one authenticated participant per running instance. The store
//! is an explicit object handed to each workflow rather than ambient
//! global state; a multi-client host creates one per connected client.
//!
//! Login and registration simulate a network round-trip and expose an
//! in-flight flag so callers can suppress duplicate triggers while an
//! operation is outstanding. Operations run to completion; there is no
//! cancellation. Every successful mutation persists the participant to
//! the snapshot store, and construction restores whatever the previous
//! process persisted.

pub mod snapshot;

pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, SNAPSHOT_KEY};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, info};

use crate::auth::password::hash_password;
use crate::directory::ParticipantDirectory;
use crate::progress::{ProjectStep, StepStatus};
use crate::types::{Participant, ProfileUpdate, Result, Role};

/// Clears the in-flight flag when the operation finishes, error paths
/// included.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Single-session store over the participant directory.
pub struct SessionStore {
    directory: Arc<ParticipantDirectory>,
    snapshot: Arc<dyn SnapshotStore>,
    /// Id of the signed-in participant, if any
    current: RwLock<Option<String>>,
    loading: AtomicBool,
    /// Simulated auth round-trip
    latency: Duration,
}

impl SessionStore {
    /// Create a store and restore any persisted session.
    pub fn new(
        directory: Arc<ParticipantDirectory>,
        snapshot: Arc<dyn SnapshotStore>,
        latency: Duration,
    ) -> Result<Self> {
        let store = Self {
            directory,
            snapshot,
            current: RwLock::new(None),
            loading: AtomicBool::new(false),
            latency,
        };
        store.restore()?;
        Ok(store)
    }

    /// Adopt a persisted participant as the active session.
    ///
    /// The snapshot is the only state that survives a restart, so it wins
    /// over the freshly seeded directory record. Credentials do not travel
    /// through the snapshot; a restored non-seeded account keeps its
    /// session but cannot log in again after logout.
    fn restore(&self) -> Result<()> {
        let Some(saved) = self.snapshot.load()? else {
            return Ok(());
        };
        let id = saved.id.clone();
        if self.directory.get(&id).is_some() {
            self.directory.update(&id, |p| *p = saved.clone())?;
        } else {
            self.directory.insert(saved.clone(), String::new())?;
        }
        if let Ok(mut current) = self.current.write() {
            *current = Some(id);
        }
        debug!(email = %saved.email, "session restored from snapshot");
        Ok(())
    }

    /// Authenticate against the directory and establish the session,
    /// replacing any current one.
    pub async fn login(&self, email: &str, password: &str) -> Result<Participant> {
        let _guard = LoadingGuard::begin(&self.loading);
        tokio::time::sleep(self.latency).await;

        let participant = self.directory.authenticate(email, password)?;
        if let Ok(mut current) = self.current.write() {
            *current = Some(participant.id.clone());
        }
        self.snapshot.save(&participant)?;
        info!(email = %participant.email, role = %participant.role, "session established");
        Ok(participant)
    }

    /// Create a participant account with lifecycle defaults and establish
    /// it as the current session.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Participant> {
        let _guard = LoadingGuard::begin(&self.loading);
        tokio::time::sleep(self.latency).await;

        let participant = Participant::new(name, email, Role::Participant);
        let password_hash = hash_password(password)?;
        self.directory.insert(participant.clone(), password_hash)?;

        if let Ok(mut current) = self.current.write() {
            *current = Some(participant.id.clone());
        }
        self.snapshot.save(&participant)?;
        info!(email = %participant.email, "account registered");
        Ok(participant)
    }

    /// Clear the current session and delete its snapshot; idempotent.
    pub fn logout(&self) -> Result<()> {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        self.snapshot.clear()?;
        info!("session cleared");
        Ok(())
    }

    /// Merge profile fields into the current participant.
    ///
    /// A call without an active session is a silent no-op, reported as
    /// `Ok(None)`.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<Option<Participant>> {
        let Some(id) = self.current_id() else {
            debug!("profile update ignored: no active session");
            return Ok(None);
        };
        let participant = self.directory.update(&id, |p| update.apply(p))?;
        self.snapshot.save(&participant)?;
        Ok(Some(participant))
    }

    /// Merge a step status into the current participant's progress.
    ///
    /// Unlock invariants are the submission workflow's responsibility;
    /// this method applies whatever it is given. No-op without a session.
    pub fn update_step_status(
        &self,
        step: ProjectStep,
        status: StepStatus,
    ) -> Result<Option<Participant>> {
        let Some(id) = self.current_id() else {
            debug!("step update ignored: no active session");
            return Ok(None);
        };
        let participant = self
            .directory
            .update(&id, |p| p.progress.set_status(step, status))?;
        self.snapshot.save(&participant)?;
        Ok(Some(participant))
    }

    /// Record a completed certificate purchase on the current participant.
    pub fn mark_payment_completed(&self) -> Result<Option<Participant>> {
        let Some(id) = self.current_id() else {
            return Ok(None);
        };
        let participant = self.directory.update(&id, |p| p.payment_completed = true)?;
        self.snapshot.save(&participant)?;
        Ok(Some(participant))
    }

    /// Re-persist the snapshot if the given participant is the active
    /// session. Used after out-of-session mutations (review decisions) so
    /// the snapshot does not lag the directory.
    pub(crate) fn refresh_snapshot(&self, participant_id: &str) -> Result<()> {
        if self.current_id().as_deref() == Some(participant_id) {
            if let Some(participant) = self.directory.get(participant_id) {
                self.snapshot.save(&participant)?;
            }
        }
        Ok(())
    }

    /// The signed-in participant, read live from the directory.
    pub fn current(&self) -> Option<Participant> {
        let id = self.current_id()?;
        self.directory.get(&id)
    }

    /// Whether a session is active.
    pub fn is_authenticated(&self) -> bool {
        self.current_id().is_some()
    }

    /// Whether an async operation is outstanding. Callers should disable
    /// duplicate-triggering actions while this is true.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn current_id(&self) -> Option<String> {
        self.current.read().ok().and_then(|current| current.clone())
    }
}
