//! Session snapshot persistence.
//!
//! The current participant is persisted as a flat JSON record under a
//! fixed key so a restarted process resumes the same session. Absence of
//! the key means no active session.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::types::{Participant, Result, TalmidError};

/// Fixed key under which the current participant is stored.
pub const SNAPSHOT_KEY: &str = "current_participant";

/// Durable key-value store for the session snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Read the stored participant, if any.
    fn load(&self) -> Result<Option<Participant>>;

    /// Replace the stored participant.
    fn save(&self, participant: &Participant) -> Result<()>;

    /// Delete the stored participant; idempotent.
    fn clear(&self) -> Result<()>;
}

/// File-backed store writing `<dir>/current_participant.json`.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SNAPSHOT_KEY}.json")),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Participant>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| TalmidError::Snapshot(format!("read {}: {e}", self.path.display())))?;
        let participant = serde_json::from_str(&raw)
            .map_err(|e| TalmidError::Snapshot(format!("parse {}: {e}", self.path.display())))?;
        Ok(Some(participant))
    }

    fn save(&self, participant: &Participant) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TalmidError::Snapshot(format!("mkdir {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_string_pretty(participant)
            .map_err(|e| TalmidError::Snapshot(format!("serialize snapshot: {e}")))?;
        fs::write(&self.path, raw)
            .map_err(|e| TalmidError::Snapshot(format!("write {}: {e}", self.path.display())))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TalmidError::Snapshot(format!(
                "remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: RwLock<Option<Participant>>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Participant>> {
        Ok(self.slot.read().map(|slot| slot.clone()).unwrap_or(None))
    }

    fn save(&self, participant: &Participant) -> Result<()> {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(participant.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
        Ok(())
    }
}
