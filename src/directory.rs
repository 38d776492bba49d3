//! Participant directory.
//!
//! Authoritative in-memory registry of every enrolled account, seeded at
//! boot and extended by registration. Step status reviewed by an
//! administrator lands here, so the directory is the single source of
//! truth for progress. Keyed storage with a separate insertion-order
//! index keeps admin listings stable.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::debug;

use crate::auth::password::verify_password;
use crate::types::{Participant, Result, TalmidError};

/// Creation/update timestamps carried by every directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    /// Metadata stamped with the current time.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A directory entry: the participant plus credential material.
#[derive(Debug, Clone)]
pub struct ParticipantRecord {
    /// The participant as exposed to workflows
    pub participant: Participant,
    /// Argon2 hash of the account password; empty when the account has no
    /// usable credentials (restored from a snapshot)
    pub password_hash: String,
    /// Record timestamps
    pub metadata: Metadata,
}

/// In-memory participant registry with concurrent access.
pub struct ParticipantDirectory {
    /// Records keyed by participant id
    records: DashMap<String, ParticipantRecord>,
    /// Lowercased email -> participant id
    by_email: DashMap<String, String>,
    /// Ids in insertion order, for stable listings
    order: RwLock<Vec<String>>,
}

impl ParticipantDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            by_email: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Insert a new account.
    ///
    /// Fails with `EmailAlreadyInUse` when the email collides with any
    /// existing record, seeded or registered.
    pub fn insert(&self, participant: Participant, password_hash: String) -> Result<()> {
        let email_key = participant.email.to_lowercase();
        if self.by_email.contains_key(&email_key) {
            return Err(TalmidError::EmailAlreadyInUse);
        }

        let id = participant.id.clone();
        debug!(id = %id, email = %participant.email, "directory insert");

        self.by_email.insert(email_key, id.clone());
        self.records.insert(
            id.clone(),
            ParticipantRecord {
                participant,
                password_hash,
                metadata: Metadata::new(),
            },
        );
        if let Ok(mut order) = self.order.write() {
            order.push(id);
        }
        Ok(())
    }

    /// Participant by id.
    pub fn get(&self, id: &str) -> Option<Participant> {
        self.records.get(id).map(|r| r.participant.clone())
    }

    /// Participant by email, case-insensitive.
    pub fn find_by_email(&self, email: &str) -> Option<Participant> {
        let id = self.by_email.get(&email.to_lowercase())?.clone();
        self.get(&id)
    }

    /// Verify credentials against the stored hash.
    ///
    /// Fails with `InvalidCredentials` for unknown emails, accounts
    /// without usable credentials, and password mismatches alike.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Participant> {
        let id = self
            .by_email
            .get(&email.to_lowercase())
            .map(|entry| entry.clone())
            .ok_or(TalmidError::InvalidCredentials)?;
        let record = self
            .records
            .get(&id)
            .ok_or(TalmidError::InvalidCredentials)?;

        if record.password_hash.is_empty() {
            return Err(TalmidError::InvalidCredentials);
        }
        if verify_password(password, &record.password_hash)? {
            Ok(record.participant.clone())
        } else {
            Err(TalmidError::InvalidCredentials)
        }
    }

    /// Apply a mutation to one participant, bumping its update timestamp.
    ///
    /// Returns the updated participant.
    pub fn update<F>(&self, id: &str, mutate: F) -> Result<Participant>
    where
        F: FnOnce(&mut Participant),
    {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| TalmidError::NotFound(format!("participant {id}")))?;
        mutate(&mut record.participant);
        record.metadata.touch();
        Ok(record.participant.clone())
    }

    /// All participants in insertion order.
    pub fn list(&self) -> Vec<Participant> {
        self.order_snapshot()
            .into_iter()
            .filter_map(|id| self.get(&id))
            .collect()
    }

    /// Case-insensitive substring search over name, email, and college,
    /// in insertion order. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<Participant> {
        let term = term.to_lowercase();
        self.list()
            .into_iter()
            .filter(|p| {
                term.is_empty()
                    || p.name.to_lowercase().contains(&term)
                    || p.email.to_lowercase().contains(&term)
                    || p.college
                        .as_ref()
                        .is_some_and(|c| c.to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Administrator override for certificate access.
    pub fn set_certificate_enabled(&self, id: &str, enabled: bool) -> Result<Participant> {
        self.update(id, |p| p.certificate_enabled = enabled)
    }

    /// Record one day of activity; the counter only ever grows.
    pub fn record_activity(&self, id: &str) -> Result<u32> {
        let updated = self.update(id, |p| p.days_active += 1)?;
        Ok(updated.days_active)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the directory holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn order_snapshot(&self) -> Vec<String> {
        self.order.read().map(|order| order.clone()).unwrap_or_default()
    }
}

impl Default for ParticipantDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::types::Role;

    fn directory_with(name: &str, email: &str) -> (ParticipantDirectory, String) {
        let directory = ParticipantDirectory::new();
        let participant = Participant::new(name, email, Role::Participant);
        let id = participant.id.clone();
        directory
            .insert(participant, hash_password("password").unwrap())
            .unwrap();
        (directory, id)
    }

    #[test]
    fn test_email_collision_is_rejected() {
        let (directory, _) = directory_with("Ada", "ada@example.com");
        let duplicate = Participant::new("Imposter", "ADA@example.com", Role::Participant);
        let err = directory.insert(duplicate, String::new()).unwrap_err();
        assert!(matches!(err, TalmidError::EmailAlreadyInUse));
    }

    #[test]
    fn test_authenticate_paths() {
        let (directory, _) = directory_with("Ada", "ada@example.com");

        assert!(directory.authenticate("ada@example.com", "password").is_ok());
        assert!(matches!(
            directory.authenticate("ada@example.com", "wrong"),
            Err(TalmidError::InvalidCredentials)
        ));
        assert!(matches!(
            directory.authenticate("nobody@example.com", "password"),
            Err(TalmidError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_account_without_credentials_cannot_login() {
        let directory = ParticipantDirectory::new();
        let participant = Participant::new("Ghost", "ghost@example.com", Role::Participant);
        directory.insert(participant, String::new()).unwrap();

        assert!(matches!(
            directory.authenticate("ghost@example.com", "anything"),
            Err(TalmidError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_update_bumps_timestamp() {
        let (directory, id) = directory_with("Ada", "ada@example.com");
        let before = directory.records.get(&id).unwrap().metadata.updated_at;

        let updated = directory.update(&id, |p| p.days_active = 7).unwrap();
        assert_eq!(updated.days_active, 7);

        let after = directory.records.get(&id).unwrap().metadata.updated_at;
        assert!(after >= before);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let directory = ParticipantDirectory::new();
        for (name, email) in [("A", "a@x.com"), ("B", "b@x.com"), ("C", "c@x.com")] {
            directory
                .insert(Participant::new(name, email, Role::Participant), String::new())
                .unwrap();
        }
        let names: Vec<String> = directory.list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_search_matches_name_email_and_college() {
        let directory = ParticipantDirectory::new();
        let mut emily = Participant::new("Emily Johnson", "emily@example.com", Role::Participant);
        emily.college = Some("Stanford University".to_string());
        directory.insert(emily, String::new()).unwrap();
        directory
            .insert(
                Participant::new("Michael Smith", "michael@example.com", Role::Participant),
                String::new(),
            )
            .unwrap();

        assert_eq!(directory.search("emily").len(), 1);
        assert_eq!(directory.search("EXAMPLE.COM").len(), 2);
        assert_eq!(directory.search("stanford").len(), 1);
        assert!(directory.search("nothing-here").is_empty());
    }

    #[test]
    fn test_certificate_override_and_activity() {
        let (directory, id) = directory_with("Ada", "ada@example.com");

        let enabled = directory.set_certificate_enabled(&id, true).unwrap();
        assert!(enabled.certificate_enabled);

        assert_eq!(directory.record_activity(&id).unwrap(), 1);
        assert_eq!(directory.record_activity(&id).unwrap(), 2);
    }
}
