//! Transient user-facing notifications.
//!
//! Fire-and-forget messages emitted by the workflows. Entries expire after
//! a fixed TTL; a background task sweeps expired entries so an idle
//! channel does not accumulate them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Severity of a notification, mapped to toast styling by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A workflow completed successfully
    Success,
    /// A workflow was refused or failed
    Error,
    /// Neutral information
    Info,
}

/// Configuration for the notification channel.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// How long a notification stays active before it expires
    pub ttl: Duration,

    /// How often the sweep task removes expired entries
    pub cleanup_interval: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5),
            cleanup_interval: Duration::from_secs(30),
        }
    }
}

/// A single transient notification.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Monotonic id, unique per channel
    pub id: u64,
    /// Message shown to the user
    pub message: String,
    /// Toast styling hint
    pub severity: Severity,
    /// When this entry expires (absolute time)
    expires_at: Instant,
}

impl Notification {
    /// Whether the entry has outlived its TTL
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Auto-expiring notification channel.
pub struct Notifier {
    entries: RwLock<Vec<Notification>>,
    next_id: AtomicU64,
    config: NotifierConfig,
}

impl Notifier {
    /// Create a channel with the given configuration.
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Create a channel with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(NotifierConfig::default())
    }

    /// Emit a notification. Never blocks the calling workflow.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            expires_at: Instant::now() + self.config.ttl,
        };
        debug!(id, severity = ?severity, "notification: {}", notification.message);
        if let Ok(mut entries) = self.entries.write() {
            entries.push(notification);
        }
        id
    }

    /// Active (unexpired) notifications in emission order.
    pub fn active(&self) -> Vec<Notification> {
        self.entries
            .read()
            .map(|entries| entries.iter().filter(|n| !n.is_expired()).cloned().collect())
            .unwrap_or_default()
    }

    /// Dismiss one notification before it expires.
    ///
    /// Returns true if the entry was still present.
    pub fn dismiss(&self, id: u64) -> bool {
        if let Ok(mut entries) = self.entries.write() {
            let before = entries.len();
            entries.retain(|n| n.id != id);
            return entries.len() != before;
        }
        false
    }

    /// Drop expired entries, returning how many were removed.
    pub fn cleanup(&self) -> usize {
        if let Ok(mut entries) = self.entries.write() {
            let before = entries.len();
            entries.retain(|n| !n.is_expired());
            return before - entries.len();
        }
        0
    }

    /// Number of stored entries, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the channel holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How often the sweep task should run.
    pub fn cleanup_interval(&self) -> Duration {
        self.config.cleanup_interval
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Spawn a background task that periodically sweeps expired notifications.
pub fn spawn_cleanup_task(notifier: Arc<Notifier>) {
    let interval = notifier.cleanup_interval();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = notifier.cleanup();
            if removed > 0 {
                debug!("Notification cleanup: removed {} expired entries", removed);
            }
        }
    });
    info!("Notification cleanup task started");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_lived() -> Notifier {
        Notifier::new(NotifierConfig {
            ttl: Duration::from_millis(10),
            cleanup_interval: Duration::from_millis(10),
        })
    }

    #[test]
    fn test_show_and_active_order() {
        let notifier = Notifier::with_defaults();
        notifier.show("first", Severity::Success);
        notifier.show("second", Severity::Error);

        let active = notifier.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].message, "first");
        assert_eq!(active[1].message, "second");
        assert!(active[0].id < active[1].id);
    }

    #[test]
    fn test_entries_expire() {
        let notifier = short_lived();
        notifier.show("soon gone", Severity::Info);
        assert_eq!(notifier.active().len(), 1);

        std::thread::sleep(Duration::from_millis(20));
        assert!(notifier.active().is_empty());

        // Still stored until a sweep runs
        assert_eq!(notifier.len(), 1);
        assert_eq!(notifier.cleanup(), 1);
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_cleanup_task_sweeps_expired_entries() {
        let notifier = Arc::new(short_lived());
        tokio_test::block_on(async {
            spawn_cleanup_task(notifier.clone());
            notifier.show("soon swept", Severity::Info);
            tokio::time::sleep(Duration::from_millis(60)).await;
        });
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let notifier = Notifier::with_defaults();
        let id = notifier.show("dismiss me", Severity::Info);
        assert!(notifier.dismiss(id));
        assert!(!notifier.dismiss(id));
        assert!(notifier.active().is_empty());
    }
}
