// TestDependencies - in-memory implementations for testing
//
// Wires MarketplaceDeps over a MemoryStore, a StaticIdentity and a spy
// notification sink, and keeps handles to each for assertions.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseNotificationSink, MarketplaceDeps, MemoryStore, StaticIdentity};
use crate::common::Actor;
use crate::domains::notifications::{NotificationKind, OutgoingNotification};
use crate::domains::providers::DirectorySettings;

// =============================================================================
// Spy Notification Sink
// =============================================================================

/// Records every notification it is handed. Can be switched to fail.
#[derive(Clone, Default)]
pub struct SpyNotificationSink {
    sent: Arc<Mutex<Vec<OutgoingNotification>>>,
    failing: Arc<AtomicBool>,
}

impl SpyNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subsequent sends return an error (and are not recorded).
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingNotification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_of_kind(&self, kind: NotificationKind) -> Vec<OutgoingNotification> {
        self.sent()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl BaseNotificationSink for SpyNotificationSink {
    async fn send(&self, notification: OutgoingNotification) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("notification sink unavailable");
        }
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("spy sink lock poisoned"))?
            .push(notification);
        Ok(())
    }
}

// =============================================================================
// Test Dependencies
// =============================================================================

pub struct TestDependencies {
    pub store: MemoryStore,
    pub notifier: SpyNotificationSink,
    pub directory: DirectorySettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            notifier: SpyNotificationSink::new(),
            directory: DirectorySettings::default(),
        }
    }

    pub fn with_directory_settings(mut self, directory: DirectorySettings) -> Self {
        self.directory = directory;
        self
    }

    /// Deps acting as `actor`, sharing this store and spy.
    pub fn deps_as(&self, actor: Actor) -> MarketplaceDeps {
        self.deps_with(StaticIdentity::new(actor))
    }

    /// Deps with no authenticated caller.
    pub fn anonymous_deps(&self) -> MarketplaceDeps {
        self.deps_with(StaticIdentity::anonymous())
    }

    fn deps_with(&self, identity: StaticIdentity) -> MarketplaceDeps {
        MarketplaceDeps::new(
            Arc::new(self.store.clone()),
            Arc::new(identity),
            Arc::new(self.notifier.clone()),
        )
        .with_directory_settings(self.directory.clone())
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
