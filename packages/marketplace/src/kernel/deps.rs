//! Marketplace dependencies for activities (using traits for testability)
//!
//! Every activity receives a `&MarketplaceDeps`. External collaborators sit
//! behind trait objects so tests can swap in the in-memory store and spies.

use std::sync::Arc;
use tracing::warn;

use crate::common::{Actor, Result};
use crate::domains::notifications::OutgoingNotification;
use crate::domains::providers::DirectorySettings;
use crate::kernel::{BaseIdentityProvider, BaseNotificationSink, BaseRecordStore};

#[derive(Clone)]
pub struct MarketplaceDeps {
    pub store: Arc<dyn BaseRecordStore>,
    /// Resolves the caller of the current operation. Request handlers build a
    /// per-request copy with [`MarketplaceDeps::with_identity`].
    pub identity: Arc<dyn BaseIdentityProvider>,
    pub notifier: Arc<dyn BaseNotificationSink>,
    pub directory: DirectorySettings,
}

impl MarketplaceDeps {
    pub fn new(
        store: Arc<dyn BaseRecordStore>,
        identity: Arc<dyn BaseIdentityProvider>,
        notifier: Arc<dyn BaseNotificationSink>,
    ) -> Self {
        Self {
            store,
            identity,
            notifier,
            directory: DirectorySettings::default(),
        }
    }

    pub fn with_identity(&self, identity: Arc<dyn BaseIdentityProvider>) -> Self {
        Self {
            identity,
            ..self.clone()
        }
    }

    pub fn with_directory_settings(mut self, directory: DirectorySettings) -> Self {
        self.directory = directory;
        self
    }

    /// The authenticated caller.
    pub async fn actor(&self) -> Result<Actor> {
        Ok(self.identity.current_actor().await?)
    }

    /// Best-effort delivery: a failed send is logged and never fails the
    /// operation that triggered it.
    pub async fn notify(&self, notification: OutgoingNotification) {
        let recipient = notification.recipient_account_id;
        let kind = notification.kind;
        if let Err(e) = self.notifier.send(notification).await {
            warn!(recipient = %recipient, kind = %kind, error = %e, "Failed to send notification");
        }
    }
}
