// Notification sink backed by the record store.
//
// Each sent notification becomes an unread Notification row for the recipient.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{BaseNotificationSink, BaseRecordStore};
use crate::domains::notifications::{Notification, OutgoingNotification};

pub struct StoreNotificationSink {
    store: Arc<dyn BaseRecordStore>,
}

impl StoreNotificationSink {
    pub fn new(store: Arc<dyn BaseRecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseNotificationSink for StoreNotificationSink {
    async fn send(&self, notification: OutgoingNotification) -> Result<()> {
        let record = Notification::from(notification);
        debug!(
            recipient = %record.recipient_account_id,
            kind = %record.kind,
            "Storing notification"
        );
        self.store.create_notification(record).await?;
        Ok(())
    }
}
