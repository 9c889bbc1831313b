use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{text_enum, AccountId, NotificationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewBooking,
    BookingConfirmed,
    BookingDeclined,
    BookingCompleted,
    BookingCancelled,
    ProviderApproved,
    ProviderRejected,
}

text_enum!(NotificationKind, "notification kind" {
    NewBooking => "new_booking",
    BookingConfirmed => "booking_confirmed",
    BookingDeclined => "booking_declined",
    BookingCompleted => "booking_completed",
    BookingCancelled => "booking_cancelled",
    ProviderApproved => "provider_approved",
    ProviderRejected => "provider_rejected",
});

/// A message handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingNotification {
    pub recipient_account_id: AccountId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_entity_id: Option<Uuid>,
}

impl OutgoingNotification {
    pub fn new(
        recipient_account_id: AccountId,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient_account_id,
            kind,
            title: title.into(),
            body: body.into(),
            related_entity_id: None,
        }
    }

    pub fn about(mut self, entity_id: impl Into<Uuid>) -> Self {
        self.related_entity_id = Some(entity_id.into());
        self
    }
}

/// Notification record - write-once, only `read` changes afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_account_id: AccountId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_entity_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<OutgoingNotification> for Notification {
    fn from(outgoing: OutgoingNotification) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_account_id: outgoing.recipient_account_id,
            kind: outgoing.kind,
            title: outgoing.title,
            body: outgoing.body,
            related_entity_id: outgoing.related_entity_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub recipient: Option<AccountId>,
}

impl NotificationFilter {
    pub fn for_recipient(recipient: AccountId) -> Self {
        Self {
            recipient: Some(recipient),
        }
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        self.recipient
            .map_or(true, |id| notification.recipient_account_id == id)
    }
}
