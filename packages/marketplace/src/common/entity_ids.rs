//! Typed ids for every record collection.
//!
//! Providers are keyed by the account they belong to, so `ProviderId` is an
//! alias of `AccountId` rather than a distinct type.

pub use super::id::Id;

/// Entity marker types. Kept in their own module so they never shadow the
/// record structs of the same name in `domains`.
pub mod markers {
    pub struct Account;
    pub struct Engagement;
    pub struct Review;
    pub struct Notification;
}

/// Identity-provider subject of an account (student, provider or administrator).
pub type AccountId = Id<markers::Account>;

/// A provider shares the id of its account.
pub type ProviderId = AccountId;

/// Typed ID for Engagement (booking) records.
pub type EngagementId = Id<markers::Engagement>;

/// Typed ID for Review records.
pub type ReviewId = Id<markers::Review>;

/// Typed ID for Notification records.
pub type NotificationId = Id<markers::Notification>;
