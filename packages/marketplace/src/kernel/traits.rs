// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business rules live in domain activities that take these traits through
// MarketplaceDeps.
//
// Naming convention: Base* for trait names (e.g., BaseRecordStore)

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::common::{AccountId, Actor, AuthError, EngagementId, NotificationId, ProviderId, ReviewId};
use crate::domains::accounts::{Account, AccountFilter, AccountPatch};
use crate::domains::engagements::{Engagement, EngagementFilter, EngagementPatch, EngagementStatus};
use crate::domains::notifications::{Notification, NotificationFilter, OutgoingNotification};
use crate::domains::providers::{Provider, ProviderCounter, ProviderFilter, ProviderPatch};
use crate::domains::reviews::{Review, ReviewFilter, ReviewPatch};

// =============================================================================
// Record Store (Infrastructure - persistence of the five collections)
// =============================================================================

/// Named collections of the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Accounts,
    Providers,
    Engagements,
    Reviews,
    Notifications,
}

impl Collection {
    /// Singular record noun, used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Accounts => "account",
            Collection::Providers => "provider",
            Collection::Engagements => "engagement",
            Collection::Reviews => "review",
            Collection::Notifications => "notification",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{collection} {id} not found")]
    NotFound { collection: Collection, id: Uuid },

    /// The conditional engagement insert found a pending or confirmed
    /// engagement for the same student and provider.
    #[error("an open engagement already exists for this student and provider")]
    OpenEngagementExists { existing: Option<EngagementId> },

    /// A compare-and-set update found the record in another status.
    #[error("{collection} {id} is {current}, expected {expected}")]
    StatusChanged {
        collection: Collection,
        id: Uuid,
        expected: String,
        current: String,
    },

    #[error("record store unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(collection: Collection, id: impl Into<Uuid>) -> Self {
        StoreError::NotFound {
            collection,
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Ordering on a collection's natural timestamp: `created_at` for every
/// collection except engagements, which order by `scheduled_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    NewestFirst,
}

/// A predicate plus optional ordering and limit. Without an ordering,
/// records come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Query<F> {
    pub filter: F,
    pub order: Option<RecordOrder>,
    pub limit: Option<usize>,
}

impl<F> Query<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            order: None,
            limit: None,
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.order = Some(RecordOrder::NewestFirst);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<F: Default> Query<F> {
    pub fn all() -> Self {
        Self::new(F::default())
    }
}

/// Create/read/update/query access to the marketplace collections.
///
/// `get_*` returns `Ok(None)` for a missing record; `update_*` returns
/// `StoreError::NotFound`. There is no multi-record transaction: every call
/// is an independent write.
#[async_trait]
pub trait BaseRecordStore: Send + Sync {
    // Accounts
    async fn create_account(&self, account: Account) -> StoreResult<AccountId>;
    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>>;
    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Account>;
    async fn query_accounts(&self, query: Query<AccountFilter>) -> StoreResult<Vec<Account>>;

    // Providers
    async fn create_provider(&self, provider: Provider) -> StoreResult<ProviderId>;
    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>>;
    async fn update_provider(&self, id: ProviderId, patch: ProviderPatch) -> StoreResult<Provider>;
    async fn query_providers(&self, query: Query<ProviderFilter>) -> StoreResult<Vec<Provider>>;

    /// Atomically adds one to a derived counter and returns the new value.
    async fn increment_provider_counter(
        &self,
        id: ProviderId,
        counter: ProviderCounter,
    ) -> StoreResult<u32>;

    // Engagements

    /// Conditional insert: fails with `OpenEngagementExists` when the same
    /// student and provider already share a pending or confirmed engagement.
    /// The check and the insert are a single atomic step.
    async fn create_engagement(&self, engagement: Engagement) -> StoreResult<EngagementId>;
    async fn get_engagement(&self, id: EngagementId) -> StoreResult<Option<Engagement>>;

    /// Compare-and-set on the lifecycle status: applies `patch` only while
    /// the engagement is still `expected`, else fails with `StatusChanged`.
    async fn update_engagement(
        &self,
        id: EngagementId,
        expected: EngagementStatus,
        patch: EngagementPatch,
    ) -> StoreResult<Engagement>;
    async fn query_engagements(
        &self,
        query: Query<EngagementFilter>,
    ) -> StoreResult<Vec<Engagement>>;

    // Reviews
    async fn create_review(&self, review: Review) -> StoreResult<ReviewId>;
    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>>;
    async fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> StoreResult<Review>;
    async fn query_reviews(&self, query: Query<ReviewFilter>) -> StoreResult<Vec<Review>>;

    // Notifications (append only)
    async fn create_notification(&self, notification: Notification)
        -> StoreResult<NotificationId>;
    async fn query_notifications(
        &self,
        query: Query<NotificationFilter>,
    ) -> StoreResult<Vec<Notification>>;
}

// =============================================================================
// Identity Provider Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseIdentityProvider: Send + Sync {
    /// The authenticated caller and their role
    async fn current_actor(&self) -> std::result::Result<Actor, AuthError>;
}

// =============================================================================
// Notification Sink Trait (Infrastructure - fire-and-forget delivery)
// =============================================================================

#[async_trait]
pub trait BaseNotificationSink: Send + Sync {
    /// Deliver a notification. Callers log failures and carry on.
    async fn send(&self, notification: OutgoingNotification) -> Result<()>;
}
