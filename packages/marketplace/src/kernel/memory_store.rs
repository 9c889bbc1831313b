//! In-process record store.
//!
//! Backs tests and local runs. One `RwLock` guards all collections, so the
//! conditional engagement insert and counter bumps are atomic here too.
//! Tests can count writes and simulate an outage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::{BaseRecordStore, Collection, Query, RecordOrder, StoreError, StoreResult};
use crate::common::{AccountId, EngagementId, NotificationId, ProviderId, ReviewId};
use crate::domains::accounts::{Account, AccountFilter, AccountPatch};
use crate::domains::engagements::{Engagement, EngagementFilter, EngagementPatch, EngagementStatus};
use crate::domains::notifications::{Notification, NotificationFilter};
use crate::domains::providers::{Provider, ProviderCounter, ProviderFilter, ProviderPatch};
use crate::domains::reviews::{Review, ReviewFilter, ReviewPatch};

#[derive(Default)]
struct Collections {
    accounts: Vec<Account>,
    providers: Vec<Provider>,
    engagements: Vec<Engagement>,
    reviews: Vec<Review>,
    notifications: Vec<Notification>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    writes: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful create/update calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// While set, every call fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(anyhow::anyhow!(
                "memory store is marked unavailable"
            )));
        }
        Ok(())
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Filters, orders and limits a collection snapshot.
fn select<T: Clone, F>(
    records: &[T],
    query: &Query<F>,
    matches: impl Fn(&F, &T) -> bool,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut selected: Vec<T> = records
        .iter()
        .filter(|record| matches(&query.filter, record))
        .cloned()
        .collect();

    match query.order {
        Some(RecordOrder::NewestFirst) => selected.sort_by_key(|r| std::cmp::Reverse(timestamp(r))),
        None => {}
    }

    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }
    selected
}

#[async_trait]
impl BaseRecordStore for MemoryStore {
    async fn create_account(&self, account: Account) -> StoreResult<AccountId> {
        self.ensure_available()?;
        let id = account.id;
        self.collections.write().await.accounts.push(account);
        self.wrote();
        Ok(id)
    }

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Account> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let account = collections
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found(Collection::Accounts, id))?;
        patch.apply(account);
        let updated = account.clone();
        self.wrote();
        Ok(updated)
    }

    async fn query_accounts(&self, query: Query<AccountFilter>) -> StoreResult<Vec<Account>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(select(
            &collections.accounts,
            &query,
            AccountFilter::matches,
            |a| a.created_at,
        ))
    }

    async fn create_provider(&self, provider: Provider) -> StoreResult<ProviderId> {
        self.ensure_available()?;
        let id = provider.account_id;
        self.collections.write().await.providers.push(provider);
        self.wrote();
        Ok(id)
    }

    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .providers
            .iter()
            .find(|p| p.account_id == id)
            .cloned())
    }

    async fn update_provider(&self, id: ProviderId, patch: ProviderPatch) -> StoreResult<Provider> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let provider = collections
            .providers
            .iter_mut()
            .find(|p| p.account_id == id)
            .ok_or_else(|| StoreError::not_found(Collection::Providers, id))?;
        patch.apply(provider);
        let updated = provider.clone();
        self.wrote();
        Ok(updated)
    }

    async fn query_providers(&self, query: Query<ProviderFilter>) -> StoreResult<Vec<Provider>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(select(
            &collections.providers,
            &query,
            ProviderFilter::matches,
            |p| p.created_at,
        ))
    }

    async fn increment_provider_counter(
        &self,
        id: ProviderId,
        counter: ProviderCounter,
    ) -> StoreResult<u32> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let provider = collections
            .providers
            .iter_mut()
            .find(|p| p.account_id == id)
            .ok_or_else(|| StoreError::not_found(Collection::Providers, id))?;
        let value = counter.bump(provider);
        provider.updated_at = Utc::now();
        self.wrote();
        Ok(value)
    }

    async fn create_engagement(&self, engagement: Engagement) -> StoreResult<EngagementId> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let open = EngagementFilter::open_between(
            engagement.student_account_id,
            engagement.provider_account_id,
        );
        if let Some(existing) = collections.engagements.iter().find(|e| open.matches(e)) {
            return Err(StoreError::OpenEngagementExists {
                existing: Some(existing.id),
            });
        }
        let id = engagement.id;
        collections.engagements.push(engagement);
        self.wrote();
        Ok(id)
    }

    async fn get_engagement(&self, id: EngagementId) -> StoreResult<Option<Engagement>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections.engagements.iter().find(|e| e.id == id).cloned())
    }

    async fn update_engagement(
        &self,
        id: EngagementId,
        expected: EngagementStatus,
        patch: EngagementPatch,
    ) -> StoreResult<Engagement> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let engagement = collections
            .engagements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found(Collection::Engagements, id))?;
        if engagement.lifecycle_status != expected {
            return Err(StoreError::StatusChanged {
                collection: Collection::Engagements,
                id: id.into_uuid(),
                expected: expected.to_string(),
                current: engagement.lifecycle_status.to_string(),
            });
        }
        patch.apply(engagement);
        let updated = engagement.clone();
        self.wrote();
        Ok(updated)
    }

    async fn query_engagements(
        &self,
        query: Query<EngagementFilter>,
    ) -> StoreResult<Vec<Engagement>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(select(
            &collections.engagements,
            &query,
            EngagementFilter::matches,
            |e| e.scheduled_at,
        ))
    }

    async fn create_review(&self, review: Review) -> StoreResult<ReviewId> {
        self.ensure_available()?;
        let id = review.id;
        self.collections.write().await.reviews.push(review);
        self.wrote();
        Ok(id)
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> StoreResult<Review> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let review = collections
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(Collection::Reviews, id))?;
        patch.apply(review);
        let updated = review.clone();
        self.wrote();
        Ok(updated)
    }

    async fn query_reviews(&self, query: Query<ReviewFilter>) -> StoreResult<Vec<Review>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(select(
            &collections.reviews,
            &query,
            ReviewFilter::matches,
            |r| r.created_at,
        ))
    }

    async fn create_notification(
        &self,
        notification: Notification,
    ) -> StoreResult<NotificationId> {
        self.ensure_available()?;
        let id = notification.id;
        self.collections.write().await.notifications.push(notification);
        self.wrote();
        Ok(id)
    }

    async fn query_notifications(
        &self,
        query: Query<NotificationFilter>,
    ) -> StoreResult<Vec<Notification>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(select(
            &collections.notifications,
            &query,
            NotificationFilter::matches,
            |n| n.created_at,
        ))
    }
}
