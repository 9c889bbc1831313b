use crate::common::{AccountId, Result};
use crate::domains::notifications::{Notification, NotificationFilter};
use crate::kernel::{MarketplaceDeps, Query};

/// An account's notifications, newest first. Callers may only read their own.
pub async fn notifications_for(
    account_id: AccountId,
    limit: Option<usize>,
    deps: &MarketplaceDeps,
) -> Result<Vec<Notification>> {
    deps.actor().await?.ensure_is(account_id)?;

    let mut query = Query::new(NotificationFilter::for_recipient(account_id)).newest_first();
    query.limit = limit;
    Ok(deps.store.query_notifications(query).await?)
}
