//! Public tutor profile page

use serde::Serialize;

use crate::common::{MarketplaceError, ProviderId, Result};
use crate::domains::accounts::AccountRole;
use crate::domains::providers::{merge, ProviderListing};
use crate::domains::reviews::{approved_reviews_for, Review};
use crate::kernel::{Collection, MarketplaceDeps};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderProfile {
    pub listing: ProviderListing,
    /// Approved reviews, newest first
    pub reviews: Vec<Review>,
}

pub async fn provider_profile(
    provider_id: ProviderId,
    deps: &MarketplaceDeps,
) -> Result<ProviderProfile> {
    let account = deps
        .store
        .get_account(provider_id)
        .await?
        .filter(|account| account.role == AccountRole::Provider)
        .ok_or_else(|| MarketplaceError::not_found(Collection::Accounts, provider_id))?;

    let provider = deps.store.get_provider(provider_id).await?;
    let listing = merge(&account, provider.as_ref(), &deps.directory);
    let reviews = approved_reviews_for(provider_id, None, deps).await?;

    Ok(ProviderProfile { listing, reviews })
}
