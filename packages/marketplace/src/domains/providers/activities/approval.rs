//! Provider approval workflow (admin only)
//!
//! `pending -> approved`, `pending -> rejected`. Both outcomes are terminal.
//! The provider and account records are both read before the first write, and
//! each effect is an independent write in a fixed order: provider, account,
//! notification. Repeating a decision finishes whatever an earlier, partly
//! failed attempt left undone.

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::common::{Capability, MarketplaceError, ProviderId, Result, ValidationError};
use crate::domains::accounts::{Account, AccountPatch, AccountStatus};
use crate::domains::notifications::{NotificationKind, OutgoingNotification};
use crate::domains::providers::{ApprovalStatus, Provider, ProviderFilter, ProviderPatch};
use crate::kernel::{Collection, MarketplaceDeps, Query};

/// Minimum length of a trimmed rejection reason.
pub const MIN_REJECTION_REASON_LEN: usize = 10;

/// Set on the account when its provider application is rejected.
pub const REJECTION_SUSPENSION_REASON: &str = "Tutor application rejected";

/// A provider awaiting review, with the account it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingProvider {
    pub provider: Provider,
    pub account: Account,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApprovalStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

async fn load_application(
    provider_id: ProviderId,
    deps: &MarketplaceDeps,
) -> Result<(Provider, Account)> {
    let provider = deps
        .store
        .get_provider(provider_id)
        .await?
        .ok_or_else(|| MarketplaceError::not_found(Collection::Providers, provider_id))?;
    let account = deps
        .store
        .get_account(provider_id)
        .await?
        .ok_or_else(|| MarketplaceError::not_found(Collection::Accounts, provider_id))?;
    Ok((provider, account))
}

fn invalid_transition(provider: &Provider, action: &'static str) -> MarketplaceError {
    ValidationError::InvalidTransition {
        entity: "tutor application",
        from: provider.approval_status.to_string(),
        action,
    }
    .into()
}

/// Approve a pending provider.
///
/// Approving an approved provider whose account is already active is a
/// no-op: nothing is written and no second notification goes out. If the
/// account was never activated, the account write and the notification are
/// redone.
pub async fn approve_provider(
    provider_id: ProviderId,
    confirm: bool,
    deps: &MarketplaceDeps,
) -> Result<Provider> {
    let actor = deps.actor().await?.can(Capability::ReviewProviders).check()?;
    if !confirm {
        return Err(ValidationError::ConfirmationRequired.into());
    }

    let (provider, account) = load_application(provider_id, deps).await?;

    let provider = match provider.approval_status {
        ApprovalStatus::Approved => {
            if account.lifecycle_status == AccountStatus::Active && account.profile_completed {
                info!(provider_id = %provider_id, "Provider already approved, nothing to do");
                return Ok(provider);
            }
            warn!(
                provider_id = %provider_id,
                account_status = %account.lifecycle_status,
                "Provider approved but account not activated, finishing approval"
            );
            provider
        }
        ApprovalStatus::Rejected => return Err(invalid_transition(&provider, "approve")),
        ApprovalStatus::Pending => {
            info!(provider_id = %provider_id, approved_by = %actor.id, "Approving provider");
            deps.store
                .update_provider(provider_id, ProviderPatch::approved(actor.id, Utc::now()))
                .await?
        }
    };

    deps.store
        .update_account(provider_id, AccountPatch::activated())
        .await?;

    deps.notify(
        OutgoingNotification::new(
            provider_id,
            NotificationKind::ProviderApproved,
            "Congratulations! Your tutor profile has been approved.",
            "You can now start accepting students and booking sessions.",
        )
        .about(provider_id),
    )
    .await;

    Ok(provider)
}

/// Reject a pending provider with a reason shown to them.
///
/// The reason is checked before anything is read or written. Rejecting a
/// rejected provider whose account is already suspended is a no-op;
/// otherwise the suspension and notification are redone with the stored
/// reason.
pub async fn reject_provider(
    provider_id: ProviderId,
    reason: &str,
    confirm: bool,
    deps: &MarketplaceDeps,
) -> Result<Provider> {
    let reason = reason.trim();
    let length = reason.chars().count();
    if length < MIN_REJECTION_REASON_LEN {
        return Err(ValidationError::ReasonTooShort {
            min: MIN_REJECTION_REASON_LEN,
            actual: length,
        }
        .into());
    }

    let actor = deps.actor().await?.can(Capability::ReviewProviders).check()?;
    if !confirm {
        return Err(ValidationError::ConfirmationRequired.into());
    }

    let (provider, account) = load_application(provider_id, deps).await?;

    let provider = match provider.approval_status {
        ApprovalStatus::Rejected => {
            if account.lifecycle_status == AccountStatus::Suspended {
                info!(provider_id = %provider_id, "Provider already rejected, nothing to do");
                return Ok(provider);
            }
            warn!(
                provider_id = %provider_id,
                account_status = %account.lifecycle_status,
                "Provider rejected but account not suspended, finishing rejection"
            );
            provider
        }
        ApprovalStatus::Approved => return Err(invalid_transition(&provider, "reject")),
        ApprovalStatus::Pending => {
            info!(provider_id = %provider_id, rejected_by = %actor.id, reason = %reason, "Rejecting provider");
            deps.store
                .update_provider(
                    provider_id,
                    ProviderPatch::rejected(actor.id, Utc::now(), reason),
                )
                .await?
        }
    };
    let reason = provider.rejection_reason.as_deref().unwrap_or(reason);

    deps.store
        .update_account(
            provider_id,
            AccountPatch::suspended(REJECTION_SUSPENSION_REASON),
        )
        .await?;

    deps.notify(
        OutgoingNotification::new(
            provider_id,
            NotificationKind::ProviderRejected,
            "Your tutor profile has been reviewed",
            format!(
                "Unfortunately, your application was rejected. Reason: {}",
                reason
            ),
        )
        .about(provider_id),
    )
    .await;

    Ok(provider)
}

/// The approval queue, newest application first.
///
/// A provider whose account cannot be read is left out and logged.
pub async fn list_pending_providers(deps: &MarketplaceDeps) -> Result<Vec<PendingProvider>> {
    deps.actor().await?.can(Capability::ReviewProviders).check()?;

    let providers = deps
        .store
        .query_providers(Query::new(ProviderFilter::with_status(ApprovalStatus::Pending)).newest_first())
        .await?;

    let lookups = providers
        .iter()
        .map(|provider| deps.store.get_account(provider.account_id));
    let accounts = join_all(lookups).await;

    let pending = providers
        .into_iter()
        .zip(accounts)
        .filter_map(|(provider, account)| match account {
            Ok(Some(account)) => Some(PendingProvider { provider, account }),
            Ok(None) => {
                warn!(provider_id = %provider.account_id, "Pending provider has no account, skipping");
                None
            }
            Err(e) => {
                warn!(provider_id = %provider.account_id, error = %e, "Failed to load account for pending provider");
                None
            }
        })
        .collect::<Vec<_>>();

    info!(count = pending.len(), "Listed pending providers");

    Ok(pending)
}

/// Provider counts per approval status, for the admin dashboard.
pub async fn approval_stats(deps: &MarketplaceDeps) -> Result<ApprovalStats> {
    deps.actor().await?.can(Capability::ReviewProviders).check()?;

    let providers = deps
        .store
        .query_providers(Query::new(ProviderFilter::default()))
        .await?;

    let mut stats = ApprovalStats {
        total: providers.len(),
        ..Default::default()
    };
    for provider in &providers {
        match provider.approval_status {
            ApprovalStatus::Pending => stats.pending += 1,
            ApprovalStatus::Approved => stats.approved += 1,
            ApprovalStatus::Rejected => stats.rejected += 1,
        }
    }

    Ok(stats)
}
