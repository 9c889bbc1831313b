//! Provider profile submission

use tracing::info;

use crate::common::{catalog, Capability, Result, ValidationError};
use crate::domains::accounts::AccountPatch;
use crate::domains::providers::{ApprovalStatus, Provider, ProviderPatch, ProviderProfileInput};
use crate::kernel::MarketplaceDeps;

fn validate(profile: &ProviderProfileInput) -> Result<(), ValidationError> {
    if profile.subjects.is_empty() {
        return Err(ValidationError::MissingField { field: "subject" });
    }
    if profile.teaching_levels.is_empty() {
        return Err(ValidationError::MissingField {
            field: "teaching level",
        });
    }
    for subject in &profile.subjects {
        catalog::ensure_subject(subject)?;
    }
    for level in &profile.teaching_levels {
        catalog::ensure_level(level)?;
    }
    if profile.hourly_rate.is_sign_negative() {
        return Err(ValidationError::NegativeRate);
    }
    Ok(())
}

/// Create or edit the caller's tutor profile.
///
/// A first submission creates a pending provider. Later submissions edit the
/// profile without touching the approval status. A rejected application
/// cannot be resubmitted.
pub async fn submit_provider_profile(
    profile: ProviderProfileInput,
    deps: &MarketplaceDeps,
) -> Result<Provider> {
    let actor = deps
        .actor()
        .await?
        .can(Capability::ManageProviderProfile)
        .check()?;
    validate(&profile)?;

    let provider = match deps.store.get_provider(actor.id).await? {
        None => {
            info!(provider_id = %actor.id, "Submitting tutor profile for review");
            let provider = Provider::pending(actor.id, profile);
            deps.store.create_provider(provider.clone()).await?;
            provider
        }
        Some(existing) if existing.approval_status == ApprovalStatus::Rejected => {
            return Err(ValidationError::InvalidTransition {
                entity: "tutor application",
                from: existing.approval_status.to_string(),
                action: "resubmit",
            }
            .into());
        }
        Some(existing) => {
            info!(
                provider_id = %actor.id,
                approval_status = %existing.approval_status,
                "Updating tutor profile"
            );
            deps.store
                .update_provider(actor.id, ProviderPatch::profile(profile))
                .await?
        }
    };

    deps.store
        .update_account(actor.id, AccountPatch::profile_completed())
        .await?;

    Ok(provider)
}
