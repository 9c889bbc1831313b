//! Review moderation (admin only)
//!
//! `pending -> approved | rejected`, both terminal. Approving hands off to the
//! rating aggregator.

use chrono::Utc;
use tracing::info;

use crate::common::{Capability, MarketplaceError, Result, ReviewId, ValidationError};
use crate::domains::reviews::activities::rating::on_review_approved;
use crate::domains::reviews::{ModerationStatus, Review, ReviewPatch};
use crate::kernel::{Collection, MarketplaceDeps};

async fn load_review(review_id: ReviewId, deps: &MarketplaceDeps) -> Result<Review> {
    deps.store
        .get_review(review_id)
        .await?
        .ok_or_else(|| MarketplaceError::not_found(Collection::Reviews, review_id))
}

fn invalid_transition(review: &Review, action: &'static str) -> MarketplaceError {
    ValidationError::InvalidTransition {
        entity: "review",
        from: review.moderation_status.to_string(),
        action,
    }
    .into()
}

/// Approve a review and recompute the provider's rating.
///
/// Re-approving an approved review writes nothing to the review but still
/// recomputes, which repairs a rating write that failed earlier. A failed
/// rating write is returned as `StoreUnavailable`; the review stays approved.
pub async fn approve_review(
    review_id: ReviewId,
    confirm: bool,
    deps: &MarketplaceDeps,
) -> Result<Review> {
    let actor = deps.actor().await?.can(Capability::ModerateReviews).check()?;
    if !confirm {
        return Err(ValidationError::ConfirmationRequired.into());
    }

    let review = load_review(review_id, deps).await?;

    let review = match review.moderation_status {
        ModerationStatus::Rejected => return Err(invalid_transition(&review, "approve")),
        ModerationStatus::Approved => review,
        ModerationStatus::Pending => {
            info!(review_id = %review_id, moderated_by = %actor.id, "Approving review");
            deps.store
                .update_review(
                    review_id,
                    ReviewPatch::moderated(ModerationStatus::Approved, actor.id, Utc::now()),
                )
                .await?
        }
    };

    on_review_approved(review.provider_account_id, deps).await?;

    Ok(review)
}

/// Reject a pending review. Rejecting a rejected review is a no-op.
pub async fn reject_review(
    review_id: ReviewId,
    confirm: bool,
    deps: &MarketplaceDeps,
) -> Result<Review> {
    let actor = deps.actor().await?.can(Capability::ModerateReviews).check()?;
    if !confirm {
        return Err(ValidationError::ConfirmationRequired.into());
    }

    let review = load_review(review_id, deps).await?;

    match review.moderation_status {
        ModerationStatus::Approved => Err(invalid_transition(&review, "reject")),
        ModerationStatus::Rejected => Ok(review),
        ModerationStatus::Pending => {
            info!(review_id = %review_id, moderated_by = %actor.id, "Rejecting review");
            Ok(deps
                .store
                .update_review(
                    review_id,
                    ReviewPatch::moderated(ModerationStatus::Rejected, actor.id, Utc::now()),
                )
                .await?)
        }
    }
}
