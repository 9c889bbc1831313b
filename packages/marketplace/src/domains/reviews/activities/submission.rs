//! Review submission and the public review list

use chrono::Utc;
use tracing::info;

use crate::common::{catalog, Capability, MarketplaceError, ProviderId, Result, ReviewId, ValidationError};
use crate::domains::engagements::EngagementStatus;
use crate::domains::reviews::{ModerationStatus, Review, ReviewFilter, ReviewSubmission};
use crate::kernel::{Collection, MarketplaceDeps, Query};

/// Store a student's review of a tutor as pending moderation.
///
/// When the review names an engagement, that engagement must be between the
/// same student and tutor and must have been completed.
pub async fn submit_review(input: ReviewSubmission, deps: &MarketplaceDeps) -> Result<Review> {
    let actor = deps.actor().await?.can(Capability::SubmitReviews).check()?;

    let rating = u8::try_from(input.rating)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or(ValidationError::RatingOutOfRange(input.rating))?;
    let comment = catalog::require("comment", &input.comment)?.to_string();

    let provider_id = input.provider_account_id;
    if deps.store.get_provider(provider_id).await?.is_none() {
        return Err(MarketplaceError::not_found(Collection::Providers, provider_id));
    }

    if let Some(engagement_id) = input.engagement_id {
        let engagement = deps
            .store
            .get_engagement(engagement_id)
            .await?
            .ok_or_else(|| MarketplaceError::not_found(Collection::Engagements, engagement_id))?;

        if engagement.student_account_id != actor.id
            || engagement.provider_account_id != provider_id
        {
            return Err(ValidationError::EngagementMismatch.into());
        }
        if engagement.lifecycle_status != EngagementStatus::Completed {
            return Err(ValidationError::InvalidTransition {
                entity: "session",
                from: engagement.lifecycle_status.to_string(),
                action: "review",
            }
            .into());
        }
    }

    let review = Review {
        id: ReviewId::new(),
        provider_account_id: provider_id,
        student_account_id: actor.id,
        engagement_id: input.engagement_id,
        rating,
        comment,
        moderation_status: ModerationStatus::Pending,
        moderated_at: None,
        moderated_by: None,
        created_at: Utc::now(),
    };
    deps.store.create_review(review.clone()).await?;

    info!(
        review_id = %review.id,
        provider_id = %provider_id,
        student_id = %actor.id,
        rating = rating,
        "Review submitted for moderation"
    );

    Ok(review)
}

/// Approved reviews of a tutor, newest first. Public; no actor required.
pub async fn approved_reviews_for(
    provider_id: ProviderId,
    limit: Option<usize>,
    deps: &MarketplaceDeps,
) -> Result<Vec<Review>> {
    let mut query = Query::new(ReviewFilter::approved_for(provider_id)).newest_first();
    query.limit = limit;
    Ok(deps.store.query_reviews(query).await?)
}
