//! Engagement lifecycle after admission
//!
//! The tutor confirms, declines or completes; either party may cancel while
//! the engagement is open. Each step notifies the other party.

use tracing::{info, warn};

use crate::common::{
    AccountId, AuthError, Capability, EngagementId, MarketplaceError, Result, ValidationError,
};
use crate::domains::accounts::AccountRole;
use crate::domains::engagements::{
    Engagement, EngagementAction, EngagementFilter, EngagementPatch, EngagementStatus,
};
use crate::domains::notifications::{NotificationKind, OutgoingNotification};
use crate::domains::providers::ProviderCounter;
use crate::kernel::{Collection, MarketplaceDeps, Query, StoreError};

pub async fn confirm_engagement(
    engagement_id: EngagementId,
    deps: &MarketplaceDeps,
) -> Result<Engagement> {
    transition(engagement_id, EngagementAction::Confirm, deps).await
}

pub async fn decline_engagement(
    engagement_id: EngagementId,
    deps: &MarketplaceDeps,
) -> Result<Engagement> {
    transition(engagement_id, EngagementAction::Decline, deps).await
}

/// Mark a confirmed session as held. Bumps the tutor's completed count.
pub async fn complete_engagement(
    engagement_id: EngagementId,
    deps: &MarketplaceDeps,
) -> Result<Engagement> {
    let engagement = transition(engagement_id, EngagementAction::Complete, deps).await?;

    let provider_id = engagement.provider_account_id;
    if let Err(e) = deps
        .store
        .increment_provider_counter(provider_id, ProviderCounter::CompletedEngagements)
        .await
    {
        warn!(provider_id = %provider_id, error = %e, "Failed to bump completed engagement count");
    }

    Ok(engagement)
}

pub async fn cancel_engagement(
    engagement_id: EngagementId,
    deps: &MarketplaceDeps,
) -> Result<Engagement> {
    transition(engagement_id, EngagementAction::Cancel, deps).await
}

/// The caller's engagements as student or tutor, latest session first.
pub async fn list_engagements_for_actor(
    limit: Option<usize>,
    deps: &MarketplaceDeps,
) -> Result<Vec<Engagement>> {
    let actor = deps.actor().await?;
    let mut query = Query::new(EngagementFilter::involving(actor.id)).newest_first();
    query.limit = limit;
    Ok(deps.store.query_engagements(query).await?)
}

async fn transition(
    engagement_id: EngagementId,
    action: EngagementAction,
    deps: &MarketplaceDeps,
) -> Result<Engagement> {
    let actor = deps.actor().await?;
    // Students may only cancel; everything else is the tutor's call
    let as_student = actor.role == AccountRole::Student && action.allowed_for_student();
    let actor = if as_student {
        actor
    } else {
        actor.can(Capability::RespondToBookings).check()?
    };

    let engagement = deps
        .store
        .get_engagement(engagement_id)
        .await?
        .ok_or_else(|| MarketplaceError::not_found(Collection::Engagements, engagement_id))?;

    let (own_side, other_side) = if as_student {
        (engagement.student_account_id, engagement.provider_account_id)
    } else {
        (engagement.provider_account_id, engagement.student_account_id)
    };
    if own_side != actor.id {
        return Err(AuthError::NotAParticipant.into());
    }

    let from = engagement.lifecycle_status;
    let invalid = |from: String| ValidationError::InvalidTransition {
        entity: "session",
        from,
        action: action.verb(),
    };
    let next = action
        .transition(from)
        .ok_or_else(|| invalid(from.to_string()))?;

    let updated = match deps
        .store
        .update_engagement(engagement_id, from, EngagementPatch::status(next))
        .await
    {
        Ok(updated) => updated,
        Err(StoreError::StatusChanged { current, .. }) => {
            info!(
                engagement_id = %engagement_id,
                expected = %from,
                current = %current,
                "Engagement changed status concurrently"
            );
            return Err(invalid(current).into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        engagement_id = %engagement_id,
        actor_id = %actor.id,
        from = %from,
        to = %next,
        "Engagement status changed"
    );

    deps.notify(notification_for(&updated, next, other_side)).await;

    Ok(updated)
}

fn notification_for(
    engagement: &Engagement,
    status: EngagementStatus,
    recipient: AccountId,
) -> OutgoingNotification {
    let when = engagement.scheduled_at.format("%Y-%m-%d %H:%M UTC");
    let (kind, title, body) = match status {
        EngagementStatus::Confirmed => (
            NotificationKind::BookingConfirmed,
            "Booking Confirmed",
            format!("Your {} session on {} has been confirmed", engagement.subject, when),
        ),
        EngagementStatus::Rejected => (
            NotificationKind::BookingDeclined,
            "Booking Declined",
            format!("Your {} session request for {} was declined", engagement.subject, when),
        ),
        EngagementStatus::Completed => (
            NotificationKind::BookingCompleted,
            "Session Completed",
            format!(
                "Your {} session on {} is complete. You can now leave a review",
                engagement.subject, when
            ),
        ),
        EngagementStatus::Cancelled | EngagementStatus::Pending => (
            NotificationKind::BookingCancelled,
            "Booking Cancelled",
            format!("The {} session on {} has been cancelled", engagement.subject, when),
        ),
    };

    OutgoingNotification::new(recipient, kind, title, body).about(engagement.id)
}
