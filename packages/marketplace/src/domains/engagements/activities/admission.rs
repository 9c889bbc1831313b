//! Engagement admission control
//!
//! Validates a booking request and admits it as a pending engagement. Every
//! check runs before the first write, so a rejected request leaves the store
//! untouched. The duplicate check is repeated atomically by the store's
//! conditional insert, which is what closes the race between two concurrent
//! requests for the same pair.

use chrono::Utc;
use tracing::{info, warn};

use crate::common::{catalog, Capability, EngagementId, MarketplaceError, Result, ValidationError};
use crate::domains::engagements::{
    Engagement, EngagementFilter, EngagementRequest, EngagementStatus, MeetingMode,
};
use crate::domains::notifications::{NotificationKind, OutgoingNotification};
use crate::domains::providers::ProviderCounter;
use crate::kernel::{Collection, MarketplaceDeps, Query};

/// Admit a booking request from the calling student.
///
/// Checks, in order: schedule in the future, subject and level present and
/// in the catalog, location for in-person sessions, the tutor exists and is
/// approved, no open engagement with this tutor already.
pub async fn create_engagement(
    request: EngagementRequest,
    deps: &MarketplaceDeps,
) -> Result<Engagement> {
    let actor = deps.actor().await?.can(Capability::BookSessions).check()?;
    actor.ensure_is(request.student_account_id)?;

    let now = Utc::now();
    if request.scheduled_at <= now {
        return Err(MarketplaceError::InvalidSchedule {
            scheduled_at: request.scheduled_at,
        });
    }

    let subject = catalog::require("subject", &request.subject)?;
    let level = catalog::require("level", &request.level)?;
    catalog::ensure_subject(subject)?;
    catalog::ensure_level(level)?;

    let location = match request.meeting_mode {
        MeetingMode::InPerson => {
            let location = request.location.as_deref().unwrap_or_default();
            Some(catalog::require("location", location)?.to_string())
        }
        MeetingMode::Remote | MeetingMode::Either => None,
    };

    let provider_id = request.provider_account_id;
    let provider = deps
        .store
        .get_provider(provider_id)
        .await?
        .ok_or_else(|| MarketplaceError::not_found(Collection::Providers, provider_id))?;
    if !provider.is_bookable() {
        return Err(ValidationError::ProviderNotBookable(provider_id).into());
    }

    let open = deps
        .store
        .query_engagements(
            Query::new(EngagementFilter::open_between(actor.id, provider_id)).limit(1),
        )
        .await?;
    if let Some(existing) = open.first() {
        return Err(MarketplaceError::DuplicateEngagement {
            existing: Some(existing.id),
        });
    }

    let engagement = Engagement {
        id: EngagementId::new(),
        student_account_id: actor.id,
        provider_account_id: provider_id,
        scheduled_at: request.scheduled_at,
        duration: request.duration,
        subject: subject.to_string(),
        level: level.to_string(),
        meeting_mode: request.meeting_mode,
        location,
        notes: request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        total_amount: provider.hourly_rate * request.duration.hours(),
        lifecycle_status: EngagementStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    deps.store.create_engagement(engagement.clone()).await?;

    info!(
        engagement_id = %engagement.id,
        student_id = %actor.id,
        provider_id = %provider_id,
        total_amount = %engagement.total_amount,
        "Engagement requested"
    );

    if let Err(e) = deps
        .store
        .increment_provider_counter(provider_id, ProviderCounter::EngagementRequests)
        .await
    {
        warn!(provider_id = %provider_id, error = %e, "Failed to bump engagement request count");
    }

    let student_name = match deps.store.get_account(actor.id).await {
        Ok(Some(account)) => account.display_name,
        _ => "A student".to_string(),
    };
    deps.notify(
        OutgoingNotification::new(
            provider_id,
            NotificationKind::NewBooking,
            "New Booking Request",
            format!(
                "{} has requested a {}-hour session",
                student_name, engagement.duration
            ),
        )
        .about(engagement.id),
    )
    .await;

    Ok(engagement)
}
