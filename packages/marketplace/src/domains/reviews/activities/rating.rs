//! Rating aggregation
//!
//! A provider's `average_rating` and `review_count` are a pure function of
//! its approved reviews. Every trigger re-reads the full set, so concurrent
//! recomputes converge and a missed write is healed by the next one.

use serde::Serialize;
use tracing::{info, warn};

use crate::common::{ProviderId, Result};
use crate::domains::engagements::{EngagementFilter, EngagementStatus};
use crate::domains::providers::{Provider, ProviderFilter, ProviderPatch};
use crate::domains::reviews::{RatingSummary, ReviewFilter};
use crate::kernel::{MarketplaceDeps, Query};

/// Recompute and store the provider's rating summary.
///
/// Writes only the provider record. Safe to call any number of times.
pub async fn on_review_approved(
    provider_id: ProviderId,
    deps: &MarketplaceDeps,
) -> Result<RatingSummary> {
    let summary = approved_rating(provider_id, deps).await?;

    deps.store
        .update_provider(provider_id, ProviderPatch::rating(summary))
        .await?;

    info!(
        provider_id = %provider_id,
        average_rating = summary.average_rating,
        review_count = summary.review_count,
        "Provider rating recomputed"
    );

    Ok(summary)
}

async fn approved_rating(provider_id: ProviderId, deps: &MarketplaceDeps) -> Result<RatingSummary> {
    let approved = deps
        .store
        .query_reviews(Query::new(ReviewFilter::approved_for(provider_id)))
        .await?;
    Ok(RatingSummary::from_ratings(approved.iter().map(|r| r.rating)))
}

/// Outcome of a [`reconcile_ratings`] sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationReport {
    /// Providers looked at
    pub examined: usize,
    /// Providers whose stored aggregates were stale and got rewritten
    pub corrected: usize,
    /// Providers that could not be reconciled this time
    pub failed: Vec<ProviderId>,
}

/// Maintenance sweep: recompute every provider's rating and engagement
/// counters from source rows and rewrite the ones that drifted.
///
/// A failure for one provider is logged and recorded; the sweep carries on.
pub async fn reconcile_ratings(deps: &MarketplaceDeps) -> Result<ReconciliationReport> {
    let providers = deps
        .store
        .query_providers(Query::new(ProviderFilter::default()))
        .await?;

    info!(count = providers.len(), "Reconciling provider aggregates");

    let mut report = ReconciliationReport::default();
    for provider in providers {
        report.examined += 1;
        let provider_id = provider.account_id;
        match reconcile_one(provider, deps).await {
            Ok(true) => report.corrected += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(provider_id = %provider_id, error = %e, "Failed to reconcile provider");
                report.failed.push(provider_id);
            }
        }
    }

    info!(
        examined = report.examined,
        corrected = report.corrected,
        failed = report.failed.len(),
        "Reconciliation finished"
    );

    Ok(report)
}

/// Returns whether anything had to be rewritten.
async fn reconcile_one(provider: Provider, deps: &MarketplaceDeps) -> Result<bool> {
    let provider_id = provider.account_id;
    let summary = approved_rating(provider_id, deps).await?;

    let engagements = deps
        .store
        .query_engagements(Query::new(EngagementFilter::for_provider(provider_id)))
        .await?;
    let requested = u32::try_from(engagements.len()).unwrap_or(u32::MAX);
    let completed = engagements
        .iter()
        .filter(|e| e.lifecycle_status == EngagementStatus::Completed)
        .count();
    let completed = u32::try_from(completed).unwrap_or(u32::MAX);

    let rating_stale = provider.average_rating != summary.average_rating
        || provider.review_count != summary.review_count;
    let counters_stale = provider.engagement_request_count != requested
        || provider.completed_engagement_count != completed;

    if !rating_stale && !counters_stale {
        return Ok(false);
    }

    let patch = ProviderPatch {
        average_rating: Some(summary.average_rating),
        review_count: Some(summary.review_count),
        ..ProviderPatch::counters(requested, completed)
    };
    deps.store.update_provider(provider_id, patch).await?;

    info!(
        provider_id = %provider_id,
        average_rating = summary.average_rating,
        review_count = summary.review_count,
        engagement_request_count = requested,
        completed_engagement_count = completed,
        "Provider aggregates corrected"
    );

    Ok(true)
}
