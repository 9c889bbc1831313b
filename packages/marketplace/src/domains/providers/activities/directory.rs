//! Directory query engine
//!
//! Discovers provider accounts, merges each with its provider record, drops
//! the listings that should not be shown, then filters and ranks the rest.

use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::common::Result;
use crate::domains::accounts::{AccountFilter, AccountRole};
use crate::domains::providers::{merge, ProviderListing};
use crate::kernel::{MarketplaceDeps, Query};

/// Which part of the week a student is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityBucket {
    Weekdays,
    Weekends,
}

impl FromStr for AvailabilityBucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "weekdays" | "weekday" => Ok(AvailabilityBucket::Weekdays),
            "weekends" | "weekend" => Ok(AvailabilityBucket::Weekends),
            other => Err(anyhow::anyhow!("Invalid availability: {}", other)),
        }
    }
}

/// Optional, ANDed search predicates. Blank strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct DirectoryFilters {
    /// Case-insensitive substring of name, location, any subject or bio
    #[builder(default, setter(strip_option, into))]
    pub query: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub subject: Option<String>,
    /// Case-insensitive equality
    #[builder(default, setter(strip_option, into))]
    pub location: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub level: Option<String>,
    #[builder(default, setter(strip_option))]
    pub min_rate: Option<Decimal>,
    #[builder(default, setter(strip_option))]
    pub max_rate: Option<Decimal>,
    #[builder(default, setter(strip_option))]
    pub availability: Option<AvailabilityBucket>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DirectoryFilters {
    pub fn matches(&self, listing: &ProviderListing) -> bool {
        if let Some(query) = present(&self.query) {
            let needle = query.to_lowercase();
            let hit = listing.display_name.to_lowercase().contains(&needle)
                || listing.location.to_lowercase().contains(&needle)
                || listing
                    .subjects
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle))
                || listing.bio.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(subject) = present(&self.subject) {
            if !listing.subjects.iter().any(|s| s == subject) {
                return false;
            }
        }

        if let Some(location) = present(&self.location) {
            if listing.location.to_lowercase() != location.to_lowercase() {
                return false;
            }
        }

        if let Some(level) = present(&self.level) {
            if !listing.teaching_levels.iter().any(|l| l == level) {
                return false;
            }
        }

        if self.min_rate.is_some_and(|min| listing.hourly_rate < min) {
            return false;
        }
        if self.max_rate.is_some_and(|max| listing.hourly_rate > max) {
            return false;
        }

        if let Some(bucket) = self.availability {
            let wants_weekend = bucket == AvailabilityBucket::Weekends;
            if !listing
                .availability
                .iter()
                .any(|slot| slot.is_weekend() == wants_weekend)
            {
                return false;
            }
        }

        true
    }
}

/// Ranking key. Ties keep discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectorySort {
    /// Highest average rating first
    #[default]
    Rating,
    /// Cheapest first
    Rate,
    /// Most booking requests first
    Experience,
    /// Alphabetical, ignoring case
    Name,
}

impl DirectorySort {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectorySort::Rating => "rating",
            DirectorySort::Rate => "rate",
            DirectorySort::Experience => "experience",
            DirectorySort::Name => "name",
        }
    }

    fn compare(&self, a: &ProviderListing, b: &ProviderListing) -> Ordering {
        match self {
            DirectorySort::Rating => b.average_rating.total_cmp(&a.average_rating),
            DirectorySort::Rate => a.hourly_rate.cmp(&b.hourly_rate),
            DirectorySort::Experience => b
                .engagement_request_count
                .cmp(&a.engagement_request_count),
            DirectorySort::Name => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
        }
    }
}

impl std::fmt::Display for DirectorySort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectorySort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "rating" => Ok(DirectorySort::Rating),
            "rate" | "price" => Ok(DirectorySort::Rate),
            "experience" | "sessions" => Ok(DirectorySort::Experience),
            "name" => Ok(DirectorySort::Name),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

/// Stable sort by `sort`.
pub fn rank(listings: &mut [ProviderListing], sort: DirectorySort) {
    listings.sort_by(|a, b| sort.compare(a, b));
}

/// Public directory search. No actor required.
///
/// A store failure while looking up any provider record fails the whole
/// query; it is safe to retry.
pub async fn list_approved_providers(
    filters: &DirectoryFilters,
    sort: DirectorySort,
    deps: &MarketplaceDeps,
) -> Result<Vec<ProviderListing>> {
    let accounts = deps
        .store
        .query_accounts(Query::new(AccountFilter::with_role(AccountRole::Provider)))
        .await?;

    let providers = try_join_all(
        accounts
            .iter()
            .map(|account| deps.store.get_provider(account.id)),
    )
    .await?;

    let settings = &deps.directory;
    let mut listings: Vec<ProviderListing> = accounts
        .iter()
        .zip(providers.iter())
        .map(|(account, provider)| merge(account, provider.as_ref(), settings))
        .filter(|listing| listing.is_listed(settings))
        .filter(|listing| filters.matches(listing))
        .collect();

    rank(&mut listings, sort);

    debug!(
        discovered = accounts.len(),
        returned = listings.len(),
        sort = %sort,
        "Directory query"
    );

    Ok(listings)
}
