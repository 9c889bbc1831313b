//! Directory listings
//!
//! A listing merges a provider-role account with its (optional) provider
//! record. Every field is filled: provider values win, missing ones fall back
//! to the account or to directory defaults.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::ProviderId;
use crate::domains::accounts::Account;
use crate::domains::providers::{ApprovalStatus, AvailabilitySlot, Provider};

/// Where a listing stands in onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Provider account with no provider record yet
    NotOnboarded,
    Pending,
    Approved,
    Rejected,
}

impl From<ApprovalStatus> for ListingStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => ListingStatus::Pending,
            ApprovalStatus::Approved => ListingStatus::Approved,
            ApprovalStatus::Rejected => ListingStatus::Rejected,
        }
    }
}

/// Directory policy knobs, loaded from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySettings {
    /// Show provider accounts that never submitted a profile
    pub include_not_onboarded: bool,
    /// Rate shown for listings without a provider record
    pub default_hourly_rate: Decimal,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            include_not_onboarded: true,
            default_hourly_rate: Decimal::from(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderListing {
    pub account_id: ProviderId,
    pub display_name: String,
    pub location: String,
    pub bio: String,
    pub subjects: Vec<String>,
    pub teaching_levels: Vec<String>,
    pub hourly_rate: Decimal,
    pub availability: Vec<AvailabilitySlot>,
    pub average_rating: f64,
    pub review_count: u32,
    pub engagement_request_count: u32,
    pub completed_engagement_count: u32,
    pub status: ListingStatus,
    pub joined_at: DateTime<Utc>,
}

impl ProviderListing {
    pub fn is_listed(&self, settings: &DirectorySettings) -> bool {
        match self.status {
            ListingStatus::Approved => true,
            ListingStatus::NotOnboarded => settings.include_not_onboarded,
            ListingStatus::Pending | ListingStatus::Rejected => false,
        }
    }
}

/// Pure merge of an account and its provider record.
pub fn merge(
    account: &Account,
    provider: Option<&Provider>,
    settings: &DirectorySettings,
) -> ProviderListing {
    let account_location = account.location.clone().unwrap_or_default();

    match provider {
        Some(provider) => ProviderListing {
            account_id: account.id,
            display_name: account.display_name.clone(),
            location: provider.location.clone().unwrap_or(account_location),
            bio: provider.bio.clone().unwrap_or_default(),
            subjects: provider.subjects.clone(),
            teaching_levels: provider.teaching_levels.clone(),
            hourly_rate: provider.hourly_rate,
            availability: provider.availability.clone(),
            average_rating: provider.average_rating,
            review_count: provider.review_count,
            engagement_request_count: provider.engagement_request_count,
            completed_engagement_count: provider.completed_engagement_count,
            status: provider.approval_status.into(),
            joined_at: account.created_at,
        },
        None => ProviderListing {
            account_id: account.id,
            display_name: account.display_name.clone(),
            location: account_location,
            bio: String::new(),
            subjects: Vec::new(),
            teaching_levels: Vec::new(),
            hourly_rate: settings.default_hourly_rate,
            availability: Vec::new(),
            average_rating: 0.0,
            review_count: 0,
            engagement_request_count: 0,
            completed_engagement_count: 0,
            status: ListingStatus::NotOnboarded,
            joined_at: account.created_at,
        },
    }
}
