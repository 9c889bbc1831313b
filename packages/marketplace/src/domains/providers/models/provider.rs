use chrono::{DateTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{text_enum, AccountId, ProviderId};
use crate::domains::reviews::RatingSummary;

/// Onboarding state of a provider. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(ApprovalStatus, "approval status" {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// A weekly slot the tutor is usually available in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub day: Weekday,
    /// Free-form time of day, e.g. "16:00-18:00" or "Evening"
    pub time: String,
}

impl AvailabilitySlot {
    pub fn new(day: Weekday, time: impl Into<String>) -> Self {
        Self {
            day,
            time: time.into(),
        }
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.day, Weekday::Sat | Weekday::Sun)
    }
}

/// Provider record - the tutoring profile attached to a provider account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Also the provider's own id
    pub account_id: ProviderId,

    // Profile
    pub subjects: Vec<String>,
    pub teaching_levels: Vec<String>,
    pub hourly_rate: Decimal,
    pub bio: Option<String>,
    /// Overrides the account's location in listings when set
    pub location: Option<String>,
    pub availability: Vec<AvailabilitySlot>,

    // Approval workflow
    pub approval_status: ApprovalStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<AccountId>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<AccountId>,
    pub rejection_reason: Option<String>,

    // Derived, never written by clients
    pub average_rating: f64,
    pub review_count: u32,
    pub engagement_request_count: u32,
    pub completed_engagement_count: u32,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a provider submits for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfileInput {
    pub subjects: Vec<String>,
    pub teaching_levels: Vec<String>,
    pub hourly_rate: Decimal,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
}

impl Provider {
    /// A freshly submitted provider awaiting review.
    pub fn pending(account_id: ProviderId, profile: ProviderProfileInput) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            subjects: profile.subjects,
            teaching_levels: profile.teaching_levels,
            hourly_rate: profile.hourly_rate,
            bio: profile.bio,
            location: profile.location,
            availability: profile.availability,
            approval_status: ApprovalStatus::Pending,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
            average_rating: 0.0,
            review_count: 0,
            engagement_request_count: 0,
            completed_engagement_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }
}

/// Partial update of a provider record. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderPatch {
    pub subjects: Option<Vec<String>>,
    pub teaching_levels: Option<Vec<String>>,
    pub hourly_rate: Option<Decimal>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub availability: Option<Vec<AvailabilitySlot>>,

    pub approval_status: Option<ApprovalStatus>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<AccountId>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<AccountId>,
    pub rejection_reason: Option<String>,

    pub average_rating: Option<f64>,
    pub review_count: Option<u32>,
    pub engagement_request_count: Option<u32>,
    pub completed_engagement_count: Option<u32>,
}

impl ProviderPatch {
    pub fn approved(by: AccountId, at: DateTime<Utc>) -> Self {
        Self {
            approval_status: Some(ApprovalStatus::Approved),
            approved_at: Some(at),
            approved_by: Some(by),
            ..Default::default()
        }
    }

    pub fn rejected(by: AccountId, at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            approval_status: Some(ApprovalStatus::Rejected),
            rejected_at: Some(at),
            rejected_by: Some(by),
            rejection_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn rating(summary: RatingSummary) -> Self {
        Self {
            average_rating: Some(summary.average_rating),
            review_count: Some(summary.review_count),
            ..Default::default()
        }
    }

    pub fn counters(requests: u32, completed: u32) -> Self {
        Self {
            engagement_request_count: Some(requests),
            completed_engagement_count: Some(completed),
            ..Default::default()
        }
    }

    /// Profile edits; approval fields and derived counters stay untouched.
    pub fn profile(profile: ProviderProfileInput) -> Self {
        Self {
            subjects: Some(profile.subjects),
            teaching_levels: Some(profile.teaching_levels),
            hourly_rate: Some(profile.hourly_rate),
            bio: profile.bio,
            location: profile.location,
            availability: Some(profile.availability),
            ..Default::default()
        }
    }

    pub fn apply(&self, provider: &mut Provider) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        set(&mut provider.subjects, &self.subjects);
        set(&mut provider.teaching_levels, &self.teaching_levels);
        set(&mut provider.hourly_rate, &self.hourly_rate);
        set_opt(&mut provider.bio, &self.bio);
        set_opt(&mut provider.location, &self.location);
        set(&mut provider.availability, &self.availability);

        set(&mut provider.approval_status, &self.approval_status);
        set_opt(&mut provider.approved_at, &self.approved_at);
        set_opt(&mut provider.approved_by, &self.approved_by);
        set_opt(&mut provider.rejected_at, &self.rejected_at);
        set_opt(&mut provider.rejected_by, &self.rejected_by);
        set_opt(&mut provider.rejection_reason, &self.rejection_reason);

        set(&mut provider.average_rating, &self.average_rating);
        set(&mut provider.review_count, &self.review_count);
        set(
            &mut provider.engagement_request_count,
            &self.engagement_request_count,
        );
        set(
            &mut provider.completed_engagement_count,
            &self.completed_engagement_count,
        );

        provider.updated_at = Utc::now();
    }
}

/// Derived counters that the store can bump atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCounter {
    /// Every booking request, whatever its outcome
    EngagementRequests,
    /// Engagements that reached `completed`
    CompletedEngagements,
}

impl ProviderCounter {
    pub fn column(&self) -> &'static str {
        match self {
            ProviderCounter::EngagementRequests => "engagement_request_count",
            ProviderCounter::CompletedEngagements => "completed_engagement_count",
        }
    }

    pub fn bump(&self, provider: &mut Provider) -> u32 {
        let counter = match self {
            ProviderCounter::EngagementRequests => &mut provider.engagement_request_count,
            ProviderCounter::CompletedEngagements => &mut provider.completed_engagement_count,
        };
        *counter = counter.saturating_add(1);
        *counter
    }
}

/// Query predicate over providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderFilter {
    pub approval_status: Option<ApprovalStatus>,
}

impl ProviderFilter {
    pub fn with_status(status: ApprovalStatus) -> Self {
        Self {
            approval_status: Some(status),
        }
    }

    pub fn matches(&self, provider: &Provider) -> bool {
        self.approval_status
            .map_or(true, |status| provider.approval_status == status)
    }
}
