use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{text_enum, AccountId, EngagementId, ProviderId, ReviewId};

/// Moderation state of a review. Mirrors the provider approval machine:
/// `pending -> approved | rejected`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(ModerationStatus, "moderation status" {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Review record - a student's rating of a tutor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub provider_account_id: ProviderId,
    pub student_account_id: AccountId,
    pub engagement_id: Option<EngagementId>,

    /// 1..=5
    pub rating: u8,
    pub comment: String,

    pub moderation_status: ModerationStatus,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<AccountId>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub moderation_status: Option<ModerationStatus>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<AccountId>,
}

impl ReviewPatch {
    pub fn moderated(status: ModerationStatus, by: AccountId, at: DateTime<Utc>) -> Self {
        Self {
            moderation_status: Some(status),
            moderated_at: Some(at),
            moderated_by: Some(by),
        }
    }

    pub fn apply(&self, review: &mut Review) {
        if let Some(status) = self.moderation_status {
            review.moderation_status = status;
        }
        if self.moderated_at.is_some() {
            review.moderated_at = self.moderated_at;
        }
        if self.moderated_by.is_some() {
            review.moderated_by = self.moderated_by;
        }
    }
}

/// Query predicate over reviews.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub provider: Option<ProviderId>,
    pub moderation_status: Option<ModerationStatus>,
}

impl ReviewFilter {
    /// The reviews that count towards a provider's rating.
    pub fn approved_for(provider: ProviderId) -> Self {
        Self {
            provider: Some(provider),
            moderation_status: Some(ModerationStatus::Approved),
        }
    }

    pub fn with_status(status: ModerationStatus) -> Self {
        Self {
            provider: None,
            moderation_status: Some(status),
        }
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.provider
            .map_or(true, |id| review.provider_account_id == id)
            && self
                .moderation_status
                .map_or(true, |status| review.moderation_status == status)
    }
}
