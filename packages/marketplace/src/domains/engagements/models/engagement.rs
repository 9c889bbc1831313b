use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{text_enum, AccountId, EngagementId, ProviderId};

/// Bookable session lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub enum SessionLength {
    OneHour,
    NinetyMinutes,
    TwoHours,
    TwoAndAHalfHours,
    ThreeHours,
}

impl SessionLength {
    pub const ALL: [SessionLength; 5] = [
        SessionLength::OneHour,
        SessionLength::NinetyMinutes,
        SessionLength::TwoHours,
        SessionLength::TwoAndAHalfHours,
        SessionLength::ThreeHours,
    ];

    pub fn hours(&self) -> Decimal {
        match self {
            SessionLength::OneHour => Decimal::new(1, 0),
            SessionLength::NinetyMinutes => Decimal::new(15, 1),
            SessionLength::TwoHours => Decimal::new(2, 0),
            SessionLength::TwoAndAHalfHours => Decimal::new(25, 1),
            SessionLength::ThreeHours => Decimal::new(3, 0),
        }
    }
}

impl std::fmt::Display for SessionLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hours())
    }
}

impl From<SessionLength> for Decimal {
    fn from(length: SessionLength) -> Self {
        length.hours()
    }
}

impl TryFrom<Decimal> for SessionLength {
    type Error = String;

    fn try_from(hours: Decimal) -> Result<Self, Self::Error> {
        SessionLength::ALL
            .into_iter()
            .find(|length| length.hours() == hours)
            .ok_or_else(|| format!("unsupported session length: {} hours", hours))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingMode {
    Remote,
    InPerson,
    Either,
}

text_enum!(MeetingMode, "meeting mode" {
    Remote => "remote",
    InPerson => "in_person",
    Either => "either",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
}

text_enum!(EngagementStatus, "engagement status" {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
    Rejected => "rejected",
});

impl EngagementStatus {
    /// Statuses that block a second booking between the same pair.
    pub const OPEN: [EngagementStatus; 2] = [EngagementStatus::Pending, EngagementStatus::Confirmed];

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

/// Who may drive an engagement forward after admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementAction {
    Confirm,
    Decline,
    Complete,
    Cancel,
}

impl EngagementAction {
    pub fn verb(&self) -> &'static str {
        match self {
            EngagementAction::Confirm => "confirm",
            EngagementAction::Decline => "decline",
            EngagementAction::Complete => "complete",
            EngagementAction::Cancel => "cancel",
        }
    }

    /// The status this action leads to from `from`, if the move is allowed.
    pub fn transition(&self, from: EngagementStatus) -> Option<EngagementStatus> {
        use EngagementStatus::*;

        match (self, from) {
            (EngagementAction::Confirm, Pending) => Some(Confirmed),
            (EngagementAction::Decline, Pending) => Some(Rejected),
            (EngagementAction::Complete, Confirmed) => Some(Completed),
            (EngagementAction::Cancel, Pending | Confirmed) => Some(Cancelled),
            _ => None,
        }
    }

    /// Only cancellation is open to the student; everything else is the tutor's call.
    pub fn allowed_for_student(&self) -> bool {
        matches!(self, EngagementAction::Cancel)
    }
}

/// Engagement record - a booked tutoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub id: EngagementId,
    pub student_account_id: AccountId,
    pub provider_account_id: ProviderId,

    pub scheduled_at: DateTime<Utc>,
    pub duration: SessionLength,
    pub subject: String,
    pub level: String,
    pub meeting_mode: MeetingMode,
    /// Set iff the session is in person
    pub location: Option<String>,
    pub notes: Option<String>,

    /// Tutor's hourly rate at booking time times the session length
    pub total_amount: Decimal,
    pub lifecycle_status: EngagementStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Engagement {
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.student_account_id == account_id || self.provider_account_id == account_id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementPatch {
    pub lifecycle_status: Option<EngagementStatus>,
}

impl EngagementPatch {
    pub fn status(status: EngagementStatus) -> Self {
        Self {
            lifecycle_status: Some(status),
        }
    }

    pub fn apply(&self, engagement: &mut Engagement) {
        if let Some(status) = self.lifecycle_status {
            engagement.lifecycle_status = status;
        }
        engagement.updated_at = Utc::now();
    }
}

/// Query predicate over engagements.
#[derive(Debug, Clone, Default)]
pub struct EngagementFilter {
    pub student: Option<AccountId>,
    pub provider: Option<ProviderId>,
    /// Matches engagements where this account is either party
    pub participant: Option<AccountId>,
    pub statuses: Option<Vec<EngagementStatus>>,
}

impl EngagementFilter {
    /// Pending or confirmed engagements between one student and one tutor.
    pub fn open_between(student: AccountId, provider: ProviderId) -> Self {
        Self {
            student: Some(student),
            provider: Some(provider),
            participant: None,
            statuses: Some(EngagementStatus::OPEN.to_vec()),
        }
    }

    pub fn for_provider(provider: ProviderId) -> Self {
        Self {
            provider: Some(provider),
            ..Default::default()
        }
    }

    pub fn involving(account_id: AccountId) -> Self {
        Self {
            participant: Some(account_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, engagement: &Engagement) -> bool {
        self.student
            .map_or(true, |id| engagement.student_account_id == id)
            && self
                .provider
                .map_or(true, |id| engagement.provider_account_id == id)
            && self.participant.map_or(true, |id| engagement.involves(id))
            && self
                .statuses
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&engagement.lifecycle_status))
    }
}
