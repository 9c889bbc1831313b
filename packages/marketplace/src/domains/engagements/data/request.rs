use chrono::{DateTime, Utc};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::common::{AccountId, ProviderId};
use crate::domains::engagements::{MeetingMode, SessionLength};

/// A student's booking request as submitted, before validation.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
pub struct EngagementRequest {
    pub student_account_id: AccountId,
    pub provider_account_id: ProviderId,
    pub scheduled_at: DateTime<Utc>,
    pub duration: SessionLength,
    #[builder(setter(into))]
    pub subject: String,
    #[builder(setter(into))]
    pub level: String,
    pub meeting_mode: MeetingMode,
    /// Required for in-person sessions, ignored otherwise
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub location: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub notes: Option<String>,
}
