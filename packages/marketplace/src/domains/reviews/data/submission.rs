use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::common::{EngagementId, ProviderId};

/// A student's review as submitted, before validation.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
pub struct ReviewSubmission {
    pub provider_account_id: ProviderId,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub engagement_id: Option<EngagementId>,
    /// Unchecked; must end up in 1..=5
    pub rating: i32,
    #[builder(setter(into))]
    pub comment: String,
}
