use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{text_enum, AccountId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Student,
    Provider,
    Administrator,
}

text_enum!(AccountRole, "account role" {
    Student => "student",
    Provider => "provider",
    Administrator => "administrator",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
}

text_enum!(AccountStatus, "account status" {
    Active => "active",
    Suspended => "suspended",
});

/// Account record - one per identity-provider subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub display_name: String,
    pub email_address: String,
    pub role: AccountRole,
    pub lifecycle_status: AccountStatus,
    pub profile_completed: bool,

    /// City the account holder is based in
    pub location: Option<String>,
    pub suspension_reason: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Account {
    /// A fresh, active account. Accounts are normally created by the identity
    /// subsystem; this is used for seeding and tests.
    pub fn new(
        display_name: impl Into<String>,
        email_address: impl Into<String>,
        role: AccountRole,
    ) -> Self {
        Self {
            id: AccountId::new(),
            display_name: display_name.into(),
            email_address: email_address.into(),
            role,
            lifecycle_status: AccountStatus::Active,
            profile_completed: false,
            location: None,
            suspension_reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Partial update of the fields the core is allowed to touch.
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub lifecycle_status: Option<AccountStatus>,
    pub profile_completed: Option<bool>,
    pub suspension_reason: Option<String>,
}

impl AccountPatch {
    /// Applied when a provider application is approved.
    pub fn activated() -> Self {
        Self {
            lifecycle_status: Some(AccountStatus::Active),
            profile_completed: Some(true),
            ..Default::default()
        }
    }

    /// Applied when a provider application is rejected.
    pub fn suspended(reason: impl Into<String>) -> Self {
        Self {
            lifecycle_status: Some(AccountStatus::Suspended),
            suspension_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn profile_completed() -> Self {
        Self {
            profile_completed: Some(true),
            ..Default::default()
        }
    }

    pub fn apply(&self, account: &mut Account) {
        if let Some(status) = self.lifecycle_status {
            account.lifecycle_status = status;
        }
        if let Some(completed) = self.profile_completed {
            account.profile_completed = completed;
        }
        if let Some(reason) = &self.suspension_reason {
            account.suspension_reason = Some(reason.clone());
        }
    }
}

/// Query predicate over accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub role: Option<AccountRole>,
}

impl AccountFilter {
    pub fn with_role(role: AccountRole) -> Self {
        Self { role: Some(role) }
    }

    pub fn matches(&self, account: &Account) -> bool {
        self.role.map_or(true, |role| account.role == role)
    }
}
