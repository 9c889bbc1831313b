//! Error taxonomy for marketplace operations.
//!
//! Business errors (`Validation`, `InvalidSchedule`, `DuplicateEngagement`,
//! `NotFound`, `Authorization`) are raised before an operation performs its
//! first write. `StoreUnavailable` is the only retryable kind.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::common::{AuthError, EngagementId, ProviderId};
use crate::kernel::{Collection, StoreError};

pub type Result<T, E = MarketplaceError> = std::result::Result<T, E>;

/// User-correctable input problems. Messages are shown verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please provide a {field}")]
    MissingField { field: &'static str },

    #[error("{value:?} is not a supported {field}")]
    NotInCatalog { field: &'static str, value: String },

    #[error("Please provide a detailed rejection reason (min {min} characters, got {actual})")]
    ReasonTooShort { min: usize, actual: usize },

    #[error("This action must be explicitly confirmed")]
    ConfirmationRequired,

    #[error("Cannot {action} a {entity} that is {from}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },

    #[error("Rating must be between 1 and 5 (got {0})")]
    RatingOutOfRange(i32),

    #[error("Hourly rate cannot be negative")]
    NegativeRate,

    #[error("Tutor {0} is not accepting bookings")]
    ProviderNotBookable(ProviderId),

    #[error("That session does not belong to this student and tutor")]
    EngagementMismatch,
}

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please select a future date and time (requested {scheduled_at})")]
    InvalidSchedule { scheduled_at: DateTime<Utc> },

    #[error("You already have a pending or confirmed booking with this tutor")]
    DuplicateEngagement { existing: Option<EngagementId> },

    #[error("{collection} {id} not found")]
    NotFound { collection: Collection, id: Uuid },

    #[error(transparent)]
    Authorization(AuthError),

    #[error("The record store is temporarily unavailable, please try again: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl MarketplaceError {
    pub fn not_found(collection: Collection, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Whether the caller may retry the whole operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketplaceError::StoreUnavailable(_))
    }

    /// Stable machine-readable kind, used by the CLI's JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketplaceError::Validation(ValidationError::MissingField { .. }) => "missing_field",
            MarketplaceError::Validation(_) => "validation",
            MarketplaceError::InvalidSchedule { .. } => "invalid_schedule",
            MarketplaceError::DuplicateEngagement { .. } => "duplicate_engagement",
            MarketplaceError::NotFound { .. } => "not_found",
            MarketplaceError::Authorization(_) => "authorization",
            MarketplaceError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<AuthError> for MarketplaceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Lookup(source) => MarketplaceError::StoreUnavailable(source),
            other => MarketplaceError::Authorization(other),
        }
    }
}

impl From<StoreError> for MarketplaceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => MarketplaceError::NotFound { collection, id },
            StoreError::OpenEngagementExists { existing } => {
                MarketplaceError::DuplicateEngagement { existing }
            }
            StoreError::StatusChanged {
                collection,
                current,
                ..
            } => ValidationError::InvalidTransition {
                entity: collection.as_str(),
                from: current,
                action: "update",
            }
            .into(),
            StoreError::Unavailable(source) => MarketplaceError::StoreUnavailable(source),
        }
    }
}
