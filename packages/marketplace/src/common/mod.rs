// Common types shared by the kernel and every domain

pub mod auth;
pub mod catalog;
pub mod entity_ids;
pub mod error;
pub mod id;
mod text_enum;

pub(crate) use text_enum::text_enum;

pub use auth::{Actor, AuthError, Capability};
pub use entity_ids::{AccountId, EngagementId, NotificationId, ProviderId, ReviewId};
pub use error::{MarketplaceError, Result, ValidationError};
pub use id::Id;
