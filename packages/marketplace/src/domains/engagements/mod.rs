//! Engagements domain - booking admission and the session lifecycle

pub mod activities;
pub mod data;
pub mod models;

pub use activities::*;
pub use data::EngagementRequest;
pub use models::*;
