//! Notifications domain - in-app messages written by the store-backed sink

pub mod activities;
pub mod models;

pub use activities::notifications_for;
pub use models::*;
