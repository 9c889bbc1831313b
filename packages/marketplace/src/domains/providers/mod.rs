//! Providers domain - tutor profiles, their approval workflow and the public
//! directory

pub mod activities;
pub mod data;
pub mod models;

pub use activities::*;
pub use data::{merge, DirectorySettings, ListingStatus, ProviderListing};
pub use models::*;
