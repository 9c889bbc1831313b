// Tutoring Marketplace - Core
//
// Booking admission, provider approval, rating aggregation and the public
// tutor directory, over a pluggable record store, identity provider and
// notification sink.
//
// Business rules live in domains/*/activities and receive MarketplaceDeps.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
