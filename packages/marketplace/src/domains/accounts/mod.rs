//! Accounts domain - identity-bound profiles owned by the identity subsystem
//!
//! The core only reads accounts and patches their lifecycle fields.

pub mod models;

pub use models::{Account, AccountFilter, AccountPatch, AccountRole, AccountStatus};
