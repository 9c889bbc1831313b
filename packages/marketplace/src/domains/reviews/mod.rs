//! Reviews domain - student reviews, their moderation and the derived
//! provider rating

pub mod activities;
pub mod data;
pub mod models;

pub use activities::{
    approve_review, approved_reviews_for, on_review_approved, reconcile_ratings, reject_review,
    submit_review, ReconciliationReport,
};
pub use data::ReviewSubmission;
pub use models::{ModerationStatus, RatingSummary, Review, ReviewFilter, ReviewPatch};
