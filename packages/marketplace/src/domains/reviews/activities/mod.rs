pub mod moderation;
pub mod rating;
pub mod submission;

pub use moderation::{approve_review, reject_review};
pub use rating::{on_review_approved, reconcile_ratings, ReconciliationReport};
pub use submission::{approved_reviews_for, submit_review};
