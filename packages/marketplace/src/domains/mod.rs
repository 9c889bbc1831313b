// Business domains
pub mod accounts;
pub mod engagements;
pub mod notifications;
pub mod providers;
pub mod reviews;
