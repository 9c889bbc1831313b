pub mod approval;
pub mod directory;
pub mod onboarding;
pub mod profile;

pub use approval::{
    approval_stats, approve_provider, list_pending_providers, reject_provider, ApprovalStats,
    PendingProvider,
};
pub use directory::{
    list_approved_providers, rank, AvailabilityBucket, DirectoryFilters, DirectorySort,
};
pub use onboarding::submit_provider_profile;
pub use profile::{provider_profile, ProviderProfile};
