pub mod listing;

pub use listing::{merge, DirectorySettings, ListingStatus, ProviderListing};
