//! Kernel module - infrastructure traits, their implementations and the
//! dependency container handed to every activity.

pub mod deps;
pub mod identity;
pub mod memory_store;
pub mod notifier;
pub mod postgres_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::MarketplaceDeps;
pub use identity::{StaticIdentity, StoreBackedIdentity};
pub use memory_store::MemoryStore;
pub use notifier::StoreNotificationSink;
pub use postgres_store::PgRecordStore;
pub use test_dependencies::{SpyNotificationSink, TestDependencies};
pub use traits::*;
