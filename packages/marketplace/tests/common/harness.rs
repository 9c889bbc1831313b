//! Test harness over the in-memory record store.
//!
//! Each test gets a fresh store, spy notification sink and a seeded
//! administrator. Activities run against `MarketplaceDeps` built per actor.

use marketplace_core::common::Actor;
use marketplace_core::domains::accounts::{Account, AccountRole};
use marketplace_core::domains::providers::DirectorySettings;
use marketplace_core::kernel::{
    BaseRecordStore, MarketplaceDeps, MemoryStore, SpyNotificationSink, TestDependencies,
};
use test_context::AsyncTestContext;

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut TestHarness) {
///     let deps = ctx.as_admin();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub deps: TestDependencies,
    pub admin: Account,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await
    }

    async fn teardown(self) {
        // Store is dropped with the harness
    }
}

#[allow(dead_code)]
impl TestHarness {
    pub async fn new() -> Self {
        Self::with_deps(TestDependencies::new()).await
    }

    pub async fn with_directory_settings(settings: DirectorySettings) -> Self {
        Self::with_deps(TestDependencies::new().with_directory_settings(settings)).await
    }

    async fn with_deps(deps: TestDependencies) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let admin = Account::new("Admin", "admin@example.com", AccountRole::Administrator);
        deps.store
            .create_account(admin.clone())
            .await
            .expect("Failed to seed admin account");

        Self { deps, admin }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.deps.store
    }

    pub fn notifier(&self) -> &SpyNotificationSink {
        &self.deps.notifier
    }

    pub fn as_admin(&self) -> MarketplaceDeps {
        self.as_account(&self.admin)
    }

    pub fn as_account(&self, account: &Account) -> MarketplaceDeps {
        self.deps.deps_as(Actor::new(account.id, account.role))
    }

    pub fn anonymous(&self) -> MarketplaceDeps {
        self.deps.anonymous_deps()
    }
}
