//! Identity provider implementations.

use async_trait::async_trait;
use std::sync::Arc;

use super::BaseIdentityProvider;
use super::BaseRecordStore;
use crate::common::{AccountId, Actor, AuthError};

/// Returns a fixed actor, or `AuthenticationRequired` when anonymous.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    actor: Option<Actor>,
}

impl StaticIdentity {
    pub fn new(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn anonymous() -> Self {
        Self { actor: None }
    }
}

#[async_trait]
impl BaseIdentityProvider for StaticIdentity {
    async fn current_actor(&self) -> Result<Actor, AuthError> {
        self.actor.ok_or(AuthError::AuthenticationRequired)
    }
}

/// Resolves the role of an already authenticated account from the store.
///
/// Used by the CLI, where the caller passes `--actor <uuid>`.
pub struct StoreBackedIdentity {
    store: Arc<dyn BaseRecordStore>,
    account_id: AccountId,
}

impl StoreBackedIdentity {
    pub fn new(store: Arc<dyn BaseRecordStore>, account_id: AccountId) -> Self {
        Self { store, account_id }
    }
}

#[async_trait]
impl BaseIdentityProvider for StoreBackedIdentity {
    async fn current_actor(&self) -> Result<Actor, AuthError> {
        let account = self
            .store
            .get_account(self.account_id)
            .await
            .map_err(|e| AuthError::Lookup(e.into()))?
            .ok_or(AuthError::AuthenticationRequired)?;

        Ok(Actor::new(account.id, account.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::accounts::{Account, AccountRole};
    use crate::kernel::MemoryStore;

    #[tokio::test]
    async fn anonymous_identity_requires_authentication() {
        let result = StaticIdentity::anonymous().current_actor().await;
        assert!(matches!(result, Err(AuthError::AuthenticationRequired)));
    }

    #[tokio::test]
    async fn store_backed_identity_reads_the_role() {
        let store = MemoryStore::new();
        let admin = Account::new("Ada", "ada@example.com", AccountRole::Administrator);
        store.create_account(admin.clone()).await.unwrap();

        let identity = StoreBackedIdentity::new(Arc::new(store.clone()), admin.id);
        let actor = identity.current_actor().await.unwrap();
        assert_eq!(actor, Actor::new(admin.id, AccountRole::Administrator));

        let unknown = StoreBackedIdentity::new(Arc::new(store), AccountId::new());
        assert!(matches!(
            unknown.current_actor().await,
            Err(AuthError::AuthenticationRequired)
        ));
    }
}
