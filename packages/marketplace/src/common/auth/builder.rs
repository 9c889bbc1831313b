use serde::{Deserialize, Serialize};

use super::{AuthError, Capability};
use crate::common::AccountId;
use crate::domains::accounts::AccountRole;

/// The authenticated caller of an operation, as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: AccountId,
    pub role: AccountRole,
}

impl Actor {
    pub fn new(id: AccountId, role: AccountRole) -> Self {
        Self { id, role }
    }

    /// Specify what capability the actor needs
    pub fn can(&self, capability: Capability) -> CapabilityCheck {
        CapabilityCheck {
            actor: *self,
            capability,
        }
    }

    /// Fails unless the actor is the account the request is made for.
    pub fn ensure_is(&self, account_id: AccountId) -> Result<(), AuthError> {
        if self.id != account_id {
            return Err(AuthError::IdentityMismatch);
        }
        Ok(())
    }
}

/// Builder after specifying capability
pub struct CapabilityCheck {
    actor: Actor,
    capability: Capability,
}

impl CapabilityCheck {
    /// Perform the authorization check
    pub fn check(self) -> Result<Actor, AuthError> {
        let required = self.capability.required_role();
        if self.actor.role != required {
            return Err(AuthError::RoleRequired {
                required,
                actual: self.actor.role,
            });
        }
        Ok(self.actor)
    }
}
