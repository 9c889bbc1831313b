//! Authorization for marketplace operations.
//!
//! Every core operation starts with a capability check against the actor
//! returned by the identity provider:
//!
//! ```ignore
//! let actor = deps.actor().await?;
//! actor.can(Capability::ReviewProviders).check()?;
//! ```
//!
//! Coarse access control lives outside the core; these checks are the
//! role and identity preconditions the core itself depends on.

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityCheck};
pub use capability::Capability;
pub use errors::AuthError;
