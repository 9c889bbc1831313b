use thiserror::Error;

use crate::domains::accounts::AccountRole;

/// Authorization failures.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("This action requires the {required} role (you are signed in as {actual})")]
    RoleRequired {
        required: AccountRole,
        actual: AccountRole,
    },

    #[error("You can only perform this action on your own behalf")]
    IdentityMismatch,

    #[error("You are not a participant in this booking")]
    NotAParticipant,

    #[error("Identity lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
}
