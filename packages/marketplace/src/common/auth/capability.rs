use crate::domains::accounts::AccountRole;

/// Actions that are gated on the actor's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Approve or reject provider applications, see the approval queue
    ReviewProviders,

    /// Approve or reject submitted reviews
    ModerateReviews,

    /// Request a tutoring session
    BookSessions,

    /// Leave a review for a tutor
    SubmitReviews,

    /// Create or edit one's own tutor profile
    ManageProviderProfile,

    /// Confirm, decline, complete or cancel bookings addressed to oneself
    RespondToBookings,
}

impl Capability {
    /// The single role allowed to exercise this capability.
    pub fn required_role(&self) -> AccountRole {
        match self {
            Capability::ReviewProviders | Capability::ModerateReviews => {
                AccountRole::Administrator
            }
            Capability::BookSessions | Capability::SubmitReviews => AccountRole::Student,
            Capability::ManageProviderProfile | Capability::RespondToBookings => {
                AccountRole::Provider
            }
        }
    }
}
