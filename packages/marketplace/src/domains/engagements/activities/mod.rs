pub mod admission;
pub mod lifecycle;

pub use admission::create_engagement;
pub use lifecycle::{
    cancel_engagement, complete_engagement, confirm_engagement, decline_engagement,
    list_engagements_for_actor,
};
