pub mod inbox;

pub use inbox::notifications_for;
