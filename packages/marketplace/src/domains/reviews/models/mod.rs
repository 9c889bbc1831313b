pub mod rating;
pub mod review;

pub use rating::*;
pub use review::*;
