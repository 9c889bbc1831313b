pub mod request;

pub use request::EngagementRequest;
