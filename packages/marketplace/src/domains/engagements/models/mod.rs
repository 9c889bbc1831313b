pub mod engagement;

pub use engagement::*;
