pub mod seller;

pub use keel_core::*;
