// Utility functions
pub mod cache;
pub mod error;
pub mod validation;

pub use error::*;
