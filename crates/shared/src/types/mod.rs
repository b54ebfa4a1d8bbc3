//! Common types used across the application.

pub mod error;
pub mod id;
pub mod money;

pub use error::ParseError;
pub use id::*;
pub use money::Currency;
