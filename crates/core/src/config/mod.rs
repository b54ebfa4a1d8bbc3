//! Allowance rates and policy switches.
//!
//! Configurations are data: each saved version is immutable and every
//! settlement run records the version it was computed with.

pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{AllowanceConfig, LivingRates, VersionedConfig};
