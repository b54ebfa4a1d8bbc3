//! Shared types, errors, and configuration for the stipend workspace.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for settlement runs and allowance records
//! - Currency codes for the paired USD / local amounts
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
