//! Allowance reports.
//!
//! This module flattens records into rows and summarizes them:
//! - Per-record listing with student names and period labels
//! - Summary by student
//! - Summary by year of the period start
//! - Summary by allowance type

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::*;
