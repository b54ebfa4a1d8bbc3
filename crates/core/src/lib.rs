//! Core business logic for the stipend engine.
//!
//! This crate contains pure allowance logic with ZERO database dependencies.
//! Rosters, rates, rules and settlement all live here; persistence lives in
//! `stipend-db`.
//!
//! # Modules
//!
//! - `student` - Roster model, validation and CSV import
//! - `config` - Versioned allowance rates and rounding settings
//! - `money` - USD to local conversion with configurable rounding
//! - `period` - Calendar helpers and settlement months
//! - `rules` - Living, study and baggage allowance rules
//! - `calculation` - Lifetime projection for one student
//! - `settlement` - Monthly settlement with toggles and warnings
//! - `reports` - Record listings and summaries
//! - `export` - CSV and XLSX writers

pub mod calculation;
pub mod config;
pub mod export;
pub mod money;
pub mod period;
pub mod reports;
pub mod rules;
pub mod settlement;
pub mod student;
