//! LedgerView Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the LedgerView billing reconciliation engine. It includes:
//!
//! - Domain models (raw collaborator records, billable line items, summaries)
//! - Calendar month keys used for bucketing
//! - The immutable billing policy (rates, credit thresholds and allowances)
//! - The `RecordSource` trait implemented by data collaborators
//! - Unified error handling with HTTP response mapping

pub mod config;
pub mod error;
pub mod models;
pub mod month;
pub mod traits;

pub use config::{AppConfig, BillingPolicy};
pub use error::AppError;
pub use month::MonthKey;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
