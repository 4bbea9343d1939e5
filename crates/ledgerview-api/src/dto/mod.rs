//! Data transfer objects for the HTTP API

pub mod billing;
pub mod common;

pub use billing::SummaryParams;
pub use common::{ApiResponse, HealthResponse};
