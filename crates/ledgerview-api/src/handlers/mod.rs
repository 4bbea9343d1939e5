//! HTTP request handlers

pub mod billing;
pub mod health;

pub use billing::configure as configure_billing;
pub use health::health_check;
