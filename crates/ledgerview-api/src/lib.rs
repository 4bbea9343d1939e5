//! API layer for LedgerView
//!
//! HTTP handlers serving the computed billing summary. Handlers expect a
//! `web::Data<BillingService>` in the application data.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

use actix_web::web;

pub use dto::{ApiResponse, SummaryParams};
pub use handlers::{configure_billing, health_check};

/// Mount every API route under `/api/v1`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_billing),
    );
}
