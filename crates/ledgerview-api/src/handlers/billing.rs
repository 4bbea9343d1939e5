//! Billing handlers
//!
//! Expose the engine's `BillingSummary` to the dashboard tables, charts
//! and export.

use actix_web::{web, HttpResponse};
use ledgerview_core::{AppError, MonthKey};
use ledgerview_engine::BillingService;
use tracing::{debug, instrument};
use validator::Validate;

use crate::dto::{ApiResponse, SummaryParams};

/// Get the full billing summary
///
/// GET /api/v1/billing/summary?as_of=YYYY-MM
#[instrument(skip(service))]
pub async fn get_summary(
    service: web::Data<BillingService>,
    query: web::Query<SummaryParams>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let as_of = query.as_of_month()?;
    debug!("Computing billing summary through {}", as_of);

    let summary = service.summarize(&as_of).await?;

    let response = if summary.diagnostics.has_warnings() {
        let diagnostics = &summary.diagnostics;
        let message = format!(
            "{} tickets and {} hosting properties skipped; {} tickets billed at the fallback tier",
            diagnostics.skipped_tickets,
            diagnostics.skipped_hosting_properties,
            diagnostics.unknown_urgency_ticket_ids.len()
        );
        ApiResponse::with_message(summary, message)
    } else {
        ApiResponse::success(summary)
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Get one month of the breakdown
///
/// GET /api/v1/billing/months/{month}?as_of=YYYY-MM
#[instrument(skip(service))]
pub async fn get_month(
    service: web::Data<BillingService>,
    path: web::Path<String>,
    query: web::Query<SummaryParams>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let month = MonthKey::parse(path.trim())?;
    let as_of = query.as_of_month()?;

    match service.month_summary(&month, &as_of).await? {
        Some(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        None => Err(AppError::NotFound(format!(
            "No billing activity in {}",
            month
        ))),
    }
}

/// Configure billing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/billing")
            .route("/summary", web::get().to(get_summary))
            .route("/months/{month}", web::get().to(get_month)),
    );
}
