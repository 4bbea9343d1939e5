//! Health check handler

use actix_web::HttpResponse;

use crate::dto::HealthResponse;

/// GET /api/v1/health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::default())
}
