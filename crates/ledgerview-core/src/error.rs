//! Unified error handling for LedgerView
//!
//! This module provides the error type shared by the engine, the record
//! sources and the HTTP layer, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Record Source Errors ====================
    #[error("Failed to fetch {source_name}: {message}")]
    SourceFetch {
        source_name: String,
        message: String,
    },

    #[error("Unexpected {source_name} payload: {message}")]
    SourceFormat {
        source_name: String,
        message: String,
    },

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid month key: {0}")]
    InvalidMonth(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    // ==================== Internal Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Build a fetch error for the named source
    pub fn fetch(source_name: impl Into<String>, message: impl ToString) -> Self {
        AppError::SourceFetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Build a payload format error for the named source
    pub fn format(source_name: impl Into<String>, message: impl ToString) -> Self {
        AppError::SourceFormat {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidMonth(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway
            AppError::SourceFetch { .. } | AppError::SourceFormat { .. } => {
                StatusCode::BAD_GATEWAY
            }

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::SourceFetch { .. } => "source_fetch_error",
            AppError::SourceFormat { .. } => "source_format_error",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidMonth(_) => "invalid_month",
            AppError::NotFound(_) => "not_found",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
