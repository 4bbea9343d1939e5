//! Billing DTOs

use chrono::Utc;
use ledgerview_core::{AppResult, MonthKey};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Query parameters of the billing endpoints
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SummaryParams {
    /// Last month to prorate hosting through (`YYYY-MM`); defaults to the
    /// current UTC month
    #[validate(custom(function = "validate_month_key"))]
    pub as_of: Option<String>,
}

impl SummaryParams {
    /// Resolved `as_of` month
    pub fn as_of_month(&self) -> AppResult<MonthKey> {
        match self.as_of.as_deref() {
            Some(value) => MonthKey::parse(value.trim()),
            None => Ok(MonthKey::from_date(Utc::now().date_naive())),
        }
    }
}

fn validate_month_key(value: &str) -> Result<(), ValidationError> {
    MonthKey::parse(value.trim())
        .map(|_| ())
        .map_err(|_| ValidationError::new("month_key"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_as_of() {
        let params = SummaryParams {
            as_of: Some("2025-06".to_string()),
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.as_of_month().unwrap().as_str(), "2025-06");
    }

    #[test]
    fn test_default_as_of_is_current_month() {
        let params = SummaryParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(
            params.as_of_month().unwrap(),
            MonthKey::from_date(Utc::now().date_naive())
        );
    }

    #[test]
    fn test_malformed_as_of_rejected() {
        let params = SummaryParams {
            as_of: Some("June".to_string()),
        };
        assert!(params.validate().is_err());
        assert!(params.as_of_month().is_err());
    }
}
