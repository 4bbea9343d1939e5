//! Website hosting models
//!
//! Raw hosting-property records and the per-site, per-month prorated
//! charge produced from them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lenient::{deserialize_id, deserialize_lenient_decimal, deserialize_non_blank};
use crate::month::MonthKey;

/// Raw website-hosting-property record from the CRM
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHostingProperty {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub website_url: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub hosting_start: Option<String>,

    /// `None` while the site is still hosted
    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub hosting_end: Option<String>,

    /// Monthly recurring hosting fee in dollars
    #[serde(default, deserialize_with = "deserialize_lenient_decimal")]
    pub hosting_mrr_amount: Option<Decimal>,

    #[serde(default)]
    pub hosting_status: Option<String>,
}

impl RawHostingProperty {
    /// Parsed hosting start date
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.hosting_start.as_deref().and_then(parse_calendar_date)
    }

    /// Parsed hosting end date
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.hosting_end.as_deref().and_then(parse_calendar_date)
    }
}

/// Parse the calendar date at the front of a `YYYY-MM-DD...` string.
///
/// Only the first ten characters are read, so a trailing time or offset
/// never moves the date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Proration shape of a hosting charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    /// Active for the whole month
    Full,
    /// Hosting started during the month
    ProratedStart,
    /// Hosting ended during the month
    ProratedEnd,
    /// No overlap with the month; never emitted as a charge
    Inactive,
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingType::Full => write!(f, "FULL"),
            BillingType::ProratedStart => write!(f, "PRORATED_START"),
            BillingType::ProratedEnd => write!(f, "PRORATED_END"),
            BillingType::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// One site's prorated hosting charge for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingCharge {
    pub month: MonthKey,

    pub website_property_id: String,

    pub site_name: String,

    pub website_url: Option<String>,

    pub hosting_start: NaiveDate,

    pub hosting_end: Option<NaiveDate>,

    pub billing_type: BillingType,

    pub days_active: u32,

    pub days_in_month: u32,

    /// Monthly fee the proration was applied to
    pub mrr_amount: Decimal,

    /// `mrr_amount × days_active / days_in_month`
    pub gross_amount: Decimal,

    pub credit_applied: bool,

    /// Present iff `credit_applied`; equals `gross_amount`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_amount: Option<Decimal>,

    /// 0 when credited, otherwise `gross_amount`
    pub net_amount: Decimal,
}

impl HostingCharge {
    /// Copy of this charge with the free hosting credit applied
    pub fn with_credit(&self) -> Self {
        Self {
            credit_applied: true,
            credit_amount: Some(self.gross_amount),
            net_amount: Decimal::ZERO,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calendar_date_ignores_time() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 1);
        assert_eq!(parse_calendar_date("2025-07-01"), expected);
        assert_eq!(parse_calendar_date("2025-07-01T00:00:00-05:00"), expected);
        assert_eq!(parse_calendar_date("2025-7-1"), None);
        assert_eq!(parse_calendar_date("soon"), None);
    }

    #[test]
    fn test_raw_property_deserialize() {
        let raw: RawHostingProperty = serde_json::from_str(
            r#"{
                "id": "wp-1",
                "name": "Acme",
                "websiteUrl": "https://acme.test",
                "hostingStart": "2025-06-15",
                "hostingEnd": null,
                "hostingMrrAmount": 99,
                "hostingStatus": "ACTIVE"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.start_date(), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(raw.end_date(), None);
        assert_eq!(raw.hosting_mrr_amount, Some(Decimal::from(99)));
    }

    #[test]
    fn test_numeric_property_id() {
        let raw: RawHostingProperty =
            serde_json::from_str(r#"{ "id": 77, "hostingMrrAmount": "40" }"#).unwrap();
        assert_eq!(raw.id, "77");
    }
}
