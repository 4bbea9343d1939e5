//! Support ticket models
//!
//! Raw request records as exported by the ticketing collaborator, the
//! urgency tier table, and the normalized billable ticket.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lenient::{deserialize_lenient_decimal, deserialize_lenient_id, deserialize_non_blank};
use crate::month::MonthKey;

/// Raw ticket/request record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTicket {
    /// Upstream identifier, when the export carries one
    #[serde(default, deserialize_with = "deserialize_lenient_id")]
    pub id: Option<String>,

    /// Request date (`YYYY-MM-DD`, possibly followed by a time)
    #[serde(rename = "Date", default, deserialize_with = "deserialize_non_blank")]
    pub date: Option<String>,

    /// Request category (e.g. "Forms", "Hosting", "Migration")
    #[serde(rename = "Category", default, deserialize_with = "deserialize_non_blank")]
    pub category: Option<String>,

    /// Urgency label (e.g. "Low", "Medium", "High")
    #[serde(rename = "Urgency", default, deserialize_with = "deserialize_non_blank")]
    pub urgency: Option<String>,

    /// Estimated effort in hours
    #[serde(
        rename = "EstimatedHours",
        default,
        deserialize_with = "deserialize_lenient_decimal"
    )]
    pub estimated_hours: Option<Decimal>,

    /// Free-text summary of the request
    #[serde(
        rename = "Request_Summary",
        default,
        deserialize_with = "deserialize_non_blank"
    )]
    pub request_summary: Option<String>,
}

/// Urgency tier, ordered from cheapest to most expensive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    /// Promotional low tier
    Promotional,
    Low,
    Medium,
    High,
}

impl UrgencyTier {
    /// All tiers in table order
    pub const ALL: [UrgencyTier; 4] = [
        UrgencyTier::Promotional,
        UrgencyTier::Low,
        UrgencyTier::Medium,
        UrgencyTier::High,
    ];

    /// Parse from an urgency label (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "promo" | "promotional" | "promo low" | "promo_low" | "promotional low" => {
                Some(UrgencyTier::Promotional)
            }
            "low" => Some(UrgencyTier::Low),
            "medium" | "med" | "normal" => Some(UrgencyTier::Medium),
            "high" | "urgent" => Some(UrgencyTier::High),
            _ => None,
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyTier::Promotional => write!(f, "PROMOTIONAL"),
            UrgencyTier::Low => write!(f, "LOW"),
            UrgencyTier::Medium => write!(f, "MEDIUM"),
            UrgencyTier::High => write!(f, "HIGH"),
        }
    }
}

/// Normalized billable support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillableTicket {
    pub id: String,

    /// Request date as received (`YYYY-MM-DD`)
    pub date: String,

    /// Billing month derived from `date` by string slicing
    pub month: MonthKey,

    pub category: String,

    /// Tier the rate was taken from
    pub urgency: UrgencyTier,

    /// True when the urgency label was unknown and the cheapest tier was used
    pub urgency_fallback: bool,

    pub description: Option<String>,

    pub hours: Decimal,

    /// Dollars per hour
    pub rate: Decimal,

    /// `hours × rate`
    pub amount: Decimal,

    /// Free support hours applied to this ticket (0..=hours)
    pub free_hours_applied: Decimal,

    /// `amount − free_hours_applied × rate`
    pub net_amount: Decimal,
}

impl BillableTicket {
    /// Copy of this ticket with `hours` of free support applied
    pub fn with_free_hours(&self, hours: Decimal) -> Self {
        let applied = hours.max(Decimal::ZERO).min(self.hours);
        Self {
            free_hours_applied: applied,
            net_amount: self.amount - applied * self.rate,
            ..self.clone()
        }
    }

    /// Dollar value of the free hours applied
    pub fn savings(&self) -> Decimal {
        self.amount - self.net_amount
    }
}
