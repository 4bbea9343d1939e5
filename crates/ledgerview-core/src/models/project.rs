//! Project models
//!
//! Raw CRM project records, invoice status and category enums, and the
//! normalized billable project.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lenient::{deserialize_id, deserialize_lenient_i64, deserialize_non_blank};
use crate::month::MonthKey;

/// Decimal scale of CRM micros amounts (1 dollar = 1,000,000 micros)
pub const MICROS_SCALE: u32 = 6;

/// CRM currency amount
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAmount {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub amount_micros: Option<i64>,

    #[serde(default)]
    pub currency_code: Option<String>,
}

impl RevenueAmount {
    /// Exact dollar value of the micros amount
    pub fn dollars(&self) -> Option<Decimal> {
        self.amount_micros
            .map(|micros| Decimal::new(micros, MICROS_SCALE).normalize())
    }
}

/// Raw project record from the CRM
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub project_completion_date: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub invoice_status: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub project_category: Option<String>,

    #[serde(default)]
    pub revenue_amount: Option<RevenueAmount>,

    #[serde(default)]
    pub hosting_status: Option<String>,

    #[serde(default)]
    pub website_url: Option<String>,
}

/// Invoice status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    NotReady,
    /// Ready to invoice
    Ready,
    Invoiced,
    Paid,
}

impl InvoiceStatus {
    /// Parse from a CRM status value (case-insensitive).
    ///
    /// Legacy values from before the status rename are still accepted:
    /// `UNPAID` → `NOT_READY`, `DRAFTED` → `READY`, `SENT` → `INVOICED`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "NOT_READY" | "UNPAID" => Some(InvoiceStatus::NotReady),
            "READY" | "READY_TO_INVOICE" | "DRAFTED" => Some(InvoiceStatus::Ready),
            "INVOICED" | "SENT" => Some(InvoiceStatus::Invoiced),
            "PAID" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::NotReady => write!(f, "NOT_READY"),
            InvoiceStatus::Ready => write!(f, "READY"),
            InvoiceStatus::Invoiced => write!(f, "INVOICED"),
            InvoiceStatus::Paid => write!(f, "PAID"),
        }
    }
}

/// Project category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectCategory {
    Website,
    LandingPage,
    Migration,
    MultiForm,
    BasicForm,
}

impl ProjectCategory {
    /// Parse from a CRM category value (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "WEBSITE" => Some(ProjectCategory::Website),
            "LANDING_PAGE" => Some(ProjectCategory::LandingPage),
            "MIGRATION" => Some(ProjectCategory::Migration),
            "MULTI_FORM" => Some(ProjectCategory::MultiForm),
            "BASIC_FORM" => Some(ProjectCategory::BasicForm),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectCategory::Website => write!(f, "WEBSITE"),
            ProjectCategory::LandingPage => write!(f, "LANDING_PAGE"),
            ProjectCategory::Migration => write!(f, "MIGRATION"),
            ProjectCategory::MultiForm => write!(f, "MULTI_FORM"),
            ProjectCategory::BasicForm => write!(f, "BASIC_FORM"),
        }
    }
}

/// Normalized billable project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillableProject {
    pub id: String,

    pub name: String,

    /// Completion date as received; `None` keeps the project out of the
    /// monthly breakdown
    pub completion_date: Option<String>,

    /// Billing month derived from `completion_date` by string slicing
    pub month: Option<MonthKey>,

    /// `None` for categories the CRM added that this engine does not know
    pub category: Option<ProjectCategory>,

    pub website_url: Option<String>,

    /// Billable amount in dollars (0 when a free credit was applied)
    pub amount: Decimal,

    pub is_free_credit: bool,

    /// Pre-credit amount, present iff `is_free_credit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<Decimal>,
}

impl BillableProject {
    /// Copy of this project with a free credit applied
    pub fn as_free_credit(&self) -> Self {
        Self {
            amount: Decimal::ZERO,
            is_free_credit: true,
            original_amount: Some(self.gross_amount()),
            ..self.clone()
        }
    }

    /// Amount before any credit
    pub fn gross_amount(&self) -> Decimal {
        self.original_amount.unwrap_or(self.amount)
    }
}
