//! Billing summary models
//!
//! The per-month aggregate and the top-level summary handed to the
//! dashboard tables, charts and export.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::hosting::HostingCharge;
use super::project::BillableProject;
use super::ticket::BillableTicket;
use crate::month::MonthKey;

/// Aggregate for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBillingSummary {
    pub month: MonthKey,

    pub ticket_details: Vec<BillableTicket>,
    pub project_details: Vec<BillableProject>,
    pub hosting_details: Vec<HostingCharge>,

    pub ticket_count: usize,
    pub project_count: usize,
    pub hosting_count: usize,

    // Gross (pre-credit) revenue per source
    pub tickets_gross_revenue: Decimal,
    pub projects_gross_revenue: Decimal,
    pub hosting_gross_revenue: Decimal,

    // Net (post-credit) revenue per source
    pub tickets_revenue: Decimal,
    pub projects_revenue: Decimal,
    pub hosting_revenue: Decimal,

    pub free_hours_applied: Decimal,
    pub free_hours_savings: Decimal,

    pub landing_page_credits: u32,
    pub landing_page_savings: Decimal,

    pub multi_form_credits: u32,
    pub multi_form_savings: Decimal,

    pub basic_form_credits: u32,
    pub basic_form_savings: Decimal,

    pub hosting_credits: u32,
    pub hosting_credit_savings: Decimal,

    /// `tickets_revenue + projects_revenue + hosting_revenue`
    pub total_revenue: Decimal,
}

impl MonthlyBillingSummary {
    /// Total gross revenue across the three sources
    pub fn gross_revenue(&self) -> Decimal {
        self.tickets_gross_revenue + self.projects_gross_revenue + self.hosting_gross_revenue
    }

    /// Total dollar value of every credit applied this month
    pub fn total_savings(&self) -> Decimal {
        self.free_hours_savings
            + self.landing_page_savings
            + self.multi_form_savings
            + self.basic_form_savings
            + self.hosting_credit_savings
    }
}

/// Records the engine skipped or adjusted, surfaced for the caller to report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDiagnostics {
    /// Tickets dropped for missing/zero hours, bad dates or non-billable category
    pub skipped_tickets: usize,

    /// Tickets billed at the cheapest tier because their urgency was unknown
    pub unknown_urgency_ticket_ids: Vec<String>,

    /// Hosting properties dropped for missing start date, missing or negative MRR, or inverted dates
    pub skipped_hosting_properties: usize,
}

impl BillingDiagnostics {
    /// Whether anything needs operator attention
    pub fn has_warnings(&self) -> bool {
        self.skipped_tickets > 0
            || !self.unknown_urgency_ticket_ids.is_empty()
            || self.skipped_hosting_properties > 0
    }
}

/// Top-level billing result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    /// Last month included in hosting proration
    pub as_of: MonthKey,

    /// Months in ascending order
    pub monthly_breakdown: Vec<MonthlyBillingSummary>,

    /// Net ticket revenue summed over all months
    pub total_tickets_revenue: Decimal,

    /// Net project revenue summed over all months
    pub total_projects_revenue: Decimal,

    /// Current MRR: net hosting revenue of the most recent month only
    pub total_hosting_revenue: Decimal,

    pub total_revenue: Decimal,

    /// Billable projects with no completion date (not in the breakdown)
    pub projects_without_completion_date: usize,
    pub revenue_without_completion_date: Decimal,

    pub diagnostics: BillingDiagnostics,
}

impl BillingSummary {
    /// Look up one month of the breakdown
    pub fn month(&self, month: &MonthKey) -> Option<&MonthlyBillingSummary> {
        self.monthly_breakdown.iter().find(|m| &m.month == month)
    }

    /// Most recent month of the breakdown
    pub fn latest_month(&self) -> Option<&MonthlyBillingSummary> {
        self.monthly_breakdown.last()
    }
}
