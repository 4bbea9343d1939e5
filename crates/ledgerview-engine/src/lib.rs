//! Billing engine for LedgerView
//!
//! Turns the three raw record arrays (support tickets, CRM projects,
//! hosting properties) into a month-by-month revenue breakdown with
//! promotional credits applied.
//!
//! # Pipeline
//!
//! ```text
//! tickets ──► normalize ─┐
//! projects ─► normalize ─┼─► MonthlyLedger (gross) ─► credits ─► summary
//! hosting ──► prorate ───┘
//! ```
//!
//! The engine is a pure function of its inputs, the `BillingPolicy` and
//! the `as_of` month: it holds no state between runs and identical inputs
//! produce identical output. `BillingService` is the async entry point
//! that fetches the inputs from a `RecordSource` first.

pub mod aggregator;
pub mod credits;
pub mod hosting;
pub mod projects;
pub mod service;
pub mod summary;
pub mod tickets;

pub use aggregator::{MonthBucket, MonthlyLedger};
pub use service::BillingService;

use ledgerview_core::{
    models::{
        BillableProject, BillableTicket, BillingDiagnostics, BillingSummary, RawHostingProperty,
        RawProject, RawTicket,
    },
    BillingPolicy, MonthKey,
};

use crate::summary::UndatedProjects;

/// The three raw record arrays one engine run consumes
#[derive(Debug, Clone, Default)]
pub struct RawRecords {
    pub tickets: Vec<RawTicket>,
    pub projects: Vec<RawProject>,
    pub hosting_properties: Vec<RawHostingProperty>,
}

/// Billing engine bound to one immutable policy
#[derive(Debug, Clone, Default)]
pub struct BillingEngine {
    policy: BillingPolicy,
}

impl BillingEngine {
    pub fn new(policy: BillingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    /// Run the full pipeline; hosting is prorated through `as_of` or the
    /// latest ticket/project month, whichever is later
    pub fn compute(&self, records: &RawRecords, as_of: &MonthKey) -> BillingSummary {
        compute_billing_summary(records, &self.policy, as_of)
    }
}

/// Compute the billing summary for one set of raw records
pub fn compute_billing_summary(
    records: &RawRecords,
    policy: &BillingPolicy,
    as_of: &MonthKey,
) -> BillingSummary {
    let tickets = tickets::normalize_tickets(&records.tickets, &policy.tickets);
    let projects = projects::normalize_projects(&records.projects, &policy.projects);

    let horizon = hosting_horizon(as_of, &tickets.tickets, &projects.dated);
    let hosting = hosting::prorate_hosting(&records.hosting_properties, &horizon);

    // Pass 1: gross amounts only
    let ledger = MonthlyLedger::from_line_items(&tickets.tickets, &projects.dated, &hosting.charges);

    // Pass 2: credits over the completed gross buckets
    let months = ledger
        .buckets()
        .iter()
        .map(|bucket| credits::apply_month_credits(bucket, policy))
        .map(summary::finalize_month)
        .collect();

    let undated = UndatedProjects {
        count: projects.undated.len(),
        revenue: projects.undated_revenue(),
    };

    let diagnostics = BillingDiagnostics {
        skipped_tickets: tickets.skipped,
        unknown_urgency_ticket_ids: tickets.unknown_urgency_ids,
        skipped_hosting_properties: hosting.skipped,
    };

    summary::build_summary(months, undated, diagnostics, horizon)
}

/// Last month hosting is prorated through
///
/// Tickets or projects dated after `as_of` extend the horizon, so the most
/// recent month of the breakdown always carries the hosting charges that
/// define current MRR.
pub fn hosting_horizon(
    as_of: &MonthKey,
    tickets: &[BillableTicket],
    projects: &[BillableProject],
) -> MonthKey {
    tickets
        .iter()
        .map(|t| &t.month)
        .chain(projects.iter().filter_map(|p| p.month.as_ref()))
        .chain(std::iter::once(as_of))
        .max()
        .cloned()
        .unwrap_or_else(|| as_of.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerview_core::models::{BillingType, RevenueAmount};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn month(value: &str) -> MonthKey {
        MonthKey::parse(value).unwrap()
    }

    fn raw_ticket(date: &str, urgency: &str, hours: Decimal) -> RawTicket {
        RawTicket {
            id: None,
            date: Some(date.to_string()),
            category: Some("Forms".to_string()),
            urgency: Some(urgency.to_string()),
            estimated_hours: Some(hours),
            request_summary: None,
        }
    }

    fn raw_project(id: &str, completed: Option<&str>, category: &str, micros: i64) -> RawProject {
        RawProject {
            id: id.to_string(),
            name: Some(format!("Project {}", id)),
            project_completion_date: completed.map(str::to_string),
            invoice_status: Some("READY".to_string()),
            project_category: Some(category.to_string()),
            revenue_amount: Some(RevenueAmount {
                amount_micros: Some(micros),
                currency_code: Some("USD".to_string()),
            }),
            hosting_status: None,
            website_url: None,
        }
    }

    fn raw_site(id: &str, start: &str, mrr: Decimal) -> RawHostingProperty {
        RawHostingProperty {
            id: id.to_string(),
            name: Some(format!("Site {}", id)),
            website_url: None,
            hosting_start: Some(start.to_string()),
            hosting_end: None,
            hosting_mrr_amount: Some(mrr),
            hosting_status: Some("ACTIVE".to_string()),
        }
    }

    #[test]
    fn test_free_hours_scenario() {
        let records = RawRecords {
            tickets: vec![
                raw_ticket("2025-06-05", "Low", dec!(6)),
                raw_ticket("2025-06-12", "Medium", dec!(8)),
            ],
            ..Default::default()
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-06"));
        let june = &summary.monthly_breakdown[0];

        assert_eq!(june.tickets_gross_revenue, dec!(2300));
        assert_eq!(june.free_hours_savings, dec!(1600));
        assert_eq!(june.tickets_revenue, dec!(700));
        assert_eq!(june.ticket_details[0].net_amount, Decimal::ZERO);
        assert_eq!(june.ticket_details[1].net_amount, dec!(700));
    }

    #[test]
    fn test_prorated_hosting_scenario() {
        let records = RawRecords {
            hosting_properties: vec![raw_site("wp-1", "2025-06-15", dec!(99))],
            ..Default::default()
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-06"));
        let charge = &summary.monthly_breakdown[0].hosting_details[0];

        assert_eq!(charge.days_active, 16);
        assert_eq!(charge.billing_type, BillingType::ProratedStart);
        assert_eq!(charge.gross_amount, dec!(52.80));
        assert_eq!(summary.total_hosting_revenue, dec!(52.80));
    }

    #[test]
    fn test_undated_project_scenario() {
        let records = RawRecords {
            projects: vec![
                raw_project("p1", None, "WEBSITE", 3_000_000_000),
                raw_project("p2", Some("2025-06-02"), "WEBSITE", 1_000_000_000),
            ],
            ..Default::default()
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-06"));

        assert_eq!(summary.monthly_breakdown.len(), 1);
        assert_eq!(summary.monthly_breakdown[0].project_count, 1);
        assert_eq!(summary.projects_without_completion_date, 1);
        assert_eq!(summary.revenue_without_completion_date, dec!(3000));
        assert_eq!(summary.total_projects_revenue, dec!(1000));
    }

    #[test]
    fn test_mrr_is_last_month_scenario() {
        let records = RawRecords {
            hosting_properties: vec![
                raw_site("wp-1", "2025-06-01", dec!(100)),
                raw_site("wp-2", "2025-07-01", dec!(50)),
                raw_site("wp-3", "2025-08-01", dec!(25)),
            ],
            ..Default::default()
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-08"));

        let hosting: Vec<Decimal> = summary
            .monthly_breakdown
            .iter()
            .map(|m| m.hosting_revenue)
            .collect();
        assert_eq!(hosting, vec![dec!(100), dec!(150), dec!(175)]);
        assert_eq!(summary.total_hosting_revenue, dec!(175));
        assert_eq!(
            summary.total_hosting_revenue,
            summary.monthly_breakdown[2].hosting_revenue
        );
    }

    #[test]
    fn test_records_after_as_of_extend_hosting_horizon() {
        let records = RawRecords {
            tickets: vec![raw_ticket("2025-07-03", "Low", dec!(2))],
            hosting_properties: vec![raw_site("wp-1", "2025-01-01", dec!(99))],
            ..Default::default()
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-06"));

        let latest = summary.latest_month().unwrap();
        assert_eq!(latest.month.as_str(), "2025-07");
        assert_eq!(latest.hosting_count, 1);
        assert_eq!(latest.hosting_revenue, dec!(99));
        assert_eq!(summary.total_hosting_revenue, dec!(99));
        assert_eq!(summary.as_of.as_str(), "2025-07");
        assert!(summary
            .monthly_breakdown
            .iter()
            .all(|m| m.hosting_revenue == dec!(99)));
    }

    #[test]
    fn test_late_project_extends_hosting_horizon() {
        let records = RawRecords {
            projects: vec![raw_project("p1", Some("2025-09-12"), "WEBSITE", 2_000_000_000)],
            hosting_properties: vec![raw_site("wp-1", "2025-05-01", dec!(40))],
            ..Default::default()
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-06"));

        let months: Vec<&str> = summary
            .monthly_breakdown
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        assert_eq!(months, vec!["2025-05", "2025-06", "2025-07", "2025-08", "2025-09"]);
        assert_eq!(summary.total_hosting_revenue, dec!(40));
    }

    #[test]
    fn test_horizon_defaults_to_as_of() {
        let horizon = hosting_horizon(&month("2025-06"), &[], &[]);
        assert_eq!(horizon, month("2025-06"));
    }

    #[test]
    fn test_diagnostics_are_collected() {
        let mut bad_hours = raw_ticket("2025-06-05", "Low", dec!(1));
        bad_hours.estimated_hours = None;
        let mut no_start = raw_site("wp-1", "2025-06-01", dec!(10));
        no_start.hosting_start = None;

        let records = RawRecords {
            tickets: vec![bad_hours, raw_ticket("2025-06-06", "someday", dec!(1))],
            projects: Vec::new(),
            hosting_properties: vec![no_start],
        };

        let summary = compute_billing_summary(&records, &BillingPolicy::default(), &month("2025-06"));

        assert_eq!(summary.diagnostics.skipped_tickets, 1);
        assert_eq!(summary.diagnostics.unknown_urgency_ticket_ids, vec!["ticket-1"]);
        assert_eq!(summary.diagnostics.skipped_hosting_properties, 1);
        assert!(summary.diagnostics.has_warnings());
    }

    #[test]
    fn test_engine_is_idempotent() {
        let records = RawRecords {
            tickets: vec![raw_ticket("2025-07-05", "High", dec!(3))],
            projects: vec![raw_project("p1", Some("2025-06-30"), "LANDING_PAGE", 900_000_000)],
            hosting_properties: vec![raw_site("wp-1", "2025-05-20", dec!(45))],
        };
        let engine = BillingEngine::new(BillingPolicy::default());

        let first = engine.compute(&records, &month("2025-07"));
        let second = engine.compute(&records, &month("2025-07"));

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
