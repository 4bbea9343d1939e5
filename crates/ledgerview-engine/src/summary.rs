//! Summary builder
//!
//! Finalizes each credited month, sorts the breakdown chronologically and
//! computes the grand totals. Hosting's grand total is the most recent
//! month's net hosting revenue (current MRR), not a sum over months.

use ledgerview_core::{
    models::{BillingDiagnostics, BillingSummary, MonthlyBillingSummary},
    MonthKey,
};
use rust_decimal::Decimal;

use crate::credits::CreditedMonth;

/// Projects kept out of the breakdown for lack of a completion date
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UndatedProjects {
    pub count: usize,
    pub revenue: Decimal,
}

/// Freeze a credited month into its summary record
pub fn finalize_month(credited: CreditedMonth) -> MonthlyBillingSummary {
    let tickets_revenue: Decimal = credited.tickets.iter().map(|t| t.net_amount).sum();
    let projects_revenue: Decimal = credited.projects.iter().map(|p| p.amount).sum();
    let hosting_revenue: Decimal = credited.hosting.iter().map(|h| h.net_amount).sum();

    MonthlyBillingSummary {
        month: credited.month,
        ticket_count: credited.tickets.len(),
        project_count: credited.projects.len(),
        hosting_count: credited.hosting.len(),
        ticket_details: credited.tickets,
        project_details: credited.projects,
        hosting_details: credited.hosting,
        tickets_gross_revenue: credited.tickets_gross,
        projects_gross_revenue: credited.projects_gross,
        hosting_gross_revenue: credited.hosting_gross,
        tickets_revenue,
        projects_revenue,
        hosting_revenue,
        free_hours_applied: credited.free_hours_applied,
        free_hours_savings: credited.free_hours_savings,
        landing_page_credits: credited.landing_page_credits,
        landing_page_savings: credited.landing_page_savings,
        multi_form_credits: credited.multi_form_credits,
        multi_form_savings: credited.multi_form_savings,
        basic_form_credits: credited.basic_form_credits,
        basic_form_savings: credited.basic_form_savings,
        hosting_credits: credited.hosting_credits,
        hosting_credit_savings: credited.hosting_credit_savings,
        total_revenue: tickets_revenue + projects_revenue + hosting_revenue,
    }
}

/// Assemble the top-level summary
pub fn build_summary(
    mut months: Vec<MonthlyBillingSummary>,
    undated: UndatedProjects,
    diagnostics: BillingDiagnostics,
    as_of: MonthKey,
) -> BillingSummary {
    months.sort_by(|a, b| a.month.cmp(&b.month));

    let total_tickets_revenue: Decimal = months.iter().map(|m| m.tickets_revenue).sum();
    let total_projects_revenue: Decimal = months.iter().map(|m| m.projects_revenue).sum();
    let total_hosting_revenue = months
        .last()
        .map(|m| m.hosting_revenue)
        .unwrap_or(Decimal::ZERO);

    BillingSummary {
        as_of,
        monthly_breakdown: months,
        total_tickets_revenue,
        total_projects_revenue,
        total_hosting_revenue,
        total_revenue: total_tickets_revenue + total_projects_revenue + total_hosting_revenue,
        projects_without_completion_date: undated.count,
        revenue_without_completion_date: undated.revenue,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn month_summary(month: &str, tickets: Decimal, hosting: Decimal) -> MonthlyBillingSummary {
        MonthlyBillingSummary {
            month: MonthKey::parse(month).unwrap(),
            ticket_details: Vec::new(),
            project_details: Vec::new(),
            hosting_details: Vec::new(),
            ticket_count: 0,
            project_count: 0,
            hosting_count: 0,
            tickets_gross_revenue: tickets,
            projects_gross_revenue: Decimal::ZERO,
            hosting_gross_revenue: hosting,
            tickets_revenue: tickets,
            projects_revenue: Decimal::ZERO,
            hosting_revenue: hosting,
            free_hours_applied: Decimal::ZERO,
            free_hours_savings: Decimal::ZERO,
            landing_page_credits: 0,
            landing_page_savings: Decimal::ZERO,
            multi_form_credits: 0,
            multi_form_savings: Decimal::ZERO,
            basic_form_credits: 0,
            basic_form_savings: Decimal::ZERO,
            hosting_credits: 0,
            hosting_credit_savings: Decimal::ZERO,
            total_revenue: tickets + hosting,
        }
    }

    fn as_of() -> MonthKey {
        MonthKey::parse("2025-08").unwrap()
    }

    #[test]
    fn test_sorts_months_explicitly() {
        let summary = build_summary(
            vec![
                month_summary("2025-08", dec!(1), dec!(0)),
                month_summary("2024-12", dec!(1), dec!(0)),
                month_summary("2025-02", dec!(1), dec!(0)),
            ],
            UndatedProjects::default(),
            BillingDiagnostics::default(),
            as_of(),
        );

        let months: Vec<&str> = summary
            .monthly_breakdown
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        assert_eq!(months, vec!["2024-12", "2025-02", "2025-08"]);
    }

    #[test]
    fn test_hosting_total_is_latest_month_only() {
        let summary = build_summary(
            vec![
                month_summary("2025-07", dec!(100), dec!(300)),
                month_summary("2025-06", dec!(200), dec!(250)),
                month_summary("2025-08", dec!(50), dec!(320)),
            ],
            UndatedProjects::default(),
            BillingDiagnostics::default(),
            as_of(),
        );

        assert_eq!(summary.total_hosting_revenue, dec!(320));
        assert_eq!(summary.total_tickets_revenue, dec!(350));
        assert_eq!(summary.total_revenue, dec!(670));
    }

    #[test]
    fn test_undated_revenue_is_reported_not_totaled() {
        let summary = build_summary(
            vec![month_summary("2025-06", dec!(100), dec!(0))],
            UndatedProjects {
                count: 2,
                revenue: dec!(1500),
            },
            BillingDiagnostics::default(),
            as_of(),
        );

        assert_eq!(summary.projects_without_completion_date, 2);
        assert_eq!(summary.revenue_without_completion_date, dec!(1500));
        assert_eq!(summary.total_revenue, dec!(100));
    }

    #[test]
    fn test_empty_breakdown() {
        let summary = build_summary(
            Vec::new(),
            UndatedProjects::default(),
            BillingDiagnostics::default(),
            as_of(),
        );

        assert!(summary.monthly_breakdown.is_empty());
        assert_eq!(summary.total_hosting_revenue, Decimal::ZERO);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
    }
}
