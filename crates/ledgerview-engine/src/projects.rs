//! Project normalizer
//!
//! Keeps the projects whose invoice status is in the billable set and
//! converts their CRM micros amount to dollars. Projects lacking a usable
//! completion date are split off into an exception list so they are
//! reported instead of silently dropped.

use ledgerview_core::{
    config::ProjectRules,
    models::{BillableProject, InvoiceStatus, ProjectCategory, RawProject},
    MonthKey,
};
use rust_decimal::Decimal;

/// Output of one normalizer run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectBatch {
    /// Billable projects with a completion month, in input order
    pub dated: Vec<BillableProject>,

    /// Billable projects with no (or an unreadable) completion date
    pub undated: Vec<BillableProject>,
}

impl ProjectBatch {
    /// Sum of the exception bucket
    pub fn undated_revenue(&self) -> Decimal {
        self.undated.iter().map(|p| p.amount).sum()
    }
}

/// Normalize every raw project, preserving input order
pub fn normalize_projects(raw: &[RawProject], rules: &ProjectRules) -> ProjectBatch {
    let mut batch = ProjectBatch::default();

    for project in raw.iter().filter_map(|p| normalize_project(p, rules)) {
        if project.month.is_some() {
            batch.dated.push(project);
        } else {
            batch.undated.push(project);
        }
    }

    batch
}

/// Normalize a single raw project; `None` when it is not billable
pub fn normalize_project(raw: &RawProject, rules: &ProjectRules) -> Option<BillableProject> {
    let status = raw
        .invoice_status
        .as_deref()
        .and_then(InvoiceStatus::from_str)?;
    if !rules.is_billable(status) {
        return None;
    }

    let month = raw
        .project_completion_date
        .as_deref()
        .and_then(MonthKey::from_date_str);

    let amount = raw
        .revenue_amount
        .as_ref()
        .and_then(|revenue| revenue.dollars())
        .unwrap_or(Decimal::ZERO);

    Some(BillableProject {
        id: raw.id.clone(),
        name: raw.name.clone().unwrap_or_else(|| raw.id.clone()),
        completion_date: month
            .as_ref()
            .and(raw.project_completion_date.as_deref())
            .map(|date| date.trim().to_string()),
        month,
        category: raw
            .project_category
            .as_deref()
            .and_then(ProjectCategory::from_str),
        website_url: raw.website_url.clone(),
        amount,
        is_free_credit: false,
        original_amount: None,
    })
}
