//! Credit policy engine
//!
//! Second pass of the engine. Each month's gross bucket is read, never
//! modified: credited line items are new copies, so the gross ledger stays
//! available for auditing and re-runs.
//!
//! Policies and the line items they touch:
//!
//! - free support hours: tickets, cheapest rate first, greedy
//! - free landing page / free multi-form / free basic forms: the first N
//!   projects of that category in list order
//! - free hosting credit: every N-th charge in site-name order

use ledgerview_core::{
    config::{BillingPolicy, FreeProjectPolicy},
    models::{BillableProject, BillableTicket, HostingCharge, ProjectCategory},
    MonthKey,
};
use rust_decimal::Decimal;

use crate::aggregator::MonthBucket;
use crate::hosting::apply_hosting_credits;

/// Result of the free support hours policy for one month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeHoursOutcome {
    /// Tickets in their original order
    pub tickets: Vec<BillableTicket>,
    pub hours_applied: Decimal,
    pub savings: Decimal,
}

/// Result of one free-project policy for one month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCreditOutcome {
    /// Projects in their original order
    pub projects: Vec<BillableProject>,
    pub credits: u32,
    pub savings: Decimal,
}

/// One month after every credit policy ran
#[derive(Debug, Clone, PartialEq)]
pub struct CreditedMonth {
    pub month: MonthKey,

    pub tickets: Vec<BillableTicket>,
    pub projects: Vec<BillableProject>,
    pub hosting: Vec<HostingCharge>,

    pub tickets_gross: Decimal,
    pub projects_gross: Decimal,
    pub hosting_gross: Decimal,

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
}

/// Spend up to `allowance` free hours on a month's tickets
///
/// Tickets are visited by rate ascending (stable, so equal rates keep list
/// order) and each takes `min(hours, remaining)`. The returned tickets keep
/// their original order.
pub fn apply_free_hours(tickets: &[BillableTicket], allowance: Decimal) -> FreeHoursOutcome {
    let mut credited: Vec<BillableTicket> = tickets.to_vec();
    let mut remaining = allowance.max(Decimal::ZERO);
    let mut hours_applied = Decimal::ZERO;
    let mut savings = Decimal::ZERO;

    let mut by_rate: Vec<usize> = (0..credited.len()).collect();
    by_rate.sort_by(|&a, &b| credited[a].rate.cmp(&credited[b].rate));

    for position in by_rate {
        if remaining <= Decimal::ZERO {
            break;
        }
        let ticket = &credited[position];
        let applied = ticket.hours.min(remaining);
        let updated = ticket.with_free_hours(applied);

        remaining -= applied;
        hours_applied += applied;
        savings += updated.savings();
        credited[position] = updated;
    }

    FreeHoursOutcome {
        tickets: credited,
        hours_applied,
        savings,
    }
}

/// Zero out the first `allowance` projects of `category`, in list order
///
/// Only projects with a positive amount are eligible; refunds and
/// zero-amount projects keep their amount and do not use up the allowance.
pub fn apply_free_projects(
    projects: &[BillableProject],
    category: ProjectCategory,
    allowance: u32,
) -> ProjectCreditOutcome {
    let mut outcome = ProjectCreditOutcome {
        projects: Vec::with_capacity(projects.len()),
        ..Default::default()
    };

    for project in projects {
        let eligible = project.category == Some(category)
            && !project.is_free_credit
            && project.gross_amount() > Decimal::ZERO;
        if eligible && outcome.credits < allowance {
            let credited = project.as_free_credit();
            outcome.credits += 1;
            outcome.savings += credited.gross_amount();
            outcome.projects.push(credited);
        } else {
            outcome.projects.push(project.clone());
        }
    }

    outcome
}

fn allowance_for(policy: &FreeProjectPolicy, month: &MonthKey) -> u32 {
    if policy.applies_to(month) {
        policy.per_month
    } else {
        0
    }
}

/// Run every credit policy over one month's gross bucket
pub fn apply_month_credits(bucket: &MonthBucket, policy: &BillingPolicy) -> CreditedMonth {
    let month = &bucket.month;

    let hours_allowance = if policy.free_hours.applies_to(month) {
        policy.free_hours.hours_per_month
    } else {
        Decimal::ZERO
    };
    let free_hours = apply_free_hours(&bucket.tickets, hours_allowance);

    let landing = apply_free_projects(
        &bucket.projects,
        ProjectCategory::LandingPage,
        allowance_for(&policy.free_landing_page, month),
    );
    let multi_form = apply_free_projects(
        &landing.projects,
        ProjectCategory::MultiForm,
        allowance_for(&policy.free_multi_form, month),
    );
    let basic_forms = apply_free_projects(
        &multi_form.projects,
        ProjectCategory::BasicForm,
        allowance_for(&policy.free_basic_forms, month),
    );

    let every_nth = if policy.hosting_credit.applies_to(month) {
        policy.hosting_credit.every_nth_site
    } else {
        0
    };
    let hosting = apply_hosting_credits(&bucket.hosting, every_nth);

    CreditedMonth {
        month: month.clone(),
        tickets_gross: bucket.tickets_gross(),
        projects_gross: bucket.projects_gross(),
        hosting_gross: bucket.hosting_gross(),
        tickets: free_hours.tickets,
        projects: basic_forms.projects,
        hosting: hosting.charges,
        free_hours_applied: free_hours.hours_applied,
        free_hours_savings: free_hours.savings,
        landing_page_credits: landing.credits,
        landing_page_savings: landing.savings,
        multi_form_credits: multi_form.credits,
        multi_form_savings: multi_form.savings,
        basic_form_credits: basic_forms.credits,
        basic_form_savings: basic_forms.savings,
        hosting_credits: hosting.credits,
        hosting_credit_savings: hosting.savings,
    }
}
