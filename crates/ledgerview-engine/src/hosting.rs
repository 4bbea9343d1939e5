//! Hosting proration engine
//!
//! Expands each hosting property into one charge per calendar month it
//! overlaps, prorated linearly by active days, and assigns the free
//! hosting credit within a month.
//!
//! # Classification
//!
//! | Type             | Condition                                      | Days active               |
//! |------------------|------------------------------------------------|---------------------------|
//! | `FULL`           | start ≤ first day and (no end or end ≥ last)   | days in month             |
//! | `PRORATED_START` | start inside the month                         | through end or month end  |
//! | `PRORATED_END`   | end inside the month, start before it          | day of end                |
//! | `INACTIVE`       | no overlap                                     | not emitted               |

use chrono::{Datelike, NaiveDate};
use ledgerview_core::{
    models::{BillingType, HostingCharge, RawHostingProperty},
    MonthKey,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::debug;

/// Decimal places kept on prorated amounts
pub const PRORATION_SCALE: u32 = 10;

/// Output of one proration run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostingBatch {
    /// Charges ordered by property, then month
    pub charges: Vec<HostingCharge>,
    pub skipped: usize,
}

/// Free hosting credits granted within one month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostingCreditOutcome {
    /// The month's charges in credit order
    pub charges: Vec<HostingCharge>,
    pub credits: u32,
    pub savings: Decimal,
}

/// Proration shape and active day count of a site for one month
pub fn classify(start: NaiveDate, end: Option<NaiveDate>, month: &MonthKey) -> (BillingType, u32) {
    let first = month.first_day();
    let last = month.last_day();
    let days_in_month = month.days_in_month();

    if start > last || end.is_some_and(|end| end < first) {
        return (BillingType::Inactive, 0);
    }

    if start <= first && end.map_or(true, |end| end >= last) {
        return (BillingType::Full, days_in_month);
    }

    if month.contains(start) {
        let last_active = match end {
            Some(end) if month.contains(end) => end.day(),
            _ => days_in_month,
        };
        return (BillingType::ProratedStart, last_active - start.day() + 1);
    }

    match end {
        Some(end) if month.contains(end) => (BillingType::ProratedEnd, end.day()),
        _ => (BillingType::Inactive, 0),
    }
}

/// `mrr × days_active / days_in_month`, rounded to `PRORATION_SCALE` places
///
/// The fixed scale keeps month and grand totals exact sums.
pub fn prorate(mrr: Decimal, days_active: u32, days_in_month: u32) -> Decimal {
    assert!(days_in_month > 0, "calendar month with zero days");
    (mrr * Decimal::from(days_active) / Decimal::from(days_in_month)).round_dp(PRORATION_SCALE)
}

/// Expand every hosting property into monthly charges through `as_of`
pub fn prorate_hosting(raw: &[RawHostingProperty], as_of: &MonthKey) -> HostingBatch {
    let mut batch = HostingBatch::default();

    for property in raw {
        match prorate_property(property, as_of) {
            Some(charges) => batch.charges.extend(charges),
            None => {
                debug!(
                    "Skipping hosting property {}: missing start, missing or negative MRR, or end before start",
                    property.id
                );
                batch.skipped += 1;
            }
        }
    }

    batch
}

/// Monthly charges of a single property; `None` when it cannot be prorated
/// (no start date, no MRR or a negative one, or an end before the start)
pub fn prorate_property(
    property: &RawHostingProperty,
    as_of: &MonthKey,
) -> Option<Vec<HostingCharge>> {
    let start = property.start_date()?;
    let mrr = property
        .hosting_mrr_amount
        .filter(|mrr| *mrr >= Decimal::ZERO)?;
    let end = property.end_date();
    if end.is_some_and(|end| end < start) {
        return None;
    }

    let site_name = property
        .name
        .clone()
        .or_else(|| property.website_url.clone())
        .unwrap_or_else(|| property.id.clone());

    let last_month = match end.map(MonthKey::from_date) {
        Some(end_month) if &end_month < as_of => end_month,
        _ => as_of.clone(),
    };

    let mut charges = Vec::new();
    let mut month = MonthKey::from_date(start);

    while month <= last_month {
        let (billing_type, days_active) = classify(start, end, &month);
        if billing_type != BillingType::Inactive {
            let days_in_month = month.days_in_month();
            let gross_amount = prorate(mrr, days_active, days_in_month);

            charges.push(HostingCharge {
                month: month.clone(),
                website_property_id: property.id.clone(),
                site_name: site_name.clone(),
                website_url: property.website_url.clone(),
                hosting_start: start,
                hosting_end: end,
                billing_type,
                days_active,
                days_in_month,
                mrr_amount: mrr,
                gross_amount,
                credit_applied: false,
                credit_amount: None,
                net_amount: gross_amount,
            });
        }
        month = month.next();
    }

    Some(charges)
}

/// Order in which a month's charges are considered for the free credit
pub fn credit_order(a: &HostingCharge, b: &HostingCharge) -> Ordering {
    a.site_name
        .cmp(&b.site_name)
        .then_with(|| a.website_property_id.cmp(&b.website_property_id))
}

/// Grant one free site-month for every `every_nth_site` charges of a month
///
/// Charges are sorted by site name, then property id; the charges at
/// positions N, 2N, 3N... in that order are credited.
pub fn apply_hosting_credits(charges: &[HostingCharge], every_nth_site: u32) -> HostingCreditOutcome {
    let mut ordered: Vec<HostingCharge> = charges.to_vec();
    ordered.sort_by(credit_order);

    if every_nth_site == 0 {
        return HostingCreditOutcome {
            charges: ordered,
            ..Default::default()
        };
    }

    let nth = every_nth_site as usize;
    let mut outcome = HostingCreditOutcome::default();

    for (position, charge) in ordered.into_iter().enumerate() {
        if (position + 1) % nth == 0 {
            let credited = charge.with_credit();
            outcome.credits += 1;
            outcome.savings += credited.gross_amount;
            outcome.charges.push(credited);
        } else {
            outcome.charges.push(charge);
        }
    }

    outcome
}
