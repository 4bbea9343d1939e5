//! Monthly aggregator
//!
//! First pass of the engine: folds the normalized tickets, projects and
//! hosting charges into per-month buckets holding gross line items only.
//! Credits are applied afterwards over the completed buckets.

use ledgerview_core::{
    models::{BillableProject, BillableTicket, HostingCharge},
    MonthKey,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Gross line items of one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub tickets: Vec<BillableTicket>,
    pub projects: Vec<BillableProject>,
    pub hosting: Vec<HostingCharge>,
}

impl MonthBucket {
    fn new(month: MonthKey) -> Self {
        Self {
            month,
            tickets: Vec::new(),
            projects: Vec::new(),
            hosting: Vec::new(),
        }
    }

    pub fn tickets_gross(&self) -> Decimal {
        self.tickets.iter().map(|t| t.amount).sum()
    }

    pub fn projects_gross(&self) -> Decimal {
        self.projects.iter().map(BillableProject::gross_amount).sum()
    }

    pub fn hosting_gross(&self) -> Decimal {
        self.hosting.iter().map(|h| h.gross_amount).sum()
    }

    pub fn ticket_hours(&self) -> Decimal {
        self.tickets.iter().map(|t| t.hours).sum()
    }
}

/// Month buckets in first-touch order, with a lookup index by month
#[derive(Debug, Clone, Default)]
pub struct MonthlyLedger {
    buckets: Vec<MonthBucket>,
    index: HashMap<MonthKey, usize>,
}

impl MonthlyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the gross ledger from the three normalized collections
    pub fn from_line_items(
        tickets: &[BillableTicket],
        projects: &[BillableProject],
        hosting: &[HostingCharge],
    ) -> Self {
        let mut ledger = Self::new();
        for ticket in tickets {
            ledger.add_ticket(ticket.clone());
        }
        for project in projects {
            ledger.add_project(project.clone());
        }
        for charge in hosting {
            ledger.add_hosting_charge(charge.clone());
        }
        ledger
    }

    fn bucket_mut(&mut self, month: &MonthKey) -> &mut MonthBucket {
        let position = match self.index.get(month) {
            Some(&position) => position,
            None => {
                self.buckets.push(MonthBucket::new(month.clone()));
                let position = self.buckets.len() - 1;
                self.index.insert(month.clone(), position);
                position
            }
        };
        &mut self.buckets[position]
    }

    pub fn add_ticket(&mut self, ticket: BillableTicket) {
        let month = ticket.month.clone();
        self.bucket_mut(&month).tickets.push(ticket);
    }

    /// Add a project to its completion month.
    ///
    /// Returns `false` (and drops nothing into the ledger) for a project
    /// with no completion month.
    pub fn add_project(&mut self, project: BillableProject) -> bool {
        match project.month.clone() {
            Some(month) => {
                self.bucket_mut(&month).projects.push(project);
                true
            }
            None => false,
        }
    }

    pub fn add_hosting_charge(&mut self, charge: HostingCharge) {
        let month = charge.month.clone();
        self.bucket_mut(&month).hosting.push(charge);
    }

    pub fn get(&self, month: &MonthKey) -> Option<&MonthBucket> {
        self.index.get(month).map(|&position| &self.buckets[position])
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in first-touch order (not chronological)
    pub fn buckets(&self) -> &[MonthBucket] {
        &self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerview_core::models::{BillingType, UrgencyTier};
    use rust_decimal_macros::dec;

    fn month(value: &str) -> MonthKey {
        MonthKey::parse(value).unwrap()
    }

    fn ticket(id: &str, date: &str, hours: Decimal, rate: Decimal) -> BillableTicket {
        BillableTicket {
            id: id.to_string(),
            date: date.to_string(),
            month: MonthKey::from_date_str(date).unwrap(),
            category: "Forms".to_string(),
            urgency: UrgencyTier::Low,
            urgency_fallback: false,
            description: None,
            hours,
            rate,
            amount: hours * rate,
            free_hours_applied: Decimal::ZERO,
            net_amount: hours * rate,
        }
    }

    fn project(id: &str, completed: Option<&str>, amount: Decimal) -> BillableProject {
        BillableProject {
            id: id.to_string(),
            name: id.to_string(),
            completion_date: completed.map(str::to_string),
            month: completed.and_then(MonthKey::from_date_str),
            category: None,
            website_url: None,
            amount,
            is_free_credit: false,
            original_amount: None,
        }
    }

    fn charge(id: &str, month_key: &str, gross: Decimal) -> HostingCharge {
        let month = month(month_key);
        HostingCharge {
            month: month.clone(),
            website_property_id: id.to_string(),
            site_name: id.to_string(),
            website_url: None,
            hosting_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            hosting_end: None,
            billing_type: BillingType::Full,
            days_active: month.days_in_month(),
            days_in_month: month.days_in_month(),
            mrr_amount: gross,
            gross_amount: gross,
            credit_applied: false,
            credit_amount: None,
            net_amount: gross,
        }
    }

    #[test]
    fn test_buckets_by_month_in_first_touch_order() {
        let ledger = MonthlyLedger::from_line_items(
            &[
                ticket("t1", "2025-07-02", dec!(1), dec!(150)),
                ticket("t2", "2025-06-30", dec!(2), dec!(150)),
                ticket("t3", "2025-07-20", dec!(1), dec!(175)),
            ],
            &[project("p1", Some("2025-05-01"), dec!(500))],
            &[charge("wp-1", "2025-06", dec!(99))],
        );

        let months: Vec<&str> = ledger.buckets().iter().map(|b| b.month.as_str()).collect();
        assert_eq!(months, vec!["2025-07", "2025-06", "2025-05"]);

        let july = ledger.get(&month("2025-07")).unwrap();
        assert_eq!(july.tickets.len(), 2);
        assert_eq!(july.tickets_gross(), dec!(325));
        assert_eq!(july.ticket_hours(), dec!(2));

        let june = ledger.get(&month("2025-06")).unwrap();
        assert_eq!(june.hosting_gross(), dec!(99));
        assert_eq!(june.tickets_gross(), dec!(300));
        assert!(june.projects.is_empty());
    }

    #[test]
    fn test_undated_projects_are_not_bucketed() {
        let mut ledger = MonthlyLedger::new();
        assert!(!ledger.add_project(project("p1", None, dec!(100))));
        assert!(ledger.is_empty());

        assert!(ledger.add_project(project("p2", Some("2025-06-10"), dec!(100))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_projects_gross_uses_pre_credit_amount() {
        let mut ledger = MonthlyLedger::new();
        let free = project("p1", Some("2025-06-10"), dec!(800)).as_free_credit();
        ledger.add_project(free);

        let june = ledger.get(&month("2025-06")).unwrap();
        assert_eq!(june.projects_gross(), dec!(800));
    }
}
