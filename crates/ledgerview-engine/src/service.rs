//! Billing service
//!
//! Async entry point: awaits the three record fetches concurrently, then
//! runs the engine. A failed fetch fails the whole call; the engine never
//! runs on partial input.

use ledgerview_core::{
    models::{BillingSummary, MonthlyBillingSummary},
    traits::RecordSource,
    AppResult, BillingPolicy, MonthKey,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{BillingEngine, RawRecords};

/// Fetches raw records from a `RecordSource` and computes billing summaries
pub struct BillingService {
    source: Arc<dyn RecordSource>,
    engine: BillingEngine,
}

impl BillingService {
    /// Create a new billing service
    pub fn new(source: Arc<dyn RecordSource>, policy: BillingPolicy) -> Self {
        Self {
            source,
            engine: BillingEngine::new(policy),
        }
    }

    pub fn policy(&self) -> &BillingPolicy {
        self.engine.policy()
    }

    /// Fetch all three record arrays concurrently
    #[instrument(skip(self), fields(source = %self.source.name()))]
    pub async fn fetch_records(&self) -> AppResult<RawRecords> {
        let (tickets, projects, hosting_properties) = tokio::try_join!(
            self.source.fetch_tickets(),
            self.source.fetch_projects(),
            self.source.fetch_hosting_properties(),
        )?;

        debug!(
            "Fetched {} tickets, {} projects, {} hosting properties",
            tickets.len(),
            projects.len(),
            hosting_properties.len()
        );

        Ok(RawRecords {
            tickets,
            projects,
            hosting_properties,
        })
    }

    /// Compute the billing summary with hosting prorated through `as_of`
    #[instrument(skip(self, as_of), fields(as_of = %as_of))]
    pub async fn summarize(&self, as_of: &MonthKey) -> AppResult<BillingSummary> {
        let records = self.fetch_records().await?;
        let summary = self.engine.compute(&records, as_of);

        let diagnostics = &summary.diagnostics;
        for ticket_id in &diagnostics.unknown_urgency_ticket_ids {
            warn!(
                "Ticket {} has an unknown urgency; billed at the {} tier",
                ticket_id,
                self.policy().tickets.fallback_tier()
            );
        }
        if diagnostics.skipped_tickets > 0 {
            warn!(
                "Skipped {} tickets with missing hours, bad dates or non-billable categories",
                diagnostics.skipped_tickets
            );
        }
        if diagnostics.skipped_hosting_properties > 0 {
            warn!(
                "Skipped {} hosting properties with missing start, missing or negative MRR, or inverted dates",
                diagnostics.skipped_hosting_properties
            );
        }
        if summary.projects_without_completion_date > 0 {
            warn!(
                "{} billable projects (${}) have no completion date",
                summary.projects_without_completion_date, summary.revenue_without_completion_date
            );
        }

        info!(
            "Billing summary: {} months, total ${} (tickets ${}, projects ${}, MRR ${})",
            summary.monthly_breakdown.len(),
            summary.total_revenue,
            summary.total_tickets_revenue,
            summary.total_projects_revenue,
            summary.total_hosting_revenue
        );

        Ok(summary)
    }

    /// One month of the breakdown, if any source touched it
    pub async fn month_summary(
        &self,
        month: &MonthKey,
        as_of: &MonthKey,
    ) -> AppResult<Option<MonthlyBillingSummary>> {
        let summary = self.summarize(as_of).await?;
        Ok(summary.month(month).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledgerview_core::{
        models::{RawHostingProperty, RawProject, RawTicket},
        AppError,
    };
    use rust_decimal_macros::dec;

    struct FixtureSource {
        fail_projects: bool,
    }

    #[async_trait]
    impl RecordSource for FixtureSource {
        fn name(&self) -> &str {
            "fixture"
        }

        async fn fetch_tickets(&self) -> Result<Vec<RawTicket>, AppError> {
            Ok(vec![RawTicket {
                id: Some("t1".to_string()),
                date: Some("2025-06-10".to_string()),
                category: Some("Forms".to_string()),
                urgency: Some("High".to_string()),
                estimated_hours: Some(dec!(12)),
                request_summary: None,
            }])
        }

        async fn fetch_projects(&self) -> Result<Vec<RawProject>, AppError> {
            if self.fail_projects {
                Err(AppError::fetch("projects", "connection reset"))
            } else {
                Ok(Vec::new())
            }
        }

        async fn fetch_hosting_properties(&self) -> Result<Vec<RawHostingProperty>, AppError> {
            Ok(Vec::new())
        }
    }

    fn june() -> MonthKey {
        MonthKey::parse("2025-06").unwrap()
    }

    #[tokio::test]
    async fn test_summarize_runs_engine() {
        let service = BillingService::new(
            Arc::new(FixtureSource {
                fail_projects: false,
            }),
            BillingPolicy::default(),
        );

        let summary = service.summarize(&june()).await.unwrap();

        assert_eq!(summary.monthly_breakdown.len(), 1);
        // 12h at 250, 10 free
        assert_eq!(summary.total_tickets_revenue, dec!(500));
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_whole_call() {
        let service = BillingService::new(
            Arc::new(FixtureSource { fail_projects: true }),
            BillingPolicy::default(),
        );

        let err = service.summarize(&june()).await.unwrap_err();
        assert!(matches!(err, AppError::SourceFetch { .. }));
    }

    #[tokio::test]
    async fn test_month_summary_lookup() {
        let service = BillingService::new(
            Arc::new(FixtureSource {
                fail_projects: false,
            }),
            BillingPolicy::default(),
        );

        let found = service.month_summary(&june(), &june()).await.unwrap();
        assert!(found.is_some());

        let missing = MonthKey::parse("2025-05").unwrap();
        assert!(service.month_summary(&missing, &june()).await.unwrap().is_none());
    }
}
