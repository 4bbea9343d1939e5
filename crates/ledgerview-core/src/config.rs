//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.
//!
//! The `billing` section is the immutable [`BillingPolicy`] handed to the
//! engine on every run: ticket rates, billable statuses, and the start
//! month and allowance of each promotional credit.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::models::{InvoiceStatus, UrgencyTier};
use crate::month::MonthKey;
use crate::AppResult;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub billing: BillingPolicy,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma-separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9001
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// Location of the JSON exports read by the file record source
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory holding the exports
    #[serde(default = "default_data_dir")]
    pub dir: String,

    #[serde(default = "default_tickets_file")]
    pub tickets_file: String,

    #[serde(default = "default_projects_file")]
    pub projects_file: String,

    #[serde(default = "default_hosting_file")]
    pub hosting_file: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_tickets_file() -> String {
    "tickets.json".to_string()
}

fn default_projects_file() -> String {
    "projects.json".to_string()
}

fn default_hosting_file() -> String {
    "hosting_properties.json".to_string()
}

impl DataConfig {
    pub fn tickets_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.tickets_file)
    }

    pub fn projects_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.projects_file)
    }

    pub fn hosting_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.hosting_file)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            tickets_file: default_tickets_file(),
            projects_file: default_projects_file(),
            hosting_file: default_hosting_file(),
        }
    }
}

/// Billing policy applied by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingPolicy {
    pub tickets: TicketPricing,
    pub projects: ProjectRules,
    pub free_hours: FreeHoursPolicy,
    pub free_landing_page: FreeProjectPolicy,
    pub free_multi_form: FreeProjectPolicy,
    pub free_basic_forms: FreeProjectPolicy,
    pub hosting_credit: HostingCreditPolicy,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            tickets: TicketPricing::default(),
            projects: ProjectRules::default(),
            free_hours: FreeHoursPolicy::default(),
            free_landing_page: FreeProjectPolicy::default(),
            free_multi_form: FreeProjectPolicy::default(),
            free_basic_forms: FreeProjectPolicy::new(default_start_month(), 5),
            hosting_credit: HostingCreditPolicy::default(),
        }
    }
}

/// Support ticket pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketPricing {
    /// Dollars/hour for the promotional low tier
    pub promotional_rate: Decimal,
    pub low_rate: Decimal,
    pub medium_rate: Decimal,
    pub high_rate: Decimal,

    /// Categories that are never billed (case-insensitive)
    pub non_billable_categories: Vec<String>,

    /// Category billed at a rate of 0 regardless of urgency
    pub migration_category: String,
}

impl Default for TicketPricing {
    fn default() -> Self {
        Self {
            promotional_rate: Decimal::from(125),
            low_rate: Decimal::from(150),
            medium_rate: Decimal::from(175),
            high_rate: Decimal::from(250),
            non_billable_categories: vec!["Non-billable".to_string()],
            migration_category: "Migration".to_string(),
        }
    }
}

impl TicketPricing {
    /// Hourly rate of a tier
    pub fn rate_for(&self, tier: UrgencyTier) -> Decimal {
        match tier {
            UrgencyTier::Promotional => self.promotional_rate,
            UrgencyTier::Low => self.low_rate,
            UrgencyTier::Medium => self.medium_rate,
            UrgencyTier::High => self.high_rate,
        }
    }

    /// Tier used for unknown urgency labels: the cheapest rate, earliest
    /// tier in table order on ties
    pub fn fallback_tier(&self) -> UrgencyTier {
        UrgencyTier::ALL
            .into_iter()
            .fold(UrgencyTier::Promotional, |best, tier| {
                if self.rate_for(tier) < self.rate_for(best) {
                    tier
                } else {
                    best
                }
            })
    }

    pub fn is_non_billable(&self, category: &str) -> bool {
        let category = category.trim();
        self.non_billable_categories
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(category))
    }

    pub fn is_migration(&self, category: &str) -> bool {
        self.migration_category
            .trim()
            .eq_ignore_ascii_case(category.trim())
    }
}

/// Project inclusion rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRules {
    /// Invoice statuses that make a project billable
    pub billable_statuses: Vec<InvoiceStatus>,
}

impl Default for ProjectRules {
    fn default() -> Self {
        Self {
            billable_statuses: vec![InvoiceStatus::Ready],
        }
    }
}

impl ProjectRules {
    pub fn is_billable(&self, status: InvoiceStatus) -> bool {
        self.billable_statuses.contains(&status)
    }
}

/// Free support hours granted each month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeHoursPolicy {
    /// First month the allowance is granted
    pub start_month: MonthKey,
    pub hours_per_month: Decimal,
}

impl Default for FreeHoursPolicy {
    fn default() -> Self {
        Self {
            start_month: default_start_month(),
            hours_per_month: Decimal::from(10),
        }
    }
}

impl FreeHoursPolicy {
    pub fn applies_to(&self, month: &MonthKey) -> bool {
        month >= &self.start_month
    }
}

/// Free projects of one category granted each month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeProjectPolicy {
    /// First month the allowance is granted
    pub start_month: MonthKey,
    pub per_month: u32,
}

impl Default for FreeProjectPolicy {
    fn default() -> Self {
        Self {
            start_month: default_start_month(),
            per_month: 1,
        }
    }
}

impl FreeProjectPolicy {
    pub fn new(start_month: MonthKey, per_month: u32) -> Self {
        Self {
            start_month,
            per_month,
        }
    }

    pub fn applies_to(&self, month: &MonthKey) -> bool {
        month >= &self.start_month
    }
}

/// Free hosting site-month credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingCreditPolicy {
    /// First month credits are granted; `None` grants them in every month
    pub start_month: Option<MonthKey>,

    /// Every N-th active site of a month is free
    pub every_nth_site: u32,
}

impl Default for HostingCreditPolicy {
    fn default() -> Self {
        Self {
            start_month: None,
            every_nth_site: 21,
        }
    }
}

impl HostingCreditPolicy {
    pub fn applies_to(&self, month: &MonthKey) -> bool {
        self.start_month.as_ref().map_or(true, |start| month >= start)
    }
}

fn default_start_month() -> MonthKey {
    MonthKey::new_unchecked("2025-06")
}

impl BillingPolicy {
    /// Reject policies the engine cannot apply
    pub fn validate(&self) -> AppResult<()> {
        let rates = [
            self.tickets.promotional_rate,
            self.tickets.low_rate,
            self.tickets.medium_rate,
            self.tickets.high_rate,
        ];
        if rates.iter().any(|r| *r < Decimal::ZERO) {
            return Err(AppError::Config("Ticket rates cannot be negative".to_string()));
        }

        if self.free_hours.hours_per_month < Decimal::ZERO {
            return Err(AppError::Config(
                "Free hours allowance cannot be negative".to_string(),
            ));
        }

        if self.hosting_credit.every_nth_site == 0 {
            return Err(AppError::Config(
                "Hosting credit interval must be at least 1".to_string(),
            ));
        }

        if self.projects.billable_statuses.is_empty() {
            return Err(AppError::Config(
                "At least one billable invoice status is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Copy of the default policy with every credit starting at `month`
    pub fn starting_at(month: MonthKey) -> Self {
        let mut policy = Self::default();
        policy.free_hours.start_month = month.clone();
        policy.free_landing_page.start_month = month.clone();
        policy.free_multi_form.start_month = month.clone();
        policy.free_basic_forms.start_month = month;
        policy
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9001)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("data.dir", "data")?
            .set_default("data.tickets_file", "tickets.json")?
            .set_default("data.projects_file", "projects.json")?
            .set_default("data.hosting_file", "hosting_properties.json")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with LEDGERVIEW_ prefix
            .add_source(
                Environment::with_prefix("LEDGERVIEW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_billing_policy() {
        let policy = BillingPolicy::default();
        assert_eq!(policy.tickets.low_rate, dec!(150));
        assert_eq!(policy.tickets.medium_rate, dec!(175));
        assert_eq!(policy.free_hours.hours_per_month, dec!(10));
        assert_eq!(policy.hosting_credit.every_nth_site, 21);
        assert_eq!(policy.free_landing_page.per_month, 1);
        assert_eq!(policy.free_basic_forms.per_month, 5);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_starting_at_sets_basic_form_allowance() {
        let month = MonthKey::parse("2025-01").unwrap();
        let policy = BillingPolicy::starting_at(month.clone());
        assert_eq!(policy.free_basic_forms.per_month, 5);
        assert_eq!(policy.free_multi_form.start_month, month);
    }

    #[test]
    fn test_fallback_tier_is_cheapest() {
        let mut pricing = TicketPricing::default();
        assert_eq!(pricing.fallback_tier(), UrgencyTier::Promotional);

        pricing.promotional_rate = dec!(200);
        assert_eq!(pricing.fallback_tier(), UrgencyTier::Low);
    }

    #[test]
    fn test_category_matching_is_case_insensitive() {
        let pricing = TicketPricing::default();
        assert!(pricing.is_non_billable(" non-billable "));
        assert!(pricing.is_migration("MIGRATION"));
        assert!(!pricing.is_migration("Hosting"));
    }

    #[test]
    fn test_threshold_gates() {
        let policy = FreeProjectPolicy::new(MonthKey::parse("2025-06").unwrap(), 1);
        assert!(!policy.applies_to(&MonthKey::parse("2025-05").unwrap()));
        assert!(policy.applies_to(&MonthKey::parse("2025-06").unwrap()));
        assert!(policy.applies_to(&MonthKey::parse("2026-01").unwrap()));

        let hosting = HostingCreditPolicy::default();
        assert!(hosting.applies_to(&MonthKey::parse("2019-01").unwrap()));
    }

    #[test]
    fn test_validate_rejects_zero_hosting_interval() {
        let mut policy = BillingPolicy::default();
        policy.hosting_credit.every_nth_site = 0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_deserializes_partial_overrides() {
        let policy: BillingPolicy = serde_json::from_str(
            r#"{
                "free_hours": { "start_month": "2025-08", "hours_per_month": "12.5" },
                "projects": { "billable_statuses": ["READY", "INVOICED"] }
            }"#,
        )
        .unwrap();

        assert_eq!(policy.free_hours.start_month.as_str(), "2025-08");
        assert_eq!(policy.free_hours.hours_per_month, dec!(12.5));
        assert!(policy.projects.is_billable(InvoiceStatus::Invoiced));
        assert_eq!(policy.tickets.high_rate, dec!(250));
    }
}
