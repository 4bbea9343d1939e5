//! Collaborator traits
//!
//! The engine never fetches anything itself. Whatever delivers the three
//! raw record arrays (CRM export, ticketing export, in-memory fixture)
//! implements `RecordSource`.

use crate::error::AppError;
use crate::models::{RawHostingProperty, RawProject, RawTicket};
use async_trait::async_trait;

/// Source of the raw records the billing engine consumes
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Fetch raw support ticket/request records
    async fn fetch_tickets(&self) -> Result<Vec<RawTicket>, AppError>;

    /// Fetch raw CRM project records
    async fn fetch_projects(&self) -> Result<Vec<RawProject>, AppError>;

    /// Fetch raw website hosting property records
    async fn fetch_hosting_properties(&self) -> Result<Vec<RawHostingProperty>, AppError>;
}
