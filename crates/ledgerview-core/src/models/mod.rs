//! Domain models for LedgerView
//!
//! Raw records as delivered by the data collaborators, the normalized
//! line items built from them, and the summaries returned to the dashboard.

pub mod hosting;
pub mod lenient;
pub mod project;
pub mod summary;
pub mod ticket;

pub use hosting::{parse_calendar_date, BillingType, HostingCharge, RawHostingProperty};
pub use project::{BillableProject, InvoiceStatus, ProjectCategory, RawProject, RevenueAmount};
pub use summary::{BillingDiagnostics, BillingSummary, MonthlyBillingSummary};
pub use ticket::{BillableTicket, RawTicket, UrgencyTier};
