//! LedgerView Record Sources
//!
//! Implementations of the `RecordSource` trait that feed the billing
//! engine:
//!
//! - `JsonFileSource` reads CRM and ticketing exports from disk
//! - `StaticRecordSource` serves in-memory records (tests, benches, demos)
//!
//! Exports may be a bare JSON array or one of the envelopes the CRM API
//! returns; see [`envelope`].

pub mod envelope;
pub mod json_file;
pub mod memory;

pub use json_file::JsonFileSource;
pub use memory::StaticRecordSource;

// Re-export commonly used types
pub use ledgerview_core::{AppError, AppResult};
