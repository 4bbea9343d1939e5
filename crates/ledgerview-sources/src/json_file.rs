//! JSON export record source
//!
//! Reads the three exports from disk on every fetch, so a dashboard reload
//! always sees the latest files.

use ledgerview_core::{
    config::DataConfig,
    models::{RawHostingProperty, RawProject, RawTicket},
    traits::RecordSource,
    AppError, AppResult,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

use crate::envelope::decode_records;

/// Collection names used by the CRM API envelopes
const TICKETS_COLLECTION: &str = "supportTickets";
const PROJECTS_COLLECTION: &str = "projects";
const HOSTING_COLLECTION: &str = "websiteProperties";

/// `RecordSource` backed by JSON files
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    tickets_path: PathBuf,
    projects_path: PathBuf,
    hosting_path: PathBuf,
}

impl JsonFileSource {
    /// Create a source from explicit file paths
    pub fn new(
        tickets_path: impl Into<PathBuf>,
        projects_path: impl Into<PathBuf>,
        hosting_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tickets_path: tickets_path.into(),
            projects_path: projects_path.into(),
            hosting_path: hosting_path.into(),
        }
    }

    /// Create a source from the `data` configuration section
    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(
            config.tickets_path(),
            config.projects_path(),
            config.hosting_path(),
        )
    }

    async fn read_records<T: DeserializeOwned>(
        source_name: &str,
        collection: &str,
        path: &Path,
    ) -> AppResult<Vec<T>> {
        debug!("Reading {} from {}", source_name, path.display());

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            AppError::fetch(source_name, format!("{}: {}", path.display(), e))
        })?;

        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Invalid JSON in {}: {}", path.display(), e);
            AppError::format(source_name, format!("{}: {}", path.display(), e))
        })?;

        let records = decode_records(source_name, collection, payload)?;
        debug!("Loaded {} {} records", records.len(), source_name);
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    #[instrument(skip(self))]
    async fn fetch_tickets(&self) -> AppResult<Vec<RawTicket>> {
        Self::read_records("tickets", TICKETS_COLLECTION, &self.tickets_path).await
    }

    #[instrument(skip(self))]
    async fn fetch_projects(&self) -> AppResult<Vec<RawProject>> {
        Self::read_records("projects", PROJECTS_COLLECTION, &self.projects_path).await
    }

    #[instrument(skip(self))]
    async fn fetch_hosting_properties(&self) -> AppResult<Vec<RawHostingProperty>> {
        Self::read_records("hosting properties", HOSTING_COLLECTION, &self.hosting_path).await
    }
}
