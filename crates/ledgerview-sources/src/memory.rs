//! In-memory record source

use ledgerview_core::{
    models::{RawHostingProperty, RawProject, RawTicket},
    traits::RecordSource,
    AppError, AppResult,
};
use async_trait::async_trait;

/// `RecordSource` serving fixed records, optionally failing every fetch
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    tickets: Vec<RawTicket>,
    projects: Vec<RawProject>,
    hosting_properties: Vec<RawHostingProperty>,
    failure: Option<String>,
}

impl StaticRecordSource {
    pub fn new(
        tickets: Vec<RawTicket>,
        projects: Vec<RawProject>,
        hosting_properties: Vec<RawHostingProperty>,
    ) -> Self {
        Self {
            tickets,
            projects,
            hosting_properties,
            failure: None,
        }
    }

    /// A source whose fetches all fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_tickets(mut self, tickets: Vec<RawTicket>) -> Self {
        self.tickets = tickets;
        self
    }

    pub fn with_projects(mut self, projects: Vec<RawProject>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_hosting_properties(mut self, hosting_properties: Vec<RawHostingProperty>) -> Self {
        self.hosting_properties = hosting_properties;
        self
    }

    fn serve<T: Clone>(&self, source_name: &str, records: &[T]) -> AppResult<Vec<T>> {
        match &self.failure {
            Some(message) => Err(AppError::fetch(source_name, message)),
            None => Ok(records.to_vec()),
        }
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_tickets(&self) -> AppResult<Vec<RawTicket>> {
        self.serve("tickets", &self.tickets)
    }

    async fn fetch_projects(&self) -> AppResult<Vec<RawProject>> {
        self.serve("projects", &self.projects)
    }

    async fn fetch_hosting_properties(&self) -> AppResult<Vec<RawHostingProperty>> {
        self.serve("hosting properties", &self.hosting_properties)
    }
}
