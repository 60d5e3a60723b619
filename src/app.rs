//! Application state and service initialization
//!
//! Centralizes dependency injection: the knowledge base, model client, and
//! ticket store are constructed once here and handed to the triage service,
//! with no process-wide mutable state.

use std::sync::Arc;

use crate::model::{Config, KnowledgeBase};
use crate::service::{LlmClient, TriageService};
use crate::store::TicketStore;

/// Application state containing the fully wired triage service
pub struct AppState {
    pub triage_service: TriageService,
}

impl AppState {
    /// Initialize all services and build application state.
    ///
    /// Missing knowledge base, model key, or store credentials all degrade
    /// the corresponding component rather than failing startup; only an
    /// unbuildable HTTP client is fatal.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let kb = Arc::new(KnowledgeBase::load(&config.kb_path));

        let llm_client =
            LlmClient::new(&config.llm).map_err(|e| AppError::LlmInit(e.to_string()))?;

        let store = TicketStore::new(&config.store);

        let triage_service = TriageService::new(kb, llm_client, store);

        Ok(Self { triage_service })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Model client initialization failed
    #[error("Model client initialization failed: {0}")]
    LlmInit(String),
}
