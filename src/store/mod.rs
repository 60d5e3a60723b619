//! Ticket persistence with a primary document store and a local append-only
//! fallback
//!
//! The fallback chain is the only place a storage error may propagate from:
//! primary failure falls back to the local file, and only when both paths are
//! unavailable (or fallback is disabled by configuration) does `persist`
//! return an error. The classification pipeline logs and swallows even that.

pub mod firestore;
pub mod local;

use chrono::Utc;
use serde_json::{json, Value};

use crate::model::{ClassificationResult, StoreConfig};

use firestore::FirestoreStore;
use local::LocalFallback;

/// Issue bucket grouping all tickets without a knowledge-base match
pub const CATCH_ALL_ISSUE_ID: &str = "NEW_ISSUES";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local fallback write failed: {0}")]
    Fallback(#[from] std::io::Error),

    #[error("primary store failed and local fallback is disabled")]
    FallbackDisabled,
}

/// Which path accepted the write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Primary,
    LocalFallback,
}

/// Persistence gateway owning the primary store and the fallback writer
pub struct TicketStore {
    primary: Option<FirestoreStore>,
    fallback: Option<LocalFallback>,
}

impl TicketStore {
    /// Build the store from configuration.
    ///
    /// Missing or invalid credentials disable the primary path for the
    /// process lifetime; writes then go straight to the local fallback.
    pub fn new(config: &StoreConfig) -> Self {
        let primary = match FirestoreStore::from_credentials_file(&config.credentials_path) {
            Ok(store) => {
                tracing::info!(path = %config.credentials_path.display(), "Primary document store enabled");
                Some(store)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Primary document store disabled, using local fallback only");
                None
            }
        };

        let fallback = if config.allow_local_fallback {
            Some(LocalFallback::new(config.local_fallback_path.clone()))
        } else {
            tracing::info!("Local fallback disabled by configuration");
            None
        };

        Self { primary, fallback }
    }

    pub fn primary_enabled(&self) -> bool {
        self.primary.is_some()
    }

    /// Persist a classified ticket, trying the primary store first and the
    /// local fallback second. A single attempt per path, no retries.
    pub async fn persist(
        &self,
        ticket_text: &str,
        result: &ClassificationResult,
    ) -> Result<PersistOutcome, StoreError> {
        let payload = build_payload(ticket_text, result);

        if let Some(primary) = &self.primary {
            match primary.save_ticket(result, &payload).await {
                Ok(()) => return Ok(PersistOutcome::Primary),
                Err(e) => {
                    tracing::warn!(error = %e, "Primary store write failed, trying local fallback");
                }
            }
        }

        match &self.fallback {
            Some(fallback) => {
                fallback.append(&payload).await?;
                tracing::info!(path = %fallback.path().display(), "Ticket stored in local fallback");
                Ok(PersistOutcome::LocalFallback)
            }
            None => Err(StoreError::FallbackDisabled),
        }
    }
}

/// Build the full persisted payload: the classification plus the verbatim
/// ticket and a creation timestamp assigned at write time
fn build_payload(ticket_text: &str, result: &ClassificationResult) -> Value {
    let mut payload = serde_json::to_value(result).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut payload {
        map.insert("ticket".to_string(), json!(ticket_text));
        map.insert("created_at".to_string(), json!(Utc::now().to_rfc3339()));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisSource, LlmExtraction, Severity};

    fn sample_result() -> ClassificationResult {
        ClassificationResult {
            client_id: "client-7".to_string(),
            summary: "Payment processing failure".to_string(),
            full_summary: None,
            full_text: "Payment failed with error 500".to_string(),
            category: "Payment".to_string(),
            severity: Severity::High,
            kb_match: Some("ISSUE-001".to_string()),
            next_step: "Check payment gateway status".to_string(),
            analysis_source: AnalysisSource::Heuristics,
            llm_raw: LlmExtraction::default(),
        }
    }

    fn store_config(dir: &std::path::Path, allow_fallback: bool) -> StoreConfig {
        StoreConfig {
            // No credentials file at this path, so the primary store is
            // disabled and writes exercise the fallback chain
            credentials_path: dir.join("missing_key.json"),
            allow_local_fallback: allow_fallback,
            local_fallback_path: dir.join("ticket_results.jsonl"),
        }
    }

    #[test]
    fn test_payload_carries_ticket_and_created_at() {
        let payload = build_payload("Payment failed with error 500", &sample_result());
        assert_eq!(payload["ticket"], json!("Payment failed with error 500"));
        assert_eq!(payload["client_id"], json!("client-7"));
        assert_eq!(payload["severity"], json!("High"));
        assert!(payload["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_exactly_one_local_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = store_config(dir.path(), true);
        let store = TicketStore::new(&config);
        assert!(!store.primary_enabled());

        let outcome = store
            .persist("Payment failed with error 500", &sample_result())
            .await
            .expect("persist");
        assert_eq!(outcome, PersistOutcome::LocalFallback);

        let contents =
            std::fs::read_to_string(&config.local_fallback_path).expect("fallback file");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let payload: Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(payload["ticket"], json!("Payment failed with error 500"));
        assert!(payload["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_disabled_fallback_surfaces_fatal_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TicketStore::new(&store_config(dir.path(), false));

        let result = store.persist("anything", &sample_result()).await;
        assert!(matches!(result, Err(StoreError::FallbackDisabled)));
    }
}
