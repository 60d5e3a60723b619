//! Ticket classification pipeline
//!
//! Merges the language-model extraction with keyword matching and severity
//! heuristics into a single result whose display fields are guaranteed
//! non-empty, then hands the result to the ticket store. Classification
//! never fails: every external signal has a local fallback.

use std::sync::Arc;

use crate::model::kb::{KnowledgeBase, KnowledgeBaseEntry};
use crate::model::{AnalysisSource, ClassificationResult, LlmExtraction, Severity};
use crate::service::llm::{LlmClient, LlmError};
use crate::store::TicketStore;

const DEFAULT_CLIENT_ID: &str = "unknown-client";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_NEXT_STEP: &str = "Investigate and escalate to support.";

/// Maximum length of the truncated-text summary fallback
const SUMMARY_TRUNCATION: usize = 80;

/// Classification service wiring the model gateway, knowledge base, and
/// ticket store together
pub struct TriageService {
    kb: Arc<KnowledgeBase>,
    llm: LlmClient,
    store: TicketStore,
}

impl TriageService {
    pub fn new(kb: Arc<KnowledgeBase>, llm: LlmClient, store: TicketStore) -> Self {
        Self { kb, llm, store }
    }

    pub fn kb_len(&self) -> usize {
        self.kb.len()
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.is_enabled()
    }

    pub fn primary_store_enabled(&self) -> bool {
        self.store.primary_enabled()
    }

    /// Classify a ticket and persist the result.
    ///
    /// Model errors collapse to an empty extraction, and persistence errors
    /// are logged and swallowed: the caller always receives a complete
    /// classification.
    pub async fn classify(&self, text: &str, client_id: Option<&str>) -> ClassificationResult {
        let extraction = match self.llm.classify_ticket(text, &self.kb).await {
            Ok(extraction) => extraction,
            Err(LlmError::Disabled) => {
                tracing::debug!("Model classification disabled, using heuristics");
                LlmExtraction::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Model classification failed, continuing on heuristics");
                LlmExtraction::default()
            }
        };

        let result = build_result(&self.kb, text, client_id, extraction);

        if let Err(e) = self.store.persist(text, &result).await {
            tracing::error!(error = %e, "Failed to persist ticket classification");
        }

        result
    }
}

/// Merge the model extraction with knowledge-base and heuristic signals.
///
/// Pure with respect to its inputs, so the priority rules are testable
/// without network or storage.
pub(crate) fn build_result(
    kb: &KnowledgeBase,
    text: &str,
    client_id: Option<&str>,
    extraction: LlmExtraction,
) -> ClassificationResult {
    let kb_entry = resolve_kb_entry(kb, &extraction, text);

    let corrected_summary = extraction.summary.as_deref().and_then(correct_summary);

    // Display summary: corrected model summary, else KB title, else the
    // leading slice of the ticket itself
    let summary = corrected_summary
        .clone()
        .or_else(|| kb_entry.map(|e| e.title.clone()))
        .unwrap_or_else(|| text.chars().take(SUMMARY_TRUNCATION).collect());

    let category = non_blank(extraction.category.as_deref())
        .map(str::to_string)
        .or_else(|| kb_entry.map(|e| e.category.clone()))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let severity = extraction
        .severity
        .as_deref()
        .and_then(Severity::normalize)
        .unwrap_or_else(|| Severity::infer(text));

    let next_step = non_blank(extraction.next_step.as_deref())
        .map(str::to_string)
        .or_else(|| kb_entry.map(|e| e.recommended_action.clone()))
        .unwrap_or_else(|| DEFAULT_NEXT_STEP.to_string());

    let kb_match = kb_entry.map(|e| e.id.clone());

    let analysis_source = match (!extraction.is_empty(), kb_match.is_some()) {
        (true, true) => AnalysisSource::LlmAndKb,
        (true, false) => AnalysisSource::Llm,
        (false, _) => AnalysisSource::Heuristics,
    };

    ClassificationResult {
        client_id: non_blank(client_id)
            .unwrap_or(DEFAULT_CLIENT_ID)
            .to_string(),
        summary,
        full_summary: corrected_summary,
        full_text: text.to_string(),
        category,
        severity,
        kb_match,
        next_step,
        analysis_source,
        llm_raw: extraction,
    }
}

/// Resolve the knowledge-base entry: the model's id takes precedence, and an
/// absent or unresolvable id (including the NEW_ISSUE sentinel, which matches
/// no entry) silently falls through to symptom matching.
fn resolve_kb_entry<'a>(
    kb: &'a KnowledgeBase,
    extraction: &LlmExtraction,
    text: &str,
) -> Option<&'a KnowledgeBaseEntry> {
    extraction
        .kb_issue_id
        .as_deref()
        .and_then(|id| kb.find_by_id(id))
        .or_else(|| kb.best_match(text))
}

/// Whitespace-normalize a model summary: collapse runs of whitespace and
/// trim. Empty after cleanup counts as absent.
fn correct_summary(summary: &str) -> Option<String> {
    let cleaned = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
