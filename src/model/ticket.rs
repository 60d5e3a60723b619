//! Ticket classification domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::severity::Severity;

/// Provenance tag describing which signal paths contributed to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AnalysisSource {
    /// Model reply plus a resolved knowledge-base entry
    #[serde(rename = "LLM+KB")]
    LlmAndKb,
    /// Model reply only
    #[serde(rename = "LLM")]
    Llm,
    /// Keyword matching and severity inference only
    #[serde(rename = "Heuristics")]
    Heuristics,
}

/// Raw fields extracted from the language-model reply.
///
/// All fields are optional; a failed or disabled call yields the empty
/// default, which is distinguishable from a successful call that returned
/// sparse fields via [`LlmExtraction::is_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LlmExtraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_issue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_issue_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}

impl LlmExtraction {
    /// Build an extraction from a parsed model reply, taking only fields
    /// that are present as strings. Wrong-typed fields are treated as absent
    /// rather than failing the whole reply.
    pub fn from_reply(value: &Value) -> Self {
        Self {
            summary: string_field(value, "summary"),
            category: string_field(value, "category"),
            severity: string_field(value, "severity"),
            kb_issue_id: string_field(value, "kb_issue_id"),
            kb_issue_title: string_field(value, "kb_issue_title"),
            next_step: string_field(value, "next_step"),
        }
    }

    /// True when no field carries a value, i.e. the call failed, was
    /// disabled, or the reply was unusable
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.category.is_none()
            && self.severity.is_none()
            && self.kb_issue_id.is_none()
            && self.kb_issue_title.is_none()
            && self.next_step.is_none()
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// The final triage artifact, immutable once built.
///
/// `category`, `severity`, `next_step` and `summary` are guaranteed
/// non-empty by the classification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassificationResult {
    /// Caller-supplied client identifier, or a fixed placeholder
    pub client_id: String,
    /// Short display string
    pub summary: String,
    /// Corrected model summary when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_summary: Option<String>,
    /// Verbatim input ticket text
    pub full_text: String,
    pub category: String,
    pub severity: Severity,
    /// Id of the matched knowledge-base entry, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_match: Option<String>,
    pub next_step: String,
    pub analysis_source: AnalysisSource,
    /// Raw (possibly empty) model extraction, preserved for audit
    pub llm_raw: LlmExtraction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_reply_picks_string_fields() {
        let reply = json!({
            "summary": "Checkout is broken",
            "category": "Payment",
            "severity": "High",
            "kb_issue_id": "ISSUE-001",
            "kb_issue_title": "Payment processing failure",
            "next_step": "Check payment gateway status"
        });
        let extraction = LlmExtraction::from_reply(&reply);
        assert_eq!(extraction.summary.as_deref(), Some("Checkout is broken"));
        assert_eq!(extraction.kb_issue_id.as_deref(), Some("ISSUE-001"));
        assert!(!extraction.is_empty());
    }

    #[test]
    fn test_from_reply_ignores_wrong_typed_fields() {
        let reply = json!({
            "summary": "Checkout is broken",
            "severity": 3,
            "kb_issue_id": null
        });
        let extraction = LlmExtraction::from_reply(&reply);
        assert_eq!(extraction.summary.as_deref(), Some("Checkout is broken"));
        assert!(extraction.severity.is_none());
        assert!(extraction.kb_issue_id.is_none());
    }

    #[test]
    fn test_empty_reply_is_empty_extraction() {
        let extraction = LlmExtraction::from_reply(&json!({}));
        assert!(extraction.is_empty());
        assert_eq!(extraction, LlmExtraction::default());
    }

    #[test]
    fn test_analysis_source_wire_format() {
        assert_eq!(
            serde_json::to_value(AnalysisSource::LlmAndKb).expect("serialize"),
            json!("LLM+KB")
        );
        assert_eq!(
            serde_json::to_value(AnalysisSource::Heuristics).expect("serialize"),
            json!("Heuristics")
        );
    }
}
