//! Knowledge base of known issue signatures and remediations
//!
//! Loaded once at startup from a JSON file and never mutated afterwards, so
//! it is safe to share behind an `Arc` across request handlers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single known-issue record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseEntry {
    /// Unique identifier, e.g. "ISSUE-001"
    pub id: String,
    /// Short human-readable label
    pub title: String,
    /// Classification bucket
    pub category: String,
    /// Symptom phrases; presence of any phrase in ticket text counts as one
    /// point toward this entry's match score
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Remediation suggestion
    pub recommended_action: String,
}

/// In-memory index over the loaded knowledge base.
///
/// Entry order is file order; the keyword matcher's tie-break depends on it.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeBaseEntry>,
}

impl KnowledgeBase {
    /// Load the knowledge base from a JSON file.
    ///
    /// A missing or corrupt file degrades to an empty knowledge base rather
    /// than terminating the process; KB-dependent features become no-ops.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Vec<KnowledgeBaseEntry>>(&contents) {
                Ok(entries) => {
                    tracing::info!(path = %path.display(), count = entries.len(), "Loaded knowledge base");
                    Self { entries }
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to parse knowledge base, continuing with empty set");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read knowledge base, continuing with empty set");
                Self::default()
            }
        }
    }

    pub fn from_entries(entries: Vec<KnowledgeBaseEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[KnowledgeBaseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id, case-insensitive and trimmed
    pub fn find_by_id(&self, id: &str) -> Option<&KnowledgeBaseEntry> {
        let normalized = id.trim();
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.id.trim().eq_ignore_ascii_case(normalized))
    }

    /// Find the best-matching entry by counting symptom phrases present in
    /// the ticket text (case-insensitive substring match).
    ///
    /// The strictly highest score wins; ties keep the first-seen entry in
    /// load order. A score of zero yields no match.
    pub fn best_match(&self, text: &str) -> Option<&KnowledgeBaseEntry> {
        let text = text.to_lowercase();
        let mut best: Option<&KnowledgeBaseEntry> = None;
        let mut best_score = 0usize;

        for entry in &self.entries {
            let score = entry
                .symptoms
                .iter()
                .filter(|symptom| text.contains(&symptom.to_lowercase()))
                .count();

            if score > best_score {
                best = Some(entry);
                best_score = score;
            }
        }

        if let Some(entry) = best {
            tracing::debug!(id = %entry.id, score = best_score, "Knowledge base match found");
        }

        best
    }
}
