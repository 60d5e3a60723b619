//! Severity levels and the keyword fallback used when no other signal exists

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Keywords indicating an outage or hard failure
const HIGH_SEVERITY_MARKERS: &[&str] = &[
    "crash",
    "down",
    "failed",
    "cannot",
    "error",
    "not working",
    "system is unavailable",
];

/// Keywords indicating a low-urgency ticket
const LOW_SEVERITY_MARKERS: &[&str] = &["slow", "request", "question"];

/// Canonical severity buckets, used both for display and for store grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Normalize a free-text severity to a canonical level.
    ///
    /// Known synonyms map to their level; any non-empty unrecognized value
    /// maps to `Medium` rather than being rejected. Empty input yields `None`
    /// so callers can fall back to [`Severity::infer`].
    pub fn normalize(value: &str) -> Option<Severity> {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return None;
        }

        match value.as_str() {
            "critical" | "blocker" => Some(Severity::Critical),
            "urgent" | "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => Some(Severity::Medium),
        }
    }

    /// Infer severity from ticket text. Pure fallback, invoked only when
    /// neither the model reply nor normalization produced a value.
    pub fn infer(text: &str) -> Severity {
        let lower = text.to_lowercase();

        if HIGH_SEVERITY_MARKERS.iter().any(|m| lower.contains(m)) {
            return Severity::High;
        }

        if LOW_SEVERITY_MARKERS.iter().any(|m| lower.contains(m)) {
            return Severity::Low;
        }

        Severity::Medium
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
