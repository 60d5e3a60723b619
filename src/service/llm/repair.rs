//! Tolerant JSON parsing for model output
//!
//! Text generators drift on formatting: single quotes, embedded newlines,
//! trailing commas. Strict parsing is attempted first; on failure a single
//! repair pass normalizes those patterns and parsing is retried once.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn trailing_object_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\}").unwrap())
}

fn trailing_array_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\]").unwrap())
}

/// Parse model output as a JSON object, repairing common formatting drift.
///
/// Returns `None` when the text cannot be parsed as a JSON object even after
/// the repair pass.
pub fn parse_object_with_repair(raw: &str) -> Option<Value> {
    if let Some(value) = parse_object(raw) {
        return Some(value);
    }

    let repaired = repair(raw);
    match parse_object(&repaired) {
        Some(value) => {
            tracing::debug!("Model JSON parsed after repair pass");
            Some(value)
        }
        None => {
            tracing::error!(raw_output = %raw, "Failed to repair and parse model JSON");
            None
        }
    }
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

fn repair(raw: &str) -> String {
    let cleaned = raw.replace('\'', "\"").replace('\n', " ");
    let cleaned = trailing_object_comma().replace_all(&cleaned, "}");
    trailing_array_comma()
        .replace_all(&cleaned, "]")
        .into_owned()
}
