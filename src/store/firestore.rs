//! Minimal Firestore REST client for the primary ticket store
//!
//! Tickets are grouped under `tickets/{issue_id}` parent documents, each
//! owning per-severity subcollections of individual ticket records. Issue
//! metadata is merged via `updateMask` so repeated tickets for the same
//! issue update the parent in place.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::model::ClassificationResult;

use super::CATCH_ALL_ISSUE_ID;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const ISSUE_COLLECTION: &str = "tickets";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Severity subcollection names; anything else groups as Medium
const SEVERITY_BUCKETS: &[&str] = &["Low", "Medium", "High", "Critical"];
const DEFAULT_BUCKET: &str = "Medium";

#[derive(Debug, thiserror::Error)]
pub enum FirestoreError {
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("firestore returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Credentials file contents: project id plus a pre-issued access token
#[derive(Debug, Deserialize)]
struct Credentials {
    project_id: String,
    access_token: String,
}

pub struct FirestoreStore {
    http: reqwest::Client,
    project_id: String,
    access_token: String,
}

impl FirestoreStore {
    /// Build a store from a credentials file. Any problem reading or parsing
    /// the file is reported as [`FirestoreError::Credentials`]; the caller
    /// treats that as "primary store disabled", not a fatal error.
    pub fn from_credentials_file(path: &Path) -> Result<Self, FirestoreError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| FirestoreError::Credentials(format!("{}: {}", path.display(), e)))?;
        let credentials: Credentials = serde_json::from_str(&raw)
            .map_err(|e| FirestoreError::Credentials(format!("{}: {}", path.display(), e)))?;

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            project_id: credentials.project_id,
            access_token: credentials.access_token,
        })
    }

    /// Persist one classified ticket: upsert the parent issue document, then
    /// create the ticket record in its severity subcollection
    pub async fn save_ticket(
        &self,
        result: &ClassificationResult,
        payload: &Value,
    ) -> Result<(), FirestoreError> {
        let issue_id = result.kb_match.as_deref().unwrap_or(CATCH_ALL_ISSUE_ID);

        self.upsert_issue_metadata(issue_id, result).await?;
        self.append_ticket(issue_id, payload).await?;

        tracing::debug!(issue_id = %issue_id, "Ticket stored in primary document store");
        Ok(())
    }

    async fn upsert_issue_metadata(
        &self,
        issue_id: &str,
        result: &ClassificationResult,
    ) -> Result<(), FirestoreError> {
        let source = if result.kb_match.is_some() {
            "knowledge_base"
        } else {
            "auto_generated"
        };

        let metadata = json!({
            "issue_id": issue_id,
            "title": result.summary,
            "category": result.category,
            "recommended_action": result.next_step,
            "source": source,
            "updated_at": Utc::now().to_rfc3339(),
        });

        // updateMask limits the patch to the metadata fields, merging into
        // any existing document instead of replacing it
        let mask = [
            "issue_id",
            "title",
            "category",
            "recommended_action",
            "source",
            "updated_at",
        ]
        .iter()
        .map(|f| format!("updateMask.fieldPaths={}", f))
        .collect::<Vec<_>>()
        .join("&");

        let url = format!(
            "{}?{}",
            self.document_url(&format!("{}/{}", ISSUE_COLLECTION, issue_id)),
            mask
        );

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "fields": encode_fields(&metadata) }))
            .send()
            .await?;

        check_status(response.status())
    }

    async fn append_ticket(&self, issue_id: &str, payload: &Value) -> Result<(), FirestoreError> {
        let bucket = severity_bucket(payload.get("severity").and_then(Value::as_str));
        let url = self.document_url(&format!("{}/{}/{}", ISSUE_COLLECTION, issue_id, bucket));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "fields": encode_fields(payload) }))
            .send()
            .await?;

        check_status(response.status())
    }

    fn document_url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            FIRESTORE_BASE, self.project_id, path
        )
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), FirestoreError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FirestoreError::Status(status))
    }
}

/// Canonicalize a severity string to one of the four grouping buckets,
/// defaulting unrecognized or absent values to Medium
pub(super) fn severity_bucket(value: Option<&str>) -> &'static str {
    let Some(value) = value else {
        return DEFAULT_BUCKET;
    };
    let trimmed = value.trim();
    SEVERITY_BUCKETS
        .iter()
        .find(|bucket| bucket.eq_ignore_ascii_case(trimmed))
        .copied()
        .unwrap_or(DEFAULT_BUCKET)
}

/// Encode a JSON object into Firestore's typed field representation
fn encode_fields(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, val)| (key.clone(), encode_value(val)))
            .collect(),
        _ => Map::new(),
    }
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore's wire format carries integers as strings
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_bucket_canonical_values() {
        assert_eq!(severity_bucket(Some("High")), "High");
        assert_eq!(severity_bucket(Some("critical")), "Critical");
        assert_eq!(severity_bucket(Some("  low  ")), "Low");
    }

    #[test]
    fn test_severity_bucket_defaults_to_medium() {
        assert_eq!(severity_bucket(None), "Medium");
        assert_eq!(severity_bucket(Some("")), "Medium");
        assert_eq!(severity_bucket(Some("blocker")), "Medium");
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!("x")), json!({"stringValue": "x"}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&json!(5)), json!({"integerValue": "5"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
        assert_eq!(encode_value(&json!(null)), json!({"nullValue": null}));
    }

    #[test]
    fn test_encode_nested_payload() {
        let payload = json!({
            "ticket": "Payment failed",
            "llm_raw": { "summary": "Checkout broken" },
            "tags": ["a", "b"]
        });
        let fields = encode_fields(&payload);
        assert_eq!(fields["ticket"], json!({"stringValue": "Payment failed"}));
        assert_eq!(
            fields["llm_raw"],
            json!({"mapValue": {"fields": {"summary": {"stringValue": "Checkout broken"}}}})
        );
        assert_eq!(
            fields["tags"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}, {"stringValue": "b"}]}})
        );
    }

    #[test]
    fn test_credentials_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("firebase_key.json");
        std::fs::write(
            &path,
            r#"{"project_id": "triage-test", "access_token": "token-123"}"#,
        )
        .expect("write");

        let store = FirestoreStore::from_credentials_file(&path).expect("store");
        assert!(store.document_url("tickets/ISSUE-001").contains("triage-test"));
    }

    #[test]
    fn test_missing_credentials_file_is_credentials_error() {
        let result = FirestoreStore::from_credentials_file(Path::new("/nonexistent/key.json"));
        assert!(matches!(result, Err(FirestoreError::Credentials(_))));
    }
}
