//! Language-model gateway for ticket classification
//!
//! Sends the ticket plus knowledge-base context to an OpenAI-compatible
//! chat-completions endpoint and parses the JSON reply. The merger flattens
//! every error to an empty extraction, so a failing or unconfigured model
//! never blocks classification.

pub mod prompts;
pub mod repair;

use serde::Deserialize;

use crate::model::{KnowledgeBase, LlmConfig, LlmExtraction};

/// Low temperature favoring deterministic, literal output
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured; permanent soft-degradation, not a failure
    #[error("no API key configured, model classification disabled")]
    Disabled,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("reply contained no choices")]
    MissingContent,

    #[error("reply content could not be parsed as a JSON object")]
    UnparsableContent,
}

/// Chat-completions reply envelope; only the content path is read
#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for the remote classification endpoint
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        if config.api_key.is_none() {
            tracing::warn!("No model API key configured, running on heuristics only");
        } else {
            tracing::info!(model = %config.model, "Model classification enabled");
        }

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Classify a ticket against the knowledge base.
    ///
    /// A single attempt is made; any failure is returned as an error for the
    /// caller to flatten. Never retries.
    pub async fn classify_ticket(
        &self,
        text: &str,
        kb: &KnowledgeBase,
    ) -> Result<LlmExtraction, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::Disabled)?;
        let start = std::time::Instant::now();

        let body = serde_json::json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "messages": [
                {"role": "system", "content": prompts::SYSTEM_PROMPT},
                {"role": "user", "content": prompts::build_user_prompt(text, kb)},
            ],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Chat completion request rejected");
            return Err(LlmError::Status { status, body });
        }

        let reply: ChatCompletionReply = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                tracing::error!("Chat completion reply missing choices");
                LlmError::MissingContent
            })?;

        let parsed =
            repair::parse_object_with_repair(content.trim()).ok_or(LlmError::UnparsableContent)?;

        tracing::info!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model reply parsed"
        );

        Ok(LlmExtraction::from_reply(&parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn disabled_config() -> LlmConfig {
        LlmConfig {
            api_key: None,
            model: "llama-3.1-8b-instant".to_string(),
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    #[test]
    fn test_client_without_key_is_disabled() {
        let client = LlmClient::new(&disabled_config()).expect("client");
        assert!(!client.is_enabled());
    }

    /// A disabled client fails fast without touching the network
    #[tokio::test]
    async fn test_disabled_client_returns_disabled_error() {
        let client = LlmClient::new(&disabled_config()).expect("client");
        let kb = KnowledgeBase::default();
        let result = client.classify_ticket("anything", &kb).await;
        assert!(matches!(result, Err(LlmError::Disabled)));
    }

    #[test]
    fn test_reply_envelope_tolerates_extra_fields() {
        let reply: ChatCompletionReply = serde_json::from_str(
            r#"{"id": "cmpl-1", "object": "chat.completion",
                "choices": [{"index": 0, "finish_reason": "stop",
                             "message": {"role": "assistant", "content": "{}"}}]}"#,
        )
        .expect("deserialize");
        assert_eq!(reply.choices.len(), 1);
        assert_eq!(reply.choices[0].message.content, "{}");
    }
}
