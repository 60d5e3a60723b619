//! Application configuration loaded from environment variables and an
//! optional YAML file
//!
//! Missing configuration degrades the corresponding component instead of
//! failing startup: no API key disables model classification, no credentials
//! file disables the primary store.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const ENV_CONFIG_PATH: &str = "TRIAGE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_LLM_API_KEY: &str = "GROQ_API_KEY";
const ENV_LLM_MODEL: &str = "GROQ_MODEL";
const ENV_LLM_ENDPOINT: &str = "TRIAGE_LLM_ENDPOINT";
const ENV_LLM_TIMEOUT_SECS: &str = "TRIAGE_LLM_TIMEOUT_SECS";

const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_LLM_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 15;

const ENV_KB_PATH: &str = "TRIAGE_KB_PATH";
const ENV_CREDENTIALS_PATH: &str = "FIREBASE_CREDENTIALS";
const ENV_ALLOW_LOCAL_FALLBACK: &str = "ALLOW_LOCAL_FALLBACK";
const ENV_FALLBACK_PATH: &str = "TRIAGE_FALLBACK_PATH";

const DEFAULT_KB_PATH: &str = "data/knowledge_base.json";
const DEFAULT_CREDENTIALS_PATH: &str = "firebase_key.json";
const DEFAULT_FALLBACK_PATH: &str = "data/ticket_results.jsonl";

/// Language-model gateway settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Absent key leaves the gateway permanently disabled
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

/// Persistence settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub credentials_path: PathBuf,
    pub allow_local_fallback: bool,
    pub local_fallback_path: PathBuf,
}

/// Optional YAML overrides for file locations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub knowledge_base: Option<PathBuf>,
    #[serde(default)]
    pub credentials: Option<PathBuf>,
    #[serde(default)]
    pub local_fallback: Option<PathBuf>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub kb_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment and the optional config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let overrides = Self::load_config_file(&config_path).unwrap_or_default();

        let llm = LlmConfig {
            api_key: std::env::var(ENV_LLM_API_KEY).ok().filter(|k| !k.is_empty()),
            model: std::env::var(ENV_LLM_MODEL).unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            endpoint: std::env::var(ENV_LLM_ENDPOINT)
                .unwrap_or_else(|_| DEFAULT_LLM_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                std::env::var(ENV_LLM_TIMEOUT_SECS)
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
            ),
        };

        let store = StoreConfig {
            credentials_path: env_path(ENV_CREDENTIALS_PATH)
                .or(overrides.credentials)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            allow_local_fallback: std::env::var(ENV_ALLOW_LOCAL_FALLBACK)
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            local_fallback_path: env_path(ENV_FALLBACK_PATH)
                .or(overrides.local_fallback)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_PATH)),
        };

        let kb_path = env_path(ENV_KB_PATH)
            .or(overrides.knowledge_base)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KB_PATH));

        Self {
            llm,
            store,
            kb_path,
            host,
            port,
        }
    }

    /// Load path overrides from a YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepted_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_config_file_partial_overrides() {
        let parsed: ConfigFile =
            serde_yaml::from_str("knowledge_base: /etc/triage/kb.json\n").expect("parse");
        assert_eq!(
            parsed.knowledge_base,
            Some(PathBuf::from("/etc/triage/kb.json"))
        );
        assert!(parsed.credentials.is_none());
        assert!(parsed.local_fallback.is_none());
    }
}
