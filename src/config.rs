//! Configuration Management
//!
//! Handles persistent configuration storage for oait and folds it, together
//! with environment and CLI overrides, into an explicit [`ClientConfig`].

use crate::error::{OaitError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_ORG_ID: &str = "OPENAI_ORG_ID";
const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API key used when neither the CLI nor the environment provides one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Organization sent as `OpenAI-Organization`
    #[serde(default)]
    pub org_id: Option<String>,
    /// Alternative API root (proxies, test servers)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Cap on in-flight requests per batch; unbounded when absent
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// Values every request needs, passed explicitly to the client.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub org_id: Option<String>,
    pub base_url: Url,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("org_id", &self.org_id)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, org_id: Option<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OaitError::Input(format!(
                "no API key configured. Set {} or use --key",
                ENV_API_KEY
            )));
        }

        Ok(Self {
            api_key,
            org_id: org_id.filter(|o| !o.is_empty()),
            base_url: parse_base_url(base_url)?,
        })
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins keep the path.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized)
        .map_err(|e| OaitError::Input(format!("invalid base URL '{}': {}", raw, e)))
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("oait").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| OaitError::Input(format!("cannot serialize config: {}", e)))?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective API key (CLI > env > config)
    pub fn effective_api_key(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, ENV_API_KEY, self.api_key.as_deref())
    }

    /// Get effective organization (CLI > env > config)
    pub fn effective_org(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, ENV_ORG_ID, self.org_id.as_deref())
    }

    /// Get effective base URL (env > config > default)
    pub fn effective_base_url(&self) -> String {
        pick(None, ENV_BASE_URL, self.base_url.as_deref())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Copy with the API key masked, for display
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        shown.api_key = self.api_key.as_deref().map(mask_key);
        shown
    }

    /// Build the explicit client configuration
    pub fn client_config(
        &self,
        cli_key: Option<&str>,
        cli_org: Option<&str>,
    ) -> Result<ClientConfig> {
        let key = self.effective_api_key(cli_key).unwrap_or_default();
        ClientConfig::new(key, self.effective_org(cli_org), &self.effective_base_url())
    }
}

fn mask_key(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}

fn pick(cli: Option<&str>, env: &str, config: Option<&str>) -> Option<String> {
    cli.filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env).ok().filter(|s| !s.is_empty()))
        .or_else(|| config.filter(|s| !s.is_empty()).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("http://127.0.0.1:8080/v1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/");
        assert_eq!(url.join("threads/abc").unwrap().path(), "/v1/threads/abc");
    }

    #[test]
    fn invalid_base_url_is_input_error() {
        assert!(matches!(parse_base_url("not a url"), Err(OaitError::Input(_))));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = ClientConfig::new("  ", None, DEFAULT_BASE_URL).unwrap_err();
        assert!(matches!(err, OaitError::Input(_)));
    }

    #[test]
    fn cli_value_wins_over_config() {
        let config = Config {
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(
            config.effective_api_key(Some("from-cli")).as_deref(),
            Some("from-cli")
        );
    }

    #[test]
    fn empty_org_is_dropped() {
        let cfg = ClientConfig::new("sk-test", Some(String::new()), DEFAULT_BASE_URL).unwrap();
        assert!(cfg.org_id.is_none());
        assert!(!format!("{:?}", cfg).contains("sk-test"));
    }

    #[test]
    fn redacted_keeps_only_key_tail() {
        let config = Config {
            api_key: Some("sk-secret-1234".into()),
            ..Default::default()
        };
        assert_eq!(config.redacted().api_key.as_deref(), Some("...1234"));
        assert!(Config::default().redacted().api_key.is_none());
    }

    #[test]
    fn config_roundtrips_through_json() {
        let raw = r#"{"org_id":"org-1","max_concurrency":8}"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.org_id.as_deref(), Some("org-1"));
        assert_eq!(config.max_concurrency, Some(8));
        assert!(config.api_key.is_none());
    }
}
