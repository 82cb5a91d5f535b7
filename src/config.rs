use serde::Deserialize;
use std::path::PathBuf;

use crate::storage::CREDENTIAL_KEY;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation service
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// File holding the persisted bearer credential
    #[serde(default)]
    pub credential_path: Option<PathBuf>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            credential_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Configured credential file, or `access_token` under the platform data directory
    pub fn credential_path(&self) -> PathBuf {
        self.credential_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("screenpick")
                .join(CREDENTIAL_KEY)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.credential_path().ends_with("screenpick/access_token"));
    }

    #[test]
    fn test_explicit_values() {
        let config: Config = envy::from_iter(vec![
            ("API_URL".to_string(), "https://recs.example.com".to_string()),
            ("CREDENTIAL_PATH".to_string(), "/tmp/token".to_string()),
            ("REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://recs.example.com");
        assert_eq!(config.credential_path(), PathBuf::from("/tmp/token"));
        assert_eq!(config.request_timeout_secs, 5);
    }
}
