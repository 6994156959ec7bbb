use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::providers::ProviderId;
use crate::services::StudentProfile;

/// Client configuration: the two provider API keys plus defaults. Loaded
/// from `$XDG_CONFIG_HOME/anusarth/config.json`, with the keys
/// overridable through `ANUSARTH_OPENROUTER_API_KEY` and
/// `ANUSARTH_GOOGLE_AI_API_KEY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openrouter_api_key: Option<String>,
    #[serde(default)]
    pub google_ai_api_key: Option<String>,
    #[serde(default)]
    pub provider: Option<ProviderId>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub student: Option<StudentProfile>,
}

impl Config {
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(Self::config_path()) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file, using defaults: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        if let Ok(key) = std::env::var("ANUSARTH_OPENROUTER_API_KEY") {
            config.openrouter_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("ANUSARTH_GOOGLE_AI_API_KEY") {
            config.google_ai_api_key = Some(key);
        }

        config
    }

    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".config")
            });
        config_dir.join("anusarth").join("config.json")
    }

    /// The configured key for `provider`, empty when unset.
    pub fn api_key_for(&self, provider: ProviderId) -> String {
        match provider {
            ProviderId::OpenRouter => self.openrouter_api_key.clone(),
            ProviderId::GoogleAi => self.google_ai_api_key.clone(),
        }
        .unwrap_or_default()
    }
}
