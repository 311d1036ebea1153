use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::openrouter::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::error::{ChatError, Result};

/// Environment variables checked for the API key, in order, before the config file
pub const API_KEY_ENV_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "OPENAI_API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    /// Request timeout; no timeout when unset
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Falls back to defaults when no file exists
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        serde_json::from_str(&config_content)
            .map_err(|e| ChatError::config(format!("invalid config at {}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)
            .map_err(|e| ChatError::config(e.to_string()))?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment variables win over the key stored in the file
    pub fn apply_env_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|key| !key.trim().is_empty());

        if let Some(key) = from_env {
            self.api_key = Some(key.trim().to_string());
        }
    }

    /// Update a single setting by name, as used by `config set`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api_key" => self.api_key = Some(value.to_string()),
            "model" => self.model = Some(value.to_string()),
            "endpoint" => self.endpoint = Some(value.to_string()),
            "timeout_secs" => {
                let secs = value
                    .parse()
                    .map_err(|_| ChatError::config(format!("timeout_secs must be a number, got '{}'", value)))?;
                self.timeout_secs = Some(secs);
            }
            other => return Err(ChatError::config(format!("unknown config key '{}'", other))),
        }
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            None | Some("") => "(not set)".to_string(),
            Some(key) => {
                let len = key.chars().count();
                if len <= 4 {
                    "*".repeat(len)
                } else {
                    let last_four: String = key.chars().skip(len - 4).collect();
                    format!("{}...{}", "*".repeat((len - 4).min(20)), last_four)
                }
            }
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::config("Could not determine config directory"))?;

        Ok(config_dir.join("chatbot").join("config.json"))
    }
}
