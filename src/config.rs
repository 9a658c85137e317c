use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Environment variables checked for the Gemini credential, in order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub format: Option<String>,
    pub color: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/viralclip/config.toml if it exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        if !path.exists() {
            debug!("No config file found at {}", path.display());
            return Ok(Config::default());
        }

        debug!("Loading config from {}", path.display());
        let unreadable = |reason: String| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(&path).map_err(|e| unreadable(e.to_string()))?;
        toml::from_str(&content).map_err(|e| unreadable(e.to_string()))
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("viralclip")
        .join("config.toml")
}

/// Everything needed to talk to the AI service, checked once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl Settings {
    /// Merge the config file with a CLI model override and read the credential
    /// from the process environment.
    pub fn resolve(config: &Config, model_override: Option<&str>) -> Result<Self, ConfigError> {
        Self::resolve_with(config, model_override, |name| std::env::var(name).ok())
    }

    fn resolve_with<F>(config: &Config, model_override: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|&name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = model_override
            .map(str::to_string)
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Settings { api_key, model, api_base })
    }
}
