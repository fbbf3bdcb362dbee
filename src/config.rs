//! Configuration for truthlens.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TRUTHLENS_MODEL, TRUTHLENS_API_BASE)
//! 2. Config file (.truthlens/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .truthlens/config.yaml
//! - Falls back to ~/.truthlens/config.yaml
//!
//! The API key is only ever read from the environment
//! (TRUTHLENS_API_KEY, then GEMINI_API_KEY, then API_KEY).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Environment variables consulted for the API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 3] = ["TRUTHLENS_API_KEY", "GEMINI_API_KEY", "API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Model id, e.g. gemini-3-pro-preview
    pub name: Option<String>,
    /// Base URL of the Gemini REST API
    pub api_base: Option<String>,
    pub temperature: Option<f32>,
    /// Per-request timeout; unset leaves the HTTP client default in place
    pub request_timeout_seconds: Option<u64>,
}

/// Settings that shape every outbound model request
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub request_timeout: Option<Duration>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: None,
        }
    }
}

/// Credential for the model service. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw key, for the transport only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last two characters, for display
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{}****{}", head, tail)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model: ModelSettings,
    /// Absent when no key variable is set (or all are empty)
    pub api_key: Option<ApiKey>,
    /// Which variable the key came from
    pub api_key_source: Option<&'static str>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".truthlens").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let home_config = dirs::home_dir()?.join(".truthlens").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Merge file settings, environment and defaults.
///
/// `env` is injected so resolution can be tested without touching the
/// process environment.
pub fn resolve<F>(file: Option<&ConfigFile>, config_file: Option<PathBuf>, env: F) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ModelSettings::default();
    let file_model = file.map(|f| f.model.clone()).unwrap_or_default();

    let model = env("TRUTHLENS_MODEL")
        .or(file_model.name)
        .unwrap_or(defaults.model);

    let api_base = env("TRUTHLENS_API_BASE")
        .or(file_model.api_base)
        .map(|base| base.trim().trim_end_matches('/').to_string())
        .filter(|base| !base.is_empty())
        .unwrap_or(defaults.api_base);

    let settings = ModelSettings {
        model,
        api_base,
        temperature: file_model.temperature.unwrap_or(defaults.temperature),
        request_timeout: file_model
            .request_timeout_seconds
            .map(Duration::from_secs),
    };

    let (api_key, api_key_source) = API_KEY_ENV_VARS
        .iter()
        .find_map(|name| env(name).map(|value| (ApiKey::new(value), *name)))
        .map_or((None, None), |(key, name)| (Some(key), Some(name)));

    ResolvedConfig {
        model: settings,
        api_key,
        api_key_source,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    Ok(resolve(file.as_ref(), config_file, non_empty_env))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
