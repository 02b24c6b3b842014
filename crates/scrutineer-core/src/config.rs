//! Configuration management for Scrutineer
//!
//! Loaded from `scrutineer.toml` (path configurable from the CLI), then
//! overridden by `SCRUTINEER_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::llm::{GeminiConfig, ModelResult};
use crate::rules::{RuleResult, RuleStore};

/// Default config file name.
pub const CONFIG_FILE: &str = "scrutineer.toml";

/// Errors raised while loading or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level Scrutineer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrutineerConfig {
    /// Language model selection
    #[serde(default)]
    pub model: ModelSettings,

    /// Session and memory storage
    #[serde(default)]
    pub storage: StorageSettings,

    /// Workflow behaviour
    #[serde(default)]
    pub workflow: WorkflowSettings,

    /// Rule set source
    #[serde(default)]
    pub rules: RulesSettings,
}

/// Model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model name
    #[serde(default = "default_model")]
    pub name: String,

    /// REST base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable containing API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding `sessions/` (and the default memory database)
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// SurrealDB URL for long-term memory; defaults to `surrealkv://<state_dir>/memory`
    #[serde(default)]
    pub memory_url: Option<String>,

    /// Whether to write long-term memory at all
    #[serde(default = "default_true")]
    pub memory_enabled: bool,
}

/// Workflow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Re-check suggested replacements before asking for confirmation
    #[serde(default)]
    pub revalidate_alternatives: bool,

    /// Session used when the CLI is not given one
    #[serde(default = "default_session")]
    pub default_session: String,
}

/// Rule set configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesSettings {
    /// JSON rules file; the built-in FSUK 2026 digest when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// Default value providers
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".scrutineer")
}

fn default_true() -> bool {
    true
}

fn default_session() -> String {
    "default".to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            memory_url: None,
            memory_enabled: default_true(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            revalidate_alternatives: false,
            default_session: default_session(),
        }
    }
}

impl ScrutineerConfig {
    /// Load configuration from `path` or use defaults if it does not exist
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Write default configuration to `path`
    pub fn write_default(path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(&Self::default())?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `SCRUTINEER_MODEL`, `SCRUTINEER_STATE_DIR` and `SCRUTINEER_MEMORY_URL`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(model) = lookup("SCRUTINEER_MODEL") {
            self.model.name = model;
        }
        if let Some(dir) = lookup("SCRUTINEER_STATE_DIR") {
            self.storage.state_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("SCRUTINEER_MEMORY_URL") {
            self.storage.memory_url = Some(url);
        }
    }

    /// Effective SurrealDB URL for long-term memory.
    pub fn memory_url(&self) -> String {
        match &self.storage.memory_url {
            Some(url) => url.clone(),
            None => format!(
                "surrealkv://{}",
                self.storage.state_dir.join("memory").display()
            ),
        }
    }

    /// Rule store from the configured file, or the built-in digest.
    pub fn load_rules(&self) -> RuleResult<RuleStore> {
        match &self.rules.path {
            Some(path) => RuleStore::from_json_file(path),
            None => Ok(RuleStore::builtin()),
        }
    }

    /// Gemini settings, reading the API key from `model.api_key_env`.
    pub fn gemini_config(&self) -> ModelResult<GeminiConfig> {
        Ok(GeminiConfig::from_env(&self.model.api_key_env)?
            .with_model(&self.model.name)
            .with_api_base(&self.model.api_base)
            .with_temperature(self.model.temperature)
            .with_timeout(Duration::from_secs(self.model.timeout_secs)))
    }
}
