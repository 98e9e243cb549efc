use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, LinguaError};

/// Environment variables consulted, in order, when no API key is configured
pub const API_KEY_ENV_VARS: [&str; 2] = ["LINGUA_API_KEY", "GEMINI_API_KEY"];

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_pending() -> usize {
    1_000
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the generative language API
    pub endpoint: String,
    /// Model used for translation
    pub model: String,
    /// API credential; falls back to the environment when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature sent with every request
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// HTTP timeout; requests wait indefinitely when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum in-memory entries before the oldest insertion is evicted (0 = unbounded)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum pending translations before the oldest is dropped (0 = unbounded)
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the record store, the cache blob and logs
    pub data_dir: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: default_max_pending(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".lingua"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LinguaError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| LinguaError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LinguaError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| LinguaError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.provider.endpoint.trim().is_empty() {
            return Err(LinguaError::Config("provider.endpoint must not be empty".to_string()));
        }
        if self.provider.model.trim().is_empty() {
            return Err(LinguaError::Config("provider.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(LinguaError::Config(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        Ok(())
    }

    /// Configured API key, or the first non-empty key found in the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.provider
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|key| !key.trim().is_empty())
            })
    }

    pub fn record_store_path(&self) -> PathBuf {
        self.storage.data_dir.join("translations.json")
    }

    pub fn key_value_dir(&self) -> PathBuf {
        self.storage.data_dir.join("kv")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.storage.data_dir.join("log")
    }
}
