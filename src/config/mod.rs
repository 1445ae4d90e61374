#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::chunker::ChunkerConfig;
use crate::crawler::CrawlerConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub chunking: ChunkerConfig,
    pub provider: ProviderConfig,
    pub search: SearchConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            chunking: ChunkerConfig::default(),
            provider: ProviderConfig::default(),
            search: SearchConfig::default(),
            base_dir: PathBuf::new(),
        }
    }
}

/// Connection settings for the external embedding and answer-generation APIs.
///
/// The API key is never stored in the config file; only the name of the
/// environment variable holding it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub api_key_env: String,
    /// Number of chunk texts sent per embedding request.
    pub batch_size: usize,
    /// Pause between embedding batches, in milliseconds.
    pub batch_pause_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    #[inline]
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 10,
            batch_pause_ms: 200,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of chunks retrieved per query.
    pub top_k: usize,
}

impl Default for SearchConfig {
    #[inline]
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid max pages: {0} (must be between 1 and 10000)")]
    InvalidMaxPages(usize),
    #[error("Invalid fetch delay: {0}ms (must be at most 60000)")]
    InvalidFetchDelay(u64),
    #[error("Invalid timeout: {0}s (must be between 1 and 300)")]
    InvalidTimeout(u64),
    #[error("Invalid chunk size: {0} (must be between 50 and 100000)")]
    InvalidChunkSize(usize),
    #[error("Overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(usize),
    #[error("Invalid top_k: {0} (must be at least 1)")]
    InvalidTopK(usize),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Model name cannot be empty")]
    EmptyModel,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from `config.toml` under `config_dir`, falling back
    /// to defaults when the file does not exist.
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.base_dir.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Default configuration directory under the platform config root.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine user config directory")?;
        Ok(base.join("siteqa"))
    }

    #[inline]
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.crawler.max_pages == 0 || self.crawler.max_pages > 10_000 {
            return Err(ConfigError::InvalidMaxPages(self.crawler.max_pages));
        }
        if self.crawler.fetch_delay_ms > 60_000 {
            return Err(ConfigError::InvalidFetchDelay(self.crawler.fetch_delay_ms));
        }
        if self.crawler.timeout_seconds == 0 || self.crawler.timeout_seconds > 300 {
            return Err(ConfigError::InvalidTimeout(self.crawler.timeout_seconds));
        }
        if self.provider.timeout_seconds == 0 || self.provider.timeout_seconds > 300 {
            return Err(ConfigError::InvalidTimeout(self.provider.timeout_seconds));
        }
        if self.chunking.chunk_size < 50 || self.chunking.chunk_size > 100_000 {
            return Err(ConfigError::InvalidChunkSize(self.chunking.chunk_size));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                self.chunking.overlap,
                self.chunking.chunk_size,
            ));
        }
        if self.provider.batch_size == 0 || self.provider.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.provider.batch_size));
        }
        if self.search.top_k == 0 {
            return Err(ConfigError::InvalidTopK(self.search.top_k));
        }
        if url::Url::parse(&self.provider.base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl(self.provider.base_url.clone()));
        }
        if self.provider.embedding_model.trim().is_empty()
            || self.provider.chat_model.trim().is_empty()
        {
            return Err(ConfigError::EmptyModel);
        }
        Ok(())
    }

    /// Read the provider API key from the configured environment variable.
    /// Absence is not an error here; providers that require a key fail at
    /// request time with a clear message.
    #[inline]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}
