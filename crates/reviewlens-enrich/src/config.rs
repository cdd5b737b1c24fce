//! Configuration for the enrichment job

use crate::openai::DEFAULT_API_KEY_ENV;
use crate::provider::CompletionOptions;
use crate::retry::RetryPolicy;
use crate::selection::SelectionConfig;
use crate::usage::Pricing;
use reviewlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Chat-completion backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the bearer key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Configuration for an enrichment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Items between checkpoint saves
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Concurrent calls within a batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause after each call
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub pricing: Pricing,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    300
}

fn default_batch_size() -> usize {
    50
}

fn default_concurrency() -> usize {
    4
}

fn default_delay_ms() -> u64 {
    500
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            delay_ms: default_delay_ms(),
            retry: RetryPolicy::default(),
            selection: SelectionConfig::default(),
            pricing: Pricing::default(),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::config("enrichment.batch_size must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("enrichment.concurrency must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config("enrichment.retry.max_attempts must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "enrichment.temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            timeout: Duration::from_secs(self.provider.timeout_secs),
        }
    }
}
