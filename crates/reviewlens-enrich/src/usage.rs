//! Token usage log and cost estimate

use crate::provider::TokenUsage;
use chrono::{DateTime, Utc};
use reviewlens_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Price per million tokens, in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default = "default_input_price")]
    pub input_per_million: f64,
    #[serde(default = "default_output_price")]
    pub output_per_million: f64,
}

fn default_input_price() -> f64 {
    0.15
}

fn default_output_price() -> f64 {
    0.60
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_million: default_input_price(),
            output_per_million: default_output_price(),
        }
    }
}

/// One successful LLM call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub review_index: usize,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl UsageRecord {
    pub fn new(review_index: usize, usage: TokenUsage) -> Self {
        Self {
            timestamp: Utc::now(),
            review_index,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub calls: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost_usd: f64,
}

/// Append-only usage log persisted as a JSON array
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageLog {
    pub records: Vec<UsageRecord>,
}

impl UsageLog {
    /// Load an existing log or start empty
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let records: Vec<UsageRecord> = serde_json::from_str(&content)?;
        Ok(Self { records })
    }

    pub fn push(&mut self, record: UsageRecord) {
        self.records.push(record);
    }

    pub fn summary(&self, pricing: &Pricing) -> UsageSummary {
        let prompt_tokens: u64 = self.records.iter().map(|r| u64::from(r.prompt_tokens)).sum();
        let completion_tokens: u64 = self
            .records
            .iter()
            .map(|r| u64::from(r.completion_tokens))
            .sum();
        let total_tokens: u64 = self.records.iter().map(|r| u64::from(r.total_tokens)).sum();

        let estimated_cost_usd = prompt_tokens as f64 / 1_000_000.0 * pricing.input_per_million
            + completion_tokens as f64 / 1_000_000.0 * pricing.output_per_million;

        UsageSummary {
            calls: self.records.len(),
            prompt_tokens,
            completion_tokens,
            total_tokens,
            estimated_cost_usd,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.records)?)?;
        debug!(path = %path.display(), records = self.records.len(), "Usage log saved");
        Ok(())
    }
}
