//! Application configuration

use crate::cli::{Cli, ScopeArg};
use anyhow::Context;
use reviewlens_classifiers::ClassifierConfig;
use reviewlens_enrich::{EnrichmentConfig, SelectionScope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keyword classifier: lexicon and rule thresholds
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// LLM enrichment
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Brand spellings mapped to one canonical name
    #[serde(default)]
    pub brand_aliases: BTreeMap<String, String>,

    /// Worker threads for classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

/// Enrichment overrides taken from the command line
#[derive(Debug, Default)]
pub struct EnrichOverrides {
    pub scope: Option<ScopeArg>,
    pub max_samples: Option<usize>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub concurrency: Option<usize>,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(lexicon) = &cli.lexicon {
            config.classifier.lexicon_path = Some(lexicon.clone());
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;

        config.classifier.rules.validate()?;
        config.enrichment.validate()?;

        // relative lexicon paths are relative to the config file
        if let (Some(lexicon), Some(dir)) = (&config.classifier.lexicon_path, path.parent()) {
            if lexicon.is_relative() {
                config.classifier.lexicon_path = Some(dir.join(lexicon));
            }
        }
        Ok(config)
    }

    pub fn apply_enrich_overrides(&mut self, overrides: EnrichOverrides) {
        let enrichment = &mut self.enrichment;
        if let Some(scope) = overrides.scope {
            enrichment.selection.scope = match scope {
                ScopeArg::Ambiguous => SelectionScope::Ambiguous,
                ScopeArg::All => SelectionScope::All,
            };
        }
        if let Some(max) = overrides.max_samples {
            enrichment.selection.max_samples = Some(max);
        }
        if let Some(model) = overrides.model {
            enrichment.provider.model = model;
        }
        if let Some(base_url) = overrides.base_url {
            enrichment.provider.base_url = base_url;
        }
        if let Some(concurrency) = overrides.concurrency {
            enrichment.concurrency = concurrency.max(1);
        }
    }
}
