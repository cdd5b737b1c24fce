//! Configuration for the keyword classifier

use crate::lexicon::Lexicon;
use reviewlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the keyword classifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Lexicon file; takes precedence over the inline lexicon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<PathBuf>,

    /// Inline lexicon tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<Lexicon>,

    /// Rule thresholds and policies
    #[serde(default)]
    pub rules: RuleSettings,
}

/// How a negative after-clause of an adversative split affects sentiment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdversativePolicy {
    /// Always NEG
    #[default]
    ForceNegative,
    /// POS becomes NEU, other labels are kept
    DowngradeNeutral,
}

/// Thresholds used by the sentiment rules and the strength classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSettings {
    #[serde(default)]
    pub adversative_policy: AdversativePolicy,

    /// Negative-context hits in the relevant text that confirm a
    /// past-usage-then-negative review
    #[serde(default = "default_past_usage_min_context")]
    pub past_usage_min_context: usize,

    /// NEGATIVE hits after the connective that trigger the adversative rule
    #[serde(default = "default_adversative_min_negative")]
    pub adversative_min_negative: usize,

    /// Minimum NEGATIVE hits for the keyword override
    #[serde(default = "default_keyword_override_min")]
    pub keyword_override_min: usize,

    /// Negative-context hits that downgrade POS to NEU; also the full-text
    /// count that marks a review as negative context
    #[serde(default = "default_negative_context_downgrade")]
    pub negative_context_downgrade: usize,

    /// NEGATIVE hits that downgrade POS to NEU
    #[serde(default = "default_negative_keyword_downgrade")]
    pub negative_keyword_downgrade: usize,

    /// POSITIVE hits that upgrade NEU to POS
    #[serde(default = "default_positive_upgrade")]
    pub positive_upgrade: usize,

    /// Strong-marker hits required for STRONG
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: usize,
}

fn default_past_usage_min_context() -> usize {
    1
}

fn default_adversative_min_negative() -> usize {
    1
}

fn default_keyword_override_min() -> usize {
    2
}

fn default_negative_context_downgrade() -> usize {
    2
}

fn default_negative_keyword_downgrade() -> usize {
    2
}

fn default_positive_upgrade() -> usize {
    2
}

fn default_strong_threshold() -> usize {
    2
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            adversative_policy: AdversativePolicy::default(),
            past_usage_min_context: default_past_usage_min_context(),
            adversative_min_negative: default_adversative_min_negative(),
            keyword_override_min: default_keyword_override_min(),
            negative_context_downgrade: default_negative_context_downgrade(),
            negative_keyword_downgrade: default_negative_keyword_downgrade(),
            positive_upgrade: default_positive_upgrade(),
            strong_threshold: default_strong_threshold(),
        }
    }
}

impl RuleSettings {
    /// Thresholds of zero would fire on every review
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("past_usage_min_context", self.past_usage_min_context),
            ("adversative_min_negative", self.adversative_min_negative),
            ("keyword_override_min", self.keyword_override_min),
            ("negative_context_downgrade", self.negative_context_downgrade),
            ("negative_keyword_downgrade", self.negative_keyword_downgrade),
            ("positive_upgrade", self.positive_upgrade),
            ("strong_threshold", self.strong_threshold),
        ];
        match thresholds.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(Error::config(format!("rules.{name} must be at least 1"))),
            None => Ok(()),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.rules.validate()?;
        Ok(config)
    }

    /// Load from file; a relative `lexicon_path` is resolved against the
    /// config file's directory
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml(&content)?;
        if let (Some(lexicon_path), Some(dir)) = (&config.lexicon_path, path.parent()) {
            if lexicon_path.is_relative() {
                config.lexicon_path = Some(dir.join(lexicon_path));
            }
        }
        Ok(config)
    }

    /// Resolve the lexicon: file, then inline tables, then built-in defaults
    pub fn resolve_lexicon(&self) -> Result<Lexicon> {
        match (&self.lexicon_path, &self.lexicon) {
            (Some(path), _) => Lexicon::from_file(path),
            (None, Some(lexicon)) => {
                lexicon.validate()?;
                Ok(lexicon.clone())
            }
            (None, None) => Ok(Lexicon::default()),
        }
    }
}
