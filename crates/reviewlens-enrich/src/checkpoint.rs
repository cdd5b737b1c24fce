//! Resumable job checkpoint
//!
//! The checkpoint is a single JSON document rewritten atomically (temp file
//! plus rename) so an interrupted write never leaves a truncated file.

use crate::prompt::LlmJudgement;
use crate::provider::TokenUsage;
use chrono::{DateTime, Utc};
use reviewlens_core::{Error, Result, Review};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

pub const CHECKPOINT_VERSION: u32 = 1;

/// Result of enriching one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentOutcome {
    pub judgement: LlmJudgement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl EnrichmentOutcome {
    pub fn success(judgement: LlmJudgement, attempts: u32, usage: Option<TokenUsage>) -> Self {
        Self {
            judgement,
            error: None,
            attempts,
            usage,
        }
    }

    /// Neutral default carrying the final error
    pub fn failure(error: impl Into<String>, attempts: u32) -> Self {
        Self {
            judgement: LlmJudgement::neutral(),
            error: Some(error.into()),
            attempts,
            usage: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Persistent progress of an enrichment job, keyed by review index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCheckpoint {
    pub version: u32,
    pub job_id: Uuid,
    pub input_digest: String,
    pub total_items: usize,
    pub completed: BTreeSet<usize>,
    pub entries: BTreeMap<usize, EnrichmentOutcome>,
    pub total_tokens: u64,
    pub errors: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobCheckpoint {
    pub fn new(input_digest: impl Into<String>, total_items: usize) -> Self {
        let now = Utc::now();
        Self {
            version: CHECKPOINT_VERSION,
            job_id: Uuid::new_v4(),
            input_digest: input_digest.into(),
            total_items,
            completed: BTreeSet::new(),
            entries: BTreeMap::new(),
            total_tokens: 0,
            errors: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Load a checkpoint, `None` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let checkpoint: Self = serde_json::from_str(&content).map_err(|e| {
            Error::checkpoint(format!("unreadable checkpoint {}: {e}", path.display()))
        })?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(Error::checkpoint(format!(
                "unsupported checkpoint version {} in {}",
                checkpoint.version,
                path.display()
            )));
        }
        debug!(
            job_id = %checkpoint.job_id,
            completed = checkpoint.completed.len(),
            "Loaded checkpoint"
        );
        Ok(Some(checkpoint))
    }

    /// Write atomically: temp file in the same directory, then rename
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.updated_at = Utc::now();
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        debug!(
            path = %path.display(),
            completed = self.completed.len(),
            total = self.total_items,
            "Checkpoint saved"
        );
        Ok(())
    }

    /// Fail when the checkpoint belongs to a different input
    pub fn ensure_matches(&self, input_digest: &str) -> Result<()> {
        if self.input_digest != input_digest {
            return Err(Error::checkpoint(format!(
                "checkpoint {} was created for different input (digest {} != {}); \
                 rerun with --restart to discard it",
                self.job_id, self.input_digest, input_digest
            )));
        }
        Ok(())
    }

    pub fn record(&mut self, index: usize, outcome: EnrichmentOutcome) {
        if let Some(usage) = outcome.usage {
            self.total_tokens += u64::from(usage.total_tokens);
        }
        if !outcome.is_success() {
            self.errors += 1;
        }
        self.completed.insert(index);
        self.entries.insert(index, outcome);
    }

    pub fn is_done(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() >= self.total_items
    }

    pub fn remaining(&self) -> usize {
        self.total_items.saturating_sub(self.completed.len())
    }

    /// Discard an existing checkpoint file
    pub fn remove(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
            info!(path = %path.display(), "Removed previous checkpoint");
        }
        Ok(())
    }
}

/// SHA-256 over the selected reviews' index, rating and text
pub fn input_digest<'a>(items: impl IntoIterator<Item = (usize, &'a Review)>) -> String {
    let mut hasher = Sha256::new();
    for (index, review) in items {
        hasher.update((index as u64).to_le_bytes());
        hasher.update([review.rating.get()]);
        hasher.update((review.text.len() as u64).to_le_bytes());
        hasher.update(review.text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewlens_core::Rating;
    use tempfile::tempdir;

    fn reviews() -> Vec<Review> {
        vec![
            Review::new("좋아요", Rating::clamped(5)),
            Review::new("별로", Rating::clamped(2)),
        ]
    }

    #[test]
    fn test_digest_depends_on_content_and_index() {
        let reviews = reviews();
        let a = input_digest(reviews.iter().enumerate());
        let b = input_digest(reviews.iter().enumerate());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let shifted = input_digest(reviews.iter().enumerate().map(|(i, r)| (i + 1, r)));
        assert_ne!(a, shifted);

        let mut edited = reviews.clone();
        edited[1].text.push('!');
        assert_ne!(a, input_digest(edited.iter().enumerate()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("job.json");

        let mut checkpoint = JobCheckpoint::new("abc", 2);
        checkpoint.record(
            0,
            EnrichmentOutcome::success(
                LlmJudgement::neutral(),
                1,
                Some(TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 20,
                    total_tokens: 120,
                }),
            ),
        );
        checkpoint.record(1, EnrichmentOutcome::failure("timeout", 3));
        checkpoint.save(&path).unwrap();

        let loaded = JobCheckpoint::load(&path).unwrap().unwrap();
        assert_eq!(loaded.job_id, checkpoint.job_id);
        assert_eq!(loaded.total_tokens, 120);
        assert_eq!(loaded.errors, 1);
        assert!(loaded.is_complete());
        assert_eq!(loaded.entries[&1].error.as_deref(), Some("timeout"));
        assert!(!dir.path().join("nested").join("job.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(JobCheckpoint::load(&dir.path().join("none.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_digest_mismatch_rejected() {
        let checkpoint = JobCheckpoint::new("abc", 1);
        assert!(checkpoint.ensure_matches("abc").is_ok());
        assert!(matches!(
            checkpoint.ensure_matches("def"),
            Err(Error::Checkpoint(_))
        ));
    }
}
