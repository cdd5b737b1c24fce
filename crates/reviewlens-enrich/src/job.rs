//! Resumable, checkpointed enrichment job
//!
//! Selected reviews are processed in batches of `batch_size`. Within a batch
//! up to `concurrency` calls run at once; the checkpoint is saved after every
//! batch. Setting the shutdown flag stops scheduling new calls, lets in-flight
//! calls finish and flushes the checkpoint before returning.

use crate::checkpoint::{input_digest, EnrichmentOutcome, JobCheckpoint};
use crate::config::EnrichmentConfig;
use crate::prompt::{build_messages, parse_judgement, LlmJudgement};
use crate::provider::{CompletionOptions, LlmProvider};
use crate::usage::UsageRecord;
use futures::stream::{self, StreamExt};
use reviewlens_core::{AnalyzedReview, Error, Result, Review};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one `run`
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub selected: usize,
    /// Already completed in a previous run
    pub resumed: usize,
    /// Completed in this run
    pub processed: usize,
    pub errors: usize,
    pub total_tokens: u64,
    pub interrupted: bool,
    /// All outcomes in the checkpoint, keyed by review index
    #[serde(skip)]
    pub entries: BTreeMap<usize, EnrichmentOutcome>,
    /// Usage of calls made in this run
    #[serde(skip)]
    pub usage: Vec<UsageRecord>,
}

impl JobReport {
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.entries.len() >= self.selected
    }
}

pub struct EnrichmentJob {
    provider: Arc<dyn LlmProvider>,
    config: EnrichmentConfig,
    checkpoint_path: PathBuf,
    shutdown: Arc<AtomicBool>,
}

impl EnrichmentJob {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: EnrichmentConfig,
        checkpoint_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            config,
            checkpoint_path: checkpoint_path.into(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally owned shutdown flag (e.g. set by a Ctrl-C handler)
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Enrich `rows[pos]` for every position in `selected`.
    ///
    /// An existing checkpoint is resumed when it was created for the same
    /// selection; otherwise it is rejected unless `restart` is set, in which
    /// case it is discarded.
    pub async fn run(
        &self,
        rows: &[AnalyzedReview],
        selected: &[usize],
        restart: bool,
    ) -> Result<JobReport> {
        let items: Vec<(usize, &Review)> = selected
            .iter()
            .map(|&pos| {
                rows.get(pos)
                    .map(|row| (row.index, &row.review))
                    .ok_or_else(|| Error::enrichment(format!("selected position {pos} out of range")))
            })
            .collect::<Result<_>>()?;

        let digest = input_digest(items.iter().copied());
        if restart {
            JobCheckpoint::remove(&self.checkpoint_path)?;
        }
        let mut checkpoint = match JobCheckpoint::load(&self.checkpoint_path)? {
            Some(existing) => {
                existing.ensure_matches(&digest)?;
                existing
            }
            None => JobCheckpoint::new(digest, items.len()),
        };

        let pending: Vec<(usize, &Review)> = items
            .iter()
            .copied()
            .filter(|(index, _)| !checkpoint.is_done(*index))
            .collect();
        let resumed = items.len() - pending.len();

        info!(
            job_id = %checkpoint.job_id,
            provider = self.provider.name(),
            model = self.provider.model(),
            selected = items.len(),
            resumed,
            pending = pending.len(),
            "Starting enrichment job"
        );

        let options = self.config.completion_options();
        let batch_size = self.config.batch_size.max(1);
        let concurrency = self.config.concurrency.max(1);

        let mut processed = 0;
        let mut usage = Vec::new();
        let mut interrupted = false;

        for (batch_no, batch) in pending.chunks(batch_size).enumerate() {
            if self.stopping() {
                interrupted = true;
                break;
            }

            let outcomes: Vec<(usize, EnrichmentOutcome)> = stream::iter(batch.iter().copied())
                .take_while(|_| futures::future::ready(!self.stopping()))
                .map(|(index, review)| {
                    let options = &options;
                    async move { (index, self.enrich_one(index, review, options).await) }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

            if outcomes.len() < batch.len() {
                interrupted = true;
            }
            for (index, outcome) in outcomes {
                if let Some(tokens) = outcome.usage {
                    usage.push(UsageRecord::new(index, tokens));
                }
                checkpoint.record(index, outcome);
                processed += 1;
            }
            checkpoint.save(&self.checkpoint_path)?;

            info!(
                batch = batch_no + 1,
                completed = checkpoint.completed.len(),
                total = checkpoint.total_items,
                errors = checkpoint.errors,
                tokens = checkpoint.total_tokens,
                "Enrichment batch checkpointed"
            );

            if interrupted {
                break;
            }
        }

        if interrupted {
            warn!(
                job_id = %checkpoint.job_id,
                remaining = checkpoint.remaining(),
                path = %self.checkpoint_path.display(),
                "Enrichment interrupted; rerun to resume from the checkpoint"
            );
        }

        Ok(JobReport {
            job_id: checkpoint.job_id,
            selected: items.len(),
            resumed,
            processed,
            errors: checkpoint.errors,
            total_tokens: checkpoint.total_tokens,
            interrupted,
            entries: checkpoint.entries,
            usage,
        })
    }

    /// Judge one review. Never fails: exhausted retries become the neutral
    /// judgement with the error attached.
    async fn enrich_one(
        &self,
        index: usize,
        review: &Review,
        options: &CompletionOptions,
    ) -> EnrichmentOutcome {
        if review.text.trim().is_empty() {
            return EnrichmentOutcome::success(LlmJudgement::neutral(), 0, None);
        }

        let messages = build_messages(&review.text, review.rating);
        let provider = &self.provider;
        let messages = &messages;
        let started = Instant::now();

        let result = self
            .config
            .retry
            .run(move || async move {
                let completion = provider.complete(messages, options).await?;
                let judgement = parse_judgement(&completion.content)?;
                Ok((judgement, completion.usage))
            })
            .await;

        metrics::histogram!("reviewlens_enrichment_call_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(((judgement, usage), attempts)) => {
                metrics::counter!("reviewlens_enrichment_calls_total", "outcome" => "success")
                    .increment(1);
                if let Some(usage) = usage {
                    metrics::counter!("reviewlens_enrichment_tokens_total")
                        .increment(u64::from(usage.total_tokens));
                }
                debug!(index, attempts, sentiment = %judgement.sentiment, "Review enriched");
                EnrichmentOutcome::success(judgement, attempts, usage)
            }
            Err(failure) => {
                metrics::counter!(
                    "reviewlens_enrichment_calls_total",
                    "outcome" => failure.error.kind()
                )
                .increment(1);
                warn!(
                    index,
                    attempts = failure.attempts,
                    error = %failure.error,
                    "Enrichment failed, keeping keyword result"
                );
                EnrichmentOutcome::failure(failure.error.to_string(), failure.attempts)
            }
        };

        let delay = self.config.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
