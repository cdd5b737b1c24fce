//! Enrichment job tests against a mock provider

use async_trait::async_trait;
use reviewlens_classifiers::{KeywordClassifier, Lexicon, ReviewClassifier};
use reviewlens_core::{
    AnalyzedReview, ChatMessage, Error, Rating, ResultSource, Review, Sentiment,
};
use reviewlens_enrich::{
    select, Completion, CompletionOptions, EnrichmentConfig, EnrichmentJob, JobCheckpoint,
    LlmError, LlmProvider, Merger, RetryPolicy, SelectionConfig, SelectionScope, TokenUsage,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

/// Answers POS for every review, fails reviews containing "FAIL", and
/// optionally raises the shutdown flag after a number of calls
struct MockProvider {
    calls: AtomicU32,
    trip_after: Option<(u32, Arc<AtomicBool>)>,
}

impl MockProvider {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            trip_after: None,
        }
    }

    fn tripping(after: u32, flag: Arc<AtomicBool>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            trip_after: Some((after, flag)),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, flag)) = &self.trip_after {
            if calls >= *after {
                flag.store(true, Ordering::SeqCst);
            }
        }

        let prompt = &messages[messages.len() - 1].content;
        if prompt.contains("FAIL") {
            return Err(LlmError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(Completion {
            content: "```json\n{\"sentiment\": \"POS\", \"strength\": \"STRONG\", \"benefit_tags\": [\"보습\"]}\n```"
                .to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            }),
        })
    }
}

fn rows(texts: &[&str]) -> Vec<AnalyzedReview> {
    let classifier = KeywordClassifier::new().unwrap();
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let review = Review::new(*text, Rating::clamped(3));
            AnalyzedReview {
                index,
                result: classifier.classify(&review),
                review,
            }
        })
        .collect()
}

fn fast_config(batch_size: usize, concurrency: usize) -> EnrichmentConfig {
    EnrichmentConfig {
        batch_size,
        concurrency,
        delay_ms: 0,
        retry: RetryPolicy {
            max_attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 1,
            jitter: 0.0,
        },
        selection: SelectionConfig {
            scope: SelectionScope::All,
            max_samples: None,
            min_text_chars: 30,
        },
        ..Default::default()
    }
}

const TEXTS: [&str; 4] = ["무난해요", "그냥 그래요", "보통이에요", "쓸만해요"];

#[tokio::test]
async fn test_full_run_enriches_every_selected_review() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.json");
    let rows = rows(&TEXTS);
    let config = fast_config(2, 2);
    let selected = select(&rows, &config.selection);

    let provider = Arc::new(MockProvider::new());
    let job = EnrichmentJob::new(provider.clone(), config, &path);
    let report = job.run(&rows, &selected, false).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.processed, 4);
    assert_eq!(report.errors, 0);
    assert_eq!(report.total_tokens, 480);
    assert_eq!(report.usage.len(), 4);
    assert_eq!(provider.calls(), 4);

    let checkpoint = JobCheckpoint::load(&path).unwrap().unwrap();
    assert_eq!(checkpoint.job_id, report.job_id);
    assert!(checkpoint.is_complete());
}

#[tokio::test]
async fn test_interrupted_job_resumes_without_repeating_calls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.json");
    let rows = rows(&TEXTS);
    let selected: Vec<usize> = (0..rows.len()).collect();

    let shutdown = Arc::new(AtomicBool::new(false));
    let first = Arc::new(MockProvider::tripping(2, shutdown.clone()));
    let job = EnrichmentJob::new(first.clone(), fast_config(1, 1), &path).with_shutdown(shutdown);
    let report = job.run(&rows, &selected, false).await.unwrap();

    assert!(report.interrupted);
    assert_eq!(report.processed, 2);
    assert_eq!(first.calls(), 2);
    let saved = JobCheckpoint::load(&path).unwrap().unwrap();
    assert_eq!(saved.completed.len(), 2);

    let second = Arc::new(MockProvider::new());
    let job = EnrichmentJob::new(second.clone(), fast_config(1, 1), &path);
    let resumed = job.run(&rows, &selected, false).await.unwrap();

    assert!(resumed.is_complete());
    assert_eq!(resumed.job_id, report.job_id);
    assert_eq!(resumed.resumed, 2);
    assert_eq!(resumed.processed, 2);
    assert_eq!(second.calls(), 2);
    assert_eq!(resumed.entries.len(), 4);
}

#[tokio::test]
async fn test_checkpoint_for_other_input_needs_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.json");
    let provider = Arc::new(MockProvider::new());

    let original = rows(&TEXTS);
    let job = EnrichmentJob::new(provider.clone(), fast_config(2, 2), &path);
    job.run(&original, &[0, 1], false).await.unwrap();

    let edited = rows(&["완전히 다른 리뷰", "그냥 그래요"]);
    let err = job.run(&edited, &[0, 1], false).await.unwrap_err();
    assert!(matches!(err, Error::Checkpoint(_)));

    let report = job.run(&edited, &[0, 1], true).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.resumed, 0);
}

#[tokio::test]
async fn test_failed_calls_fall_back_to_keyword_result() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job.json");
    let mut rows = rows(&["FAIL 이건 실패", "무난해요"]);
    let keyword_sentiment = rows[0].result.sentiment;

    let provider = Arc::new(MockProvider::new());
    let job = EnrichmentJob::new(provider.clone(), fast_config(10, 2), &path);
    let report = job.run(&rows, &[0, 1], false).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.errors, 1);
    // two attempts for the failing review, one for the other
    assert_eq!(provider.calls(), 3);
    let failed = &report.entries[&0];
    assert_eq!(failed.attempts, 2);
    assert!(failed.error.is_some());

    let merger = Merger::new(&Lexicon::default()).unwrap();
    let stats = merger.merge(&mut rows, &report.entries);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.merged, 1);

    assert_eq!(rows[0].result.sentiment, keyword_sentiment);
    assert_eq!(rows[0].result.source, ResultSource::LlmFallback);
    assert!(rows[0].result.enrichment_error.is_some());

    assert_eq!(rows[1].result.sentiment, Sentiment::Pos);
    assert_eq!(rows[1].result.source, ResultSource::Llm);
    assert_eq!(rows[1].result.benefit_tags, vec!["보습"]);
}
