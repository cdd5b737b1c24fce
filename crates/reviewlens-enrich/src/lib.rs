//! reviewlens Enrichment
//!
//! Re-judges ambiguous keyword classifications through a chat-completion
//! API. The job is resumable: progress lives in a checkpoint file and a
//! failed call never drops a review, it falls back to the keyword result.

pub mod checkpoint;
pub mod config;
pub mod job;
pub mod merge;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod selection;
pub mod usage;

pub use checkpoint::{input_digest, EnrichmentOutcome, JobCheckpoint};
pub use config::{EnrichmentConfig, ProviderConfig};
pub use job::{EnrichmentJob, JobReport};
pub use merge::{MergeStats, Merger};
pub use openai::{OpenAiProvider, DEFAULT_API_KEY_ENV};
pub use prompt::{build_messages, parse_judgement, LlmJudgement};
pub use provider::{Completion, CompletionOptions, LlmError, LlmProvider, TokenUsage};
pub use retry::{RetryError, RetryPolicy};
pub use selection::{ambiguity_score, select, SelectionConfig, SelectionScope};
pub use usage::{Pricing, UsageLog, UsageRecord, UsageSummary};
