//! reviewlens Core
//!
//! Core types and error handling shared across reviewlens components.
//!
//! This crate provides:
//! - The review data model (`Review`, `Rating`, `ReviewMeta`)
//! - Classification outputs (`ClassificationResult`, `Sentiment`, `Strength`, tag/flag types)
//! - Chat message types used by the LLM enrichment path
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AnalyzedReview, ChatMessage, ChatRole, ClassificationResult, ContextFlags, Loyalty, Rating,
    ResultSource, Review, ReviewMeta, ReviewSignals, Sentiment, Strength, REASON_OTHER,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AnalyzedReview, ClassificationResult, ContextFlags, Rating, Review, ReviewMeta,
        Sentiment, Strength,
    };
}
