//! reviewlens Classifiers
//!
//! Rule-based classification of Korean cosmetics reviews.
//!
//! The pipeline for one review:
//! - Context detection: adversative split, skin reactions, discontinuation,
//!   past-usage-then-negative, negative-context density
//! - Keyword scoring: distinct lexicon hits in the relevant clause
//! - Reconciliation: an ordered rule list combining the rating with content
//! - Strength, tags, pain/positive points and purchase signals
//!
//! Every keyword table comes from an injected [`Lexicon`]; nothing is global.

pub mod batch;
pub mod classifier;
pub mod config;
pub mod context;
pub mod lexicon;
pub mod matcher;
pub mod points;
pub mod rules;
pub mod sentiment;
pub mod signals;
pub mod strength;
pub mod tagger;

pub use batch::{BatchClassifier, BatchSummary, BrandSummary, SentimentCounts};
pub use classifier::{Explanation, KeywordClassifier, ReviewClassifier};
pub use config::{AdversativePolicy, ClassifierConfig, RuleSettings};
pub use context::{AdversativeSplit, ContextDetector, ContextReport};
pub use lexicon::{Lexicon, PatternEntry, TagEntry};
pub use matcher::{normalize, KeywordSet, TagTable};
pub use points::{PointExtractor, PointsClassifier};
pub use rules::{default_rules, Decision, Evidence, RuleId, SentimentRule};
pub use sentiment::Reconciler;
pub use signals::SignalExtractor;
pub use strength::StrengthClassifier;
pub use tagger::{TagCategory, TagSet, Tagger};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchClassifier, BatchSummary};
    pub use crate::classifier::{KeywordClassifier, ReviewClassifier};
    pub use crate::config::{AdversativePolicy, ClassifierConfig, RuleSettings};
    pub use crate::lexicon::Lexicon;
}
