//! Classifier trait and the composed keyword classifier

use crate::config::{ClassifierConfig, RuleSettings};
use crate::context::ContextDetector;
use crate::lexicon::Lexicon;
use crate::matcher::normalize;
use crate::points::PointsClassifier;
use crate::rules::Decision;
use crate::sentiment::Reconciler;
use crate::signals::SignalExtractor;
use crate::strength::StrengthClassifier;
use crate::tagger::{TagSet, Tagger};
use reviewlens_core::{ClassificationResult, ContextFlags, Result, ResultSource, Review};
use serde::Serialize;

/// Trait for all review classifiers
pub trait ReviewClassifier: Send + Sync {
    /// Classify a single review; total over all inputs
    fn classify(&self, review: &Review) -> ClassificationResult;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Rule-based classifier over keyword lexicons.
///
/// A pure function of review text and rating: no shared mutable state, so
/// one instance can be used from many threads at once.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    name: String,
    detector: ContextDetector,
    reconciler: Reconciler,
    strength: StrengthClassifier,
    tagger: Tagger,
    points: PointsClassifier,
    signals: SignalExtractor,
}

/// Full trace of how a review was classified
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub result: ClassificationResult,
    pub decision: Decision,
    pub connective: Option<String>,
    pub relevant_text: String,
    pub negative_context_hits: usize,
}

impl KeywordClassifier {
    /// Create with the built-in lexicon and default rules
    pub fn new() -> Result<Self> {
        Self::with_lexicon(&Lexicon::default(), RuleSettings::default())
    }

    pub fn with_lexicon(lexicon: &Lexicon, settings: RuleSettings) -> Result<Self> {
        lexicon.validate()?;
        settings.validate()?;

        let classifier = Self {
            name: "keyword".to_string(),
            detector: ContextDetector::new(lexicon, settings.negative_context_downgrade)?,
            strength: StrengthClassifier::new(lexicon, settings.strong_threshold)?,
            tagger: Tagger::new(lexicon)?,
            points: PointsClassifier::new(lexicon)?,
            signals: SignalExtractor::new(lexicon)?,
            reconciler: Reconciler::new(lexicon, settings)?,
        };

        tracing::debug!(
            adversative_policy = ?classifier.reconciler.settings().adversative_policy,
            rules = classifier.reconciler.rules().len(),
            "Keyword classifier initialized"
        );
        Ok(classifier)
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let lexicon = config.resolve_lexicon()?;
        Self::with_lexicon(&lexicon, config.rules.clone())
    }

    pub fn tagger(&self) -> &Tagger {
        &self.tagger
    }

    pub fn detector(&self) -> &ContextDetector {
        &self.detector
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Classify and keep the rule trace
    pub fn explain(&self, review: &Review) -> Explanation {
        let text = normalize(&review.text);
        let report = self.detector.inspect(&text);
        let decision = self.reconciler.decide(&report, review.rating);

        let result = if text.trim().is_empty() {
            ClassificationResult::neutral()
        } else {
            let TagSet {
                benefit,
                texture,
                usage,
                value,
            } = self.tagger.extract(&report);

            ClassificationResult {
                sentiment: decision.sentiment,
                strength: self.strength.classify(&report),
                benefit_tags: benefit,
                texture_tags: texture,
                usage_tags: usage,
                value_tags: value,
                pain_points: self.points.pain_points(&text),
                positive_points: self.points.positive_points(&text),
                flags: report.flags(),
                signals: self.signals.extract(&report, review.is_rebuy()),
                source: ResultSource::Keyword,
                enrichment_error: None,
            }
        };

        Explanation {
            connective: report.split.connective.map(str::to_string),
            relevant_text: report.relevant_text().to_string(),
            negative_context_hits: report.negative_context_hits,
            result,
            decision,
        }
    }

    /// Context flags alone
    pub fn flags(&self, text: &str) -> ContextFlags {
        let text = normalize(text);
        self.detector.inspect(&text).flags()
    }
}

impl ReviewClassifier for KeywordClassifier {
    fn classify(&self, review: &Review) -> ClassificationResult {
        self.explain(review).result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
