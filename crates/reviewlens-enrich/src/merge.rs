//! Merge LLM judgements into keyword results

use crate::checkpoint::EnrichmentOutcome;
use reviewlens_classifiers::{Lexicon, TagCategory, Tagger};
use reviewlens_core::{AnalyzedReview, Result, ResultSource, REASON_OTHER};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Counts from one merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub merged: usize,
    pub failed: usize,
    pub sentiment_changed: usize,
    /// Outcomes whose index has no row
    pub unmatched: usize,
}

/// Applies judgements to rows, keeping every hard invariant
pub struct Merger {
    tagger: Tagger,
    reasons: Vec<String>,
}

impl Merger {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let mut reasons: Vec<String> = lexicon
            .reason_buy
            .iter()
            .map(|entry| entry.tag.clone())
            .collect();
        reasons.push(REASON_OTHER.to_string());
        Ok(Self {
            tagger: Tagger::new(lexicon)?,
            reasons,
        })
    }

    /// Merge outcomes keyed by `AnalyzedReview::index`.
    ///
    /// A successful judgement overrides sentiment, strength when given, the
    /// benefit/texture/usage tags, non-empty point lists and a known purchase
    /// reason. Value tags, context flags and the other signals stay from the
    /// keyword path. A failed outcome leaves the row as classified and marks
    /// it with the error.
    pub fn merge(
        &self,
        rows: &mut [AnalyzedReview],
        outcomes: &BTreeMap<usize, EnrichmentOutcome>,
    ) -> MergeStats {
        let positions: BTreeMap<usize, usize> = rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (row.index, pos))
            .collect();

        let mut stats = MergeStats::default();
        for (index, outcome) in outcomes {
            let Some(&pos) = positions.get(index) else {
                stats.unmatched += 1;
                continue;
            };
            let result = &mut rows[pos].result;

            if let Some(error) = &outcome.error {
                result.source = ResultSource::LlmFallback;
                result.enrichment_error = Some(error.clone());
                stats.failed += 1;
                continue;
            }

            let judgement = &outcome.judgement;
            let before = result.sentiment;

            result.sentiment = judgement.sentiment;
            if let Some(strength) = judgement.strength {
                result.strength = strength;
            }
            result.benefit_tags = self
                .tagger
                .canonicalize(TagCategory::Benefit, &judgement.benefit_tags);
            result.texture_tags = self
                .tagger
                .canonicalize(TagCategory::Texture, &judgement.texture_tags);
            result.usage_tags = self
                .tagger
                .canonicalize(TagCategory::Usage, &judgement.usage_tags);
            if !judgement.pain_points.is_empty() {
                result.pain_points = judgement.pain_points.clone();
            }
            if !judgement.positive_points.is_empty() {
                result.positive_points = judgement.positive_points.clone();
            }
            if let Some(reason) = judgement
                .reason_buy
                .as_ref()
                .filter(|reason| self.reasons.contains(reason))
            {
                result.signals.reason_buy = reason.clone();
            }
            result.source = ResultSource::Llm;
            result.enrichment_error = None;

            self.tagger.enforce_guards(result);

            if result.sentiment != before {
                stats.sentiment_changed += 1;
            }
            stats.merged += 1;
        }

        debug!(
            merged = stats.merged,
            failed = stats.failed,
            sentiment_changed = stats.sentiment_changed,
            "Merged enrichment results"
        );
        stats
    }
}
