//! Pain-point and positive-point extraction
//!
//! Multi-label regex classification: every category whose pattern matches
//! contributes its label. No context suppression is applied.

use crate::lexicon::{Lexicon, PatternEntry};
use regex::{RegexSet, RegexSetBuilder};
use reviewlens_core::{Error, Result};

/// Labelled regex categories matched in a single pass
#[derive(Debug, Clone)]
pub struct PointExtractor {
    set: RegexSet,
    labels: Vec<String>,
}

impl PointExtractor {
    pub fn new(name: &str, entries: &[PatternEntry]) -> Result<Self> {
        let set = RegexSetBuilder::new(entries.iter().map(|e| e.pattern.as_str()))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::config(format!("invalid {name} pattern: {e}")))?;
        Ok(Self {
            set,
            labels: entries.iter().map(|e| e.label.clone()).collect(),
        })
    }

    /// Labels of every matching category, in table order
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.set
            .matches(text)
            .into_iter()
            .map(|idx| self.labels[idx].clone())
            .collect()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Pain and positive extractors built from one lexicon
#[derive(Debug, Clone)]
pub struct PointsClassifier {
    pain: PointExtractor,
    positive: PointExtractor,
}

impl PointsClassifier {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        Ok(Self {
            pain: PointExtractor::new("pain_points", &lexicon.pain_points)?,
            positive: PointExtractor::new("positive_points", &lexicon.positive_points)?,
        })
    }

    pub fn pain_points(&self, text: &str) -> Vec<String> {
        self.pain.extract(text)
    }

    pub fn positive_points(&self, text: &str) -> Vec<String> {
        self.positive.extract(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PointsClassifier {
        PointsClassifier::new(&Lexicon::default()).unwrap()
    }

    #[test]
    fn test_multiple_pain_labels() {
        let points = classifier();
        let labels = points.pain_points("바르면 따가워요 너무 비싸요 펌프도 불편");
        assert_eq!(labels, vec!["자극/트러블", "가격", "용기/패키지"]);
    }

    #[test]
    fn test_positive_labels() {
        let points = classifier();
        let labels = points.positive_points("순하고 촉촉해서 대용량으로 재구매");
        assert_eq!(labels, vec!["순함/저자극", "보습력", "대용량", "재구매의사"]);
    }

    #[test]
    fn test_no_match_and_empty_text() {
        let points = classifier();
        assert!(points.pain_points("").is_empty());
        assert!(points.positive_points("그냥 그래요").is_empty());
    }

    #[test]
    fn test_uppercase_pattern_matches_normalized_text() {
        let entries = vec![PatternEntry {
            label: "시카".to_string(),
            pattern: "CICA|시카".to_string(),
        }];
        let extractor = PointExtractor::new("positive_points", &entries).unwrap();
        assert_eq!(extractor.extract("cica 성분이 좋아요"), vec!["시카"]);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let entries = vec![PatternEntry {
            label: "bad".to_string(),
            pattern: "[".to_string(),
        }];
        let err = PointExtractor::new("pain_points", &entries).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
