//! Emotional strength, independent of polarity

use crate::context::ContextReport;
use crate::lexicon::Lexicon;
use crate::matcher::KeywordSet;
use reviewlens_core::{Result, Strength};

#[derive(Debug, Clone)]
pub struct StrengthClassifier {
    strong: KeywordSet,
    weak: KeywordSet,
    superlatives: KeywordSet,
    strong_threshold: usize,
}

impl StrengthClassifier {
    pub fn new(lexicon: &Lexicon, strong_threshold: usize) -> Result<Self> {
        Ok(Self {
            strong: KeywordSet::new("strong_markers", &lexicon.strong_markers)?,
            weak: KeywordSet::new("weak_markers", &lexicon.weak_markers)?,
            superlatives: KeywordSet::new("superlatives", &lexicon.superlatives)?,
            strong_threshold,
        })
    }

    /// STRONG is never assigned in a negative context; a product cannot be
    /// life-changing in a review reporting a reaction.
    pub fn classify(&self, report: &ContextReport<'_>) -> Strength {
        let text = report.text;
        if text.trim().is_empty() {
            return Strength::Mid;
        }

        let weak = self.weak.score(text);
        let negative = report.negative_context_hits >= 1
            || report.discontinued
            || report.has_skin_issue();

        if negative {
            return if weak >= 1 { Strength::Weak } else { Strength::Mid };
        }

        if self.strong.score(text) >= self.strong_threshold || self.superlatives.contains_any(text)
        {
            Strength::Strong
        } else if weak >= 1 {
            Strength::Weak
        } else {
            Strength::Mid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextDetector;

    fn strength(text: &str) -> Strength {
        let lexicon = Lexicon::default();
        let detector = ContextDetector::new(&lexicon, 2).unwrap();
        let classifier = StrengthClassifier::new(&lexicon, 2).unwrap();
        classifier.classify(&detector.inspect(text))
    }

    #[test]
    fn test_superlative_alone_is_strong() {
        assert_eq!(strength("인생템이에요"), Strength::Strong);
    }

    #[test]
    fn test_two_strong_markers() {
        assert_eq!(strength("대박 강추합니다"), Strength::Strong);
        assert_eq!(strength("대박이에요"), Strength::Mid);
    }

    #[test]
    fn test_weak_marker() {
        assert_eq!(strength("무난하게 쓰기 좋아요"), Strength::Weak);
    }

    #[test]
    fn test_negative_context_suppresses_strong() {
        assert_eq!(strength("인생템인 줄 알았는데 실망"), Strength::Mid);
        assert_eq!(strength("그냥 별로예요 인생템 아님"), Strength::Weak);
        assert_eq!(strength("최고 대박인데 모낭염"), Strength::Mid);
    }

    #[test]
    fn test_empty_text_is_mid() {
        assert_eq!(strength("   "), Strength::Mid);
    }
}
