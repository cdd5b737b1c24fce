//! Purchase reasons, brand switching and loyalty signals

use crate::context::ContextReport;
use crate::lexicon::Lexicon;
use crate::matcher::{KeywordSet, TagTable};
use reviewlens_core::{Loyalty, Result, ReviewSignals, REASON_OTHER};

#[derive(Debug, Clone)]
pub struct SignalExtractor {
    reason_buy: TagTable,
    reason_rebuy: TagTable,
    switch: KeywordSet,
    competitors: Vec<(String, String)>,
    loyal: KeywordSet,
    rebuy: KeywordSet,
    churn: KeywordSet,
}

impl SignalExtractor {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let reason = |name: &str, entries: &[crate::lexicon::TagEntry]| {
            TagTable::new(
                name,
                entries
                    .iter()
                    .map(|e| (e.tag.as_str(), e.keywords.as_slice())),
            )
        };

        Ok(Self {
            reason_buy: reason("reason_buy", &lexicon.reason_buy)?,
            reason_rebuy: reason("reason_rebuy", &lexicon.reason_rebuy)?,
            switch: KeywordSet::new("switch_keywords", &lexicon.switch_keywords)?,
            competitors: lexicon
                .competitor_brands
                .iter()
                .map(|brand| (brand.to_lowercase(), brand.clone()))
                .collect(),
            loyal: KeywordSet::new("loyal_keywords", &lexicon.loyal_keywords)?,
            rebuy: KeywordSet::new("rebuy_keywords", &lexicon.rebuy_keywords)?,
            churn: KeywordSet::new("churn_keywords", &lexicon.churn_keywords)?,
        })
    }

    /// First purchase reason in priority order
    pub fn reason_buy(&self, text: &str) -> String {
        self.reason_buy
            .first_match(text)
            .unwrap_or(REASON_OTHER)
            .to_string()
    }

    /// Repurchase reason; none for first purchases and negative reviews
    pub fn reason_rebuy(&self, report: &ContextReport<'_>, is_rebuy: bool) -> Option<String> {
        if !is_rebuy || report.negative_context || report.adversative_negative {
            return None;
        }
        Some(
            self.reason_rebuy
                .first_match(report.text)
                .unwrap_or(REASON_OTHER)
                .to_string(),
        )
    }

    pub fn switch_signal(&self, text: &str) -> bool {
        self.switch.contains_any(text)
    }

    /// First competitor brand named, in list order
    pub fn switch_to_brand(&self, text: &str) -> Option<String> {
        self.competitors
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, brand)| brand.clone())
    }

    pub fn loyalty(&self, text: &str) -> Loyalty {
        if self.loyal.contains_any(text) {
            Loyalty::Loyal
        } else if self.rebuy.contains_any(text) {
            Loyalty::Rebuy
        } else if self.churn.contains_any(text) {
            Loyalty::Churn
        } else {
            Loyalty::Neutral
        }
    }

    pub fn extract(&self, report: &ContextReport<'_>, is_rebuy: bool) -> ReviewSignals {
        let text = report.text;
        ReviewSignals {
            reason_buy: self.reason_buy(text),
            reason_rebuy: self.reason_rebuy(report, is_rebuy),
            switch_signal: self.switch_signal(text),
            switch_to_brand: self.switch_to_brand(text),
            loyalty: self.loyalty(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextDetector;

    struct Fixture {
        detector: ContextDetector,
        signals: SignalExtractor,
    }

    impl Fixture {
        fn new() -> Self {
            let lexicon = Lexicon::default();
            Self {
                detector: ContextDetector::new(&lexicon, 2).unwrap(),
                signals: SignalExtractor::new(&lexicon).unwrap(),
            }
        }

        fn extract(&self, text: &str, is_rebuy: bool) -> ReviewSignals {
            self.signals.extract(&self.detector.inspect(text), is_rebuy)
        }
    }

    #[test]
    fn test_reason_buy_priority() {
        let fx = Fixture::new();
        assert_eq!(fx.extract("촉촉하고 저렴해요", false).reason_buy, "가성비");
        assert_eq!(fx.extract("촉촉하고 진정돼요", false).reason_buy, "진정");
        assert_eq!(fx.extract("향이 좋아요", false).reason_buy, REASON_OTHER);
    }

    #[test]
    fn test_reason_rebuy_only_for_rebuys() {
        let fx = Fixture::new();
        assert_eq!(fx.extract("순해서 좋아요", false).reason_rebuy, None);
        assert_eq!(
            fx.extract("순해서 좋아요", true).reason_rebuy.as_deref(),
            Some("안전성")
        );
        assert_eq!(
            fx.extract("향이 좋아요", true).reason_rebuy.as_deref(),
            Some(REASON_OTHER)
        );
    }

    #[test]
    fn test_reason_rebuy_suppressed_in_negative_context() {
        let fx = Fixture::new();
        assert_eq!(fx.extract("순했는데 모낭염이 생겼어요", true).reason_rebuy, None);
    }

    #[test]
    fn test_switch_brand() {
        let fx = Fixture::new();
        let signals = fx.extract("토리든에서 갈아탔어요", false);
        assert!(signals.switch_signal);
        assert_eq!(signals.switch_to_brand.as_deref(), Some("토리든"));
    }

    #[test]
    fn test_loyalty_precedence() {
        let fx = Fixture::new();
        assert_eq!(fx.extract("최애 토너 재구매", false).loyalty, Loyalty::Loyal);
        assert_eq!(fx.extract("벌써 몇통째 재구매", false).loyalty, Loyalty::Rebuy);
        assert_eq!(fx.extract("다음엔 다른 제품 쓸래요", false).loyalty, Loyalty::Churn);
        assert_eq!(fx.extract("보통이에요", false).loyalty, Loyalty::Neutral);
    }
}
