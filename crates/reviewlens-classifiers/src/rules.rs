//! Ordered sentiment rules
//!
//! Rules are evaluated in priority order and the first one that yields a
//! label wins. `RatingBaseline` always yields, which keeps the rule list
//! total.

use crate::config::{AdversativePolicy, RuleSettings};
use reviewlens_core::Sentiment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signals a sentiment rule may look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub empty_text: bool,
    /// Label implied by the star rating
    pub base: Sentiment,
    pub skin_issue: bool,
    pub discontinued: bool,
    pub past_negative_usage: bool,
    pub adversative_found: bool,
    /// NEGATIVE hits in the non-empty after-clause
    pub after_negative: usize,
    /// POSITIVE hits in the relevant text
    pub pos: usize,
    /// NEGATIVE hits in the relevant text
    pub neg: usize,
    /// Negative-context hits in the relevant text
    pub negative_context: usize,
}

/// Rule identifiers in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    EmptyText,
    SkinIssue,
    Discontinuation,
    PastUsageNegative,
    AdversativeNegative,
    KeywordOverride,
    NegativeContextDowngrade,
    NegativeKeywordDowngrade,
    PositiveUpgrade,
    RatingBaseline,
}

impl RuleId {
    pub const ALL: [RuleId; 10] = [
        RuleId::EmptyText,
        RuleId::SkinIssue,
        RuleId::Discontinuation,
        RuleId::PastUsageNegative,
        RuleId::AdversativeNegative,
        RuleId::KeywordOverride,
        RuleId::NegativeContextDowngrade,
        RuleId::NegativeKeywordDowngrade,
        RuleId::PositiveUpgrade,
        RuleId::RatingBaseline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::SkinIssue => "skin_issue",
            Self::Discontinuation => "discontinuation",
            Self::PastUsageNegative => "past_usage_negative",
            Self::AdversativeNegative => "adversative_negative",
            Self::KeywordOverride => "keyword_override",
            Self::NegativeContextDowngrade => "negative_context_downgrade",
            Self::NegativeKeywordDowngrade => "negative_keyword_downgrade",
            Self::PositiveUpgrade => "positive_upgrade",
            Self::RatingBaseline => "rating_baseline",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::EmptyText => "empty review text is neutral",
            Self::SkinIssue => "adverse skin reaction is negative regardless of rating",
            Self::Discontinuation => "stopped using the product",
            Self::PastUsageNegative => "used to like it, negative now",
            Self::AdversativeNegative => "negative clause after an adversative connective",
            Self::KeywordOverride => "negative keywords outnumber positive ones",
            Self::NegativeContextDowngrade => "positive rating with dense negative context",
            Self::NegativeKeywordDowngrade => "positive rating with several negative keywords",
            Self::PositiveUpgrade => "neutral rating with clearly positive text",
            Self::RatingBaseline => "label implied by the star rating",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the rule list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentRule {
    pub id: RuleId,

    /// Disabled rules are skipped
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl SentimentRule {
    pub fn new(id: RuleId) -> Self {
        Self { id, enabled: true }
    }

    /// Label this rule yields for the evidence, if it fires
    pub fn evaluate(&self, ev: &Evidence, settings: &RuleSettings) -> Option<Sentiment> {
        match self.id {
            RuleId::EmptyText => ev.empty_text.then_some(Sentiment::Neu),
            RuleId::SkinIssue => ev.skin_issue.then_some(Sentiment::Neg),
            RuleId::Discontinuation => ev.discontinued.then_some(Sentiment::Neg),
            RuleId::PastUsageNegative => (ev.past_negative_usage
                && ev.negative_context >= settings.past_usage_min_context)
                .then_some(Sentiment::Neg),
            RuleId::AdversativeNegative => {
                if !(ev.adversative_found && ev.after_negative >= settings.adversative_min_negative)
                {
                    return None;
                }
                match settings.adversative_policy {
                    AdversativePolicy::ForceNegative => Some(Sentiment::Neg),
                    AdversativePolicy::DowngradeNeutral if ev.base == Sentiment::Pos => {
                        Some(Sentiment::Neu)
                    }
                    AdversativePolicy::DowngradeNeutral => Some(ev.base),
                }
            }
            RuleId::KeywordOverride => {
                if !(ev.neg > ev.pos && ev.neg >= settings.keyword_override_min) {
                    return None;
                }
                match ev.base {
                    Sentiment::Pos | Sentiment::Neg => Some(Sentiment::Neg),
                    Sentiment::Neu => Some(Sentiment::Neu),
                }
            }
            RuleId::NegativeContextDowngrade => (ev.base == Sentiment::Pos
                && ev.negative_context >= settings.negative_context_downgrade)
                .then_some(Sentiment::Neu),
            RuleId::NegativeKeywordDowngrade => (ev.base == Sentiment::Pos
                && ev.neg >= settings.negative_keyword_downgrade)
                .then_some(Sentiment::Neu),
            RuleId::PositiveUpgrade => (ev.base == Sentiment::Neu
                && ev.neg == 0
                && ev.pos >= settings.positive_upgrade)
                .then_some(Sentiment::Pos),
            RuleId::RatingBaseline => Some(ev.base),
        }
    }
}

/// The canonical rule list, all enabled
pub fn default_rules() -> Vec<SentimentRule> {
    RuleId::ALL.into_iter().map(SentimentRule::new).collect()
}

/// Outcome of rule evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub sentiment: Sentiment,
    /// The rule that fired
    pub rule: RuleId,
    pub evidence: Evidence,
}

/// Evaluate `rules` in order; falls back to the rating baseline
pub fn evaluate_rules(rules: &[SentimentRule], evidence: Evidence, settings: &RuleSettings) -> Decision {
    let fired = rules
        .iter()
        .filter(|rule| rule.enabled)
        .find_map(|rule| rule.evaluate(&evidence, settings).map(|s| (s, rule.id)));

    let (sentiment, rule) = fired.unwrap_or((evidence.base, RuleId::RatingBaseline));
    Decision {
        sentiment,
        rule,
        evidence,
    }
}
