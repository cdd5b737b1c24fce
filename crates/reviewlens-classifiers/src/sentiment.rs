//! Sentiment reconciliation: star rating combined with content signals

use crate::config::RuleSettings;
use crate::context::ContextReport;
use crate::lexicon::Lexicon;
use crate::matcher::KeywordSet;
use crate::rules::{default_rules, evaluate_rules, Decision, Evidence, SentimentRule};
use reviewlens_core::{Rating, Result, Sentiment};

/// Decides the sentiment label from a context report and the rating
#[derive(Debug, Clone)]
pub struct Reconciler {
    positive: KeywordSet,
    negative: KeywordSet,
    rules: Vec<SentimentRule>,
    settings: RuleSettings,
}

impl Reconciler {
    pub fn new(lexicon: &Lexicon, settings: RuleSettings) -> Result<Self> {
        Ok(Self {
            positive: KeywordSet::new("positive", &lexicon.positive)?,
            negative: KeywordSet::new("negative", &lexicon.negative)?,
            rules: default_rules(),
            settings,
        })
    }

    /// Replace the rule list
    pub fn with_rules(mut self, rules: Vec<SentimentRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[SentimentRule] {
        &self.rules
    }

    pub fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Distinct POSITIVE hits
    pub fn positive_score(&self, text: &str) -> usize {
        self.positive.score(text)
    }

    /// Distinct NEGATIVE hits
    pub fn negative_score(&self, text: &str) -> usize {
        self.negative.score(text)
    }

    /// Gather the evidence the rules look at
    pub fn evidence(&self, report: &ContextReport<'_>, rating: Rating) -> Evidence {
        let relevant = report.relevant_text();
        Evidence {
            empty_text: report.text.trim().is_empty(),
            base: Sentiment::from_rating(rating),
            skin_issue: report.has_skin_issue(),
            discontinued: report.discontinued,
            past_negative_usage: report.past_negative_usage,
            adversative_found: report.split.found(),
            after_negative: report
                .split
                .payoff()
                .map_or(0, |after| self.negative.score(after)),
            pos: self.positive.score(relevant),
            neg: self.negative.score(relevant),
            negative_context: report.relevant_negative_context_hits,
        }
    }

    /// Run the rule list and report which rule fired
    pub fn decide(&self, report: &ContextReport<'_>, rating: Rating) -> Decision {
        evaluate_rules(&self.rules, self.evidence(report, rating), &self.settings)
    }
}
