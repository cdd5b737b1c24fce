//! Context detection: adversative clauses, skin reactions, discontinuation
//! and past-usage-then-negative patterns.
//!
//! Korean reviews often read "[positive setup] + connective + [negative
//! payoff]". Splitting on the connective lets the payoff clause drive the
//! decision instead of the longer setup clause.

use crate::lexicon::Lexicon;
use crate::matcher::KeywordSet;
use reviewlens_core::{ContextFlags, Result};
use serde::Serialize;

/// Result of splitting text on the first adversative connective found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdversativeSplit<'a> {
    pub before: &'a str,
    pub after: &'a str,
    pub connective: Option<&'a str>,
}

impl<'a> AdversativeSplit<'a> {
    fn none(text: &'a str) -> Self {
        Self {
            before: text,
            after: "",
            connective: None,
        }
    }

    pub fn found(&self) -> bool {
        self.connective.is_some()
    }

    /// The after-clause when a split was found and it is non-empty
    pub fn payoff(&self) -> Option<&'a str> {
        match self.connective {
            Some(_) if !self.after.trim().is_empty() => Some(self.after),
            _ => None,
        }
    }
}

/// Detects contextual conditions that override plain keyword counts
#[derive(Debug, Clone)]
pub struct ContextDetector {
    adversative: Vec<String>,
    skin_issue: KeywordSet,
    discontinuation: KeywordSet,
    negative_context: KeywordSet,
    past_usage: KeywordSet,
    negative_context_threshold: usize,
}

impl ContextDetector {
    /// Build from lexicon tables; `negative_context_threshold` is the number of
    /// distinct negative-context hits that alone mark a review as negative
    pub fn new(lexicon: &Lexicon, negative_context_threshold: usize) -> Result<Self> {
        Ok(Self {
            adversative: lexicon
                .adversative
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            skin_issue: KeywordSet::new("skin_issue", &lexicon.skin_issue)?,
            discontinuation: KeywordSet::new("discontinuation", &lexicon.discontinuation)?,
            negative_context: KeywordSet::new("negative_context", &lexicon.negative_context)?,
            past_usage: KeywordSet::new("past_usage", &lexicon.past_usage)?,
            negative_context_threshold,
        })
    }

    /// Split on the highest-priority connective present anywhere in `text`,
    /// at its first occurrence
    pub fn detect_adversative<'a>(&'a self, text: &'a str) -> AdversativeSplit<'a> {
        for pattern in &self.adversative {
            if let Some(pos) = text.find(pattern.as_str()) {
                return AdversativeSplit {
                    before: &text[..pos],
                    after: &text[pos + pattern.len()..],
                    connective: Some(pattern.as_str()),
                };
            }
        }
        AdversativeSplit::none(text)
    }

    /// Skin reaction terms present, in lexicon order
    pub fn detect_skin_issue(&self, text: &str) -> Vec<String> {
        self.skin_issue
            .matches(text)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn detect_discontinuation(&self, text: &str) -> bool {
        self.discontinuation.contains_any(text)
    }

    /// A past-usage marker and a discontinuation or negative-context term
    /// both appear
    pub fn detect_past_usage_then_negative(&self, text: &str) -> bool {
        self.past_usage.contains_any(text)
            && (self.discontinuation.contains_any(text) || self.negative_context.contains_any(text))
    }

    pub fn count_negative_context(&self, text: &str) -> usize {
        self.negative_context.score(text)
    }

    pub fn has_past_usage(&self, text: &str) -> bool {
        self.past_usage.contains_any(text)
    }

    pub fn is_negative_context(&self, text: &str) -> bool {
        self.skin_issue.contains_any(text)
            || self.discontinuation.contains_any(text)
            || self.count_negative_context(text) >= self.negative_context_threshold
    }

    /// Any connective present in `text` is followed by a discontinuation,
    /// negative-context or skin-issue term. Unlike [`Self::detect_adversative`]
    /// every connective is tried, each split at its first occurrence.
    pub fn is_adversative_negative(&self, text: &str) -> bool {
        self.adversative.iter().any(|pattern| {
            text.find(pattern.as_str())
                .map(|pos| &text[pos + pattern.len()..])
                .is_some_and(|after| self.is_payoff_negative(after))
        })
    }

    fn is_payoff_negative(&self, after: &str) -> bool {
        self.discontinuation.contains_any(after)
            || self.negative_context.contains_any(after)
            || self.skin_issue.contains_any(after)
    }

    /// Evaluate every detector once over normalized text
    pub fn inspect<'a>(&'a self, text: &'a str) -> ContextReport<'a> {
        let split = self.detect_adversative(text);
        let skin_issues = self.detect_skin_issue(text);
        let discontinued = self.detect_discontinuation(text);
        let negative_context_hits = self.count_negative_context(text);
        let negative_context = !skin_issues.is_empty()
            || discontinued
            || negative_context_hits >= self.negative_context_threshold;
        let adversative_negative = self.is_adversative_negative(text);

        let relevant = split.payoff().unwrap_or(text);
        let relevant_negative_context_hits = if relevant.len() == text.len() {
            negative_context_hits
        } else {
            self.count_negative_context(relevant)
        };

        ContextReport {
            text,
            split,
            past_usage: self.has_past_usage(text),
            past_negative_usage: self.detect_past_usage_then_negative(text),
            skin_issues,
            discontinued,
            negative_context_hits,
            relevant_negative_context_hits,
            negative_context,
            adversative_negative,
        }
    }
}

/// All context signals for one review
#[derive(Debug, Clone, Serialize)]
pub struct ContextReport<'a> {
    /// Normalized review text
    pub text: &'a str,
    pub split: AdversativeSplit<'a>,
    pub skin_issues: Vec<String>,
    pub discontinued: bool,
    pub past_usage: bool,
    pub past_negative_usage: bool,
    /// Distinct negative-context hits over the full text
    pub negative_context_hits: usize,
    /// Distinct negative-context hits over the relevant text
    pub relevant_negative_context_hits: usize,
    pub negative_context: bool,
    pub adversative_negative: bool,
}

impl<'a> ContextReport<'a> {
    /// The after-clause when a non-empty split was found, else the full text
    pub fn relevant_text(&self) -> &'a str {
        self.split.payoff().unwrap_or(self.text)
    }

    pub fn has_skin_issue(&self) -> bool {
        !self.skin_issues.is_empty()
    }

    pub fn suppresses_tags(&self) -> bool {
        self.negative_context || self.adversative_negative || self.past_negative_usage
    }

    pub fn flags(&self) -> ContextFlags {
        ContextFlags {
            skin_issues: self.skin_issues.clone(),
            has_adversative: self.split.found(),
            discontinued: self.discontinued,
            negative_context: self.negative_context,
            adversative_negative: self.adversative_negative,
            past_negative_usage: self.past_negative_usage,
        }
    }
}
