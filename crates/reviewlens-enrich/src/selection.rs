//! Selection of reviews worth sending to the LLM
//!
//! Ambiguity score per review:
//! - +3 when the keyword path said NEU
//! - +2 when rating and strength disagree (5 stars but WEAK, 1-2 stars but STRONG)
//! - +1 when the text is long but no benefit or texture tag was found

use reviewlens_core::{AnalyzedReview, Sentiment, Strength};
use serde::{Deserialize, Serialize};

/// Which reviews to enrich
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionScope {
    /// Ambiguous reviews, highest score first
    #[default]
    Ambiguous,
    /// Every review, in input order
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub scope: SelectionScope,

    /// Cap on selected reviews
    #[serde(default = "default_max_samples")]
    pub max_samples: Option<usize>,

    /// Character count from which an untagged review counts as ambiguous
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
}

fn default_max_samples() -> Option<usize> {
    Some(3000)
}

fn default_min_text_chars() -> usize {
    30
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            scope: SelectionScope::default(),
            max_samples: default_max_samples(),
            min_text_chars: default_min_text_chars(),
        }
    }
}

pub fn ambiguity_score(row: &AnalyzedReview, min_text_chars: usize) -> u32 {
    let result = &row.result;
    let rating = row.review.rating.get();
    let mut score = 0;

    if result.sentiment == Sentiment::Neu {
        score += 3;
    }
    if (rating == 5 && result.strength == Strength::Weak)
        || (rating <= 2 && result.strength == Strength::Strong)
    {
        score += 2;
    }
    if row.review.text.chars().count() >= min_text_chars
        && result.benefit_tags.is_empty()
        && result.texture_tags.is_empty()
    {
        score += 1;
    }
    score
}

/// Positions into `rows` to enrich, in processing order
pub fn select(rows: &[AnalyzedReview], config: &SelectionConfig) -> Vec<usize> {
    let mut selected: Vec<usize> = match config.scope {
        SelectionScope::All => (0..rows.len()).collect(),
        SelectionScope::Ambiguous => {
            let mut scored: Vec<(usize, u32)> = rows
                .iter()
                .enumerate()
                .map(|(pos, row)| (pos, ambiguity_score(row, config.min_text_chars)))
                .filter(|(_, score)| *score >= 1)
                .collect();
            // stable: equal scores keep input order
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            scored.into_iter().map(|(pos, _)| pos).collect()
        }
    };

    if let Some(max) = config.max_samples {
        selected.truncate(max);
    }
    selected
}
