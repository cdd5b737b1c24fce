//! Core types for reviewlens

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback label for purchase reasons that match no category
pub const REASON_OTHER: &str = "기타";

/// Star rating, always within `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside `1..=5`
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::ingest(format!(
                "rating {value} outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Create a rating, clamping out-of-range values into `1..=5`
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| Error::ingest(format!("rating {value} outside 1..=5")))
            .and_then(Rating::new)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata carried alongside a review; opaque to the classifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Purchase tag shown by the storefront (e.g. "재구매")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_tag: Option<String>,

    /// Input fields not recognized by ingestion, passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single product review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Review body; missing text is represented as the empty string
    #[serde(default)]
    pub text: String,

    pub rating: Rating,

    #[serde(flatten)]
    pub meta: ReviewMeta,
}

impl Review {
    /// Create a review without metadata
    pub fn new(text: impl Into<String>, rating: Rating) -> Self {
        Self {
            text: text.into(),
            rating,
            meta: ReviewMeta::default(),
        }
    }

    /// Attach metadata
    pub fn with_meta(mut self, meta: ReviewMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Whether the storefront marked this purchase as a repurchase
    pub fn is_rebuy(&self) -> bool {
        self.meta
            .purchase_tag
            .as_deref()
            .is_some_and(|tag| tag.contains("재구매"))
    }
}

/// Review polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "POS")]
    Pos,
    #[serde(rename = "NEU")]
    Neu,
    #[serde(rename = "NEG")]
    Neg,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Pos, Sentiment::Neu, Sentiment::Neg];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pos => "POS",
            Self::Neu => "NEU",
            Self::Neg => "NEG",
        }
    }

    /// Label implied by the star rating alone
    pub fn from_rating(rating: Rating) -> Self {
        match rating.get() {
            4..=5 => Self::Pos,
            1..=2 => Self::Neg,
            _ => Self::Neu,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POS" | "POSITIVE" => Ok(Self::Pos),
            "NEU" | "NEUTRAL" => Ok(Self::Neu),
            "NEG" | "NEGATIVE" => Ok(Self::Neg),
            other => Err(Error::classifier(format!("unknown sentiment label: {other}"))),
        }
    }
}

/// Intensity of the expressed emotion, independent of polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    #[serde(rename = "STRONG")]
    Strong,
    #[serde(rename = "MID")]
    Mid,
    #[serde(rename = "WEAK")]
    Weak,
}

impl Strength {
    pub const ALL: [Strength; 3] = [Strength::Strong, Strength::Mid, Strength::Weak];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "STRONG",
            Self::Mid => "MID",
            Self::Weak => "WEAK",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRONG" => Ok(Self::Strong),
            "MID" | "MEDIUM" => Ok(Self::Mid),
            "WEAK" => Ok(Self::Weak),
            other => Err(Error::classifier(format!("unknown strength label: {other}"))),
        }
    }
}

/// Context conditions detected in the review text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFlags {
    /// Adverse skin reaction terms found in the text
    #[serde(default)]
    pub skin_issues: Vec<String>,

    /// An adversative connective split the text
    #[serde(default)]
    pub has_adversative: bool,

    /// "Stopped using / threw away" language present
    #[serde(default)]
    pub discontinued: bool,

    /// Skin issue, discontinuation, or dense negative-context language
    #[serde(default)]
    pub negative_context: bool,

    /// The clause after the adversative connective is negative
    #[serde(default)]
    pub adversative_negative: bool,

    /// Past usage marker co-occurring with negative language
    #[serde(default)]
    pub past_negative_usage: bool,
}

impl ContextFlags {
    pub fn has_skin_issue(&self) -> bool {
        !self.skin_issues.is_empty()
    }

    /// Whether usage/value tag extraction must be suppressed
    pub fn suppresses_tags(&self) -> bool {
        self.negative_context || self.adversative_negative || self.past_negative_usage
    }
}

/// Repurchase / churn signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loyalty {
    Loyal,
    Rebuy,
    Churn,
    #[default]
    Neutral,
}

impl Loyalty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loyal => "loyal",
            Self::Rebuy => "rebuy",
            Self::Churn => "churn",
            Self::Neutral => "neutral",
        }
    }
}

/// Purchase and brand-switch signals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSignals {
    /// Primary purchase reason
    pub reason_buy: String,

    /// Repurchase reason; only present for repurchases outside negative context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_rebuy: Option<String>,

    #[serde(default)]
    pub switch_signal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_to_brand: Option<String>,

    #[serde(default)]
    pub loyalty: Loyalty,
}

impl Default for ReviewSignals {
    fn default() -> Self {
        Self {
            reason_buy: REASON_OTHER.to_string(),
            reason_rebuy: None,
            switch_signal: false,
            switch_to_brand: None,
            loyalty: Loyalty::Neutral,
        }
    }
}

/// Which path produced a classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    #[default]
    Keyword,
    Llm,
    LlmFallback,
}

/// Classification of a single review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub sentiment: Sentiment,
    pub strength: Strength,

    #[serde(default)]
    pub benefit_tags: Vec<String>,
    #[serde(default)]
    pub texture_tags: Vec<String>,
    #[serde(default)]
    pub usage_tags: Vec<String>,
    #[serde(default)]
    pub value_tags: Vec<String>,

    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub positive_points: Vec<String>,

    #[serde(default)]
    pub flags: ContextFlags,

    #[serde(default)]
    pub signals: ReviewSignals,

    #[serde(default)]
    pub source: ResultSource,

    /// Set when LLM enrichment failed for this review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

impl ClassificationResult {
    /// Neutral result with no tags, used for empty text and enrichment fallbacks
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neu,
            strength: Strength::Mid,
            benefit_tags: Vec::new(),
            texture_tags: Vec::new(),
            usage_tags: Vec::new(),
            value_tags: Vec::new(),
            pain_points: Vec::new(),
            positive_points: Vec::new(),
            flags: ContextFlags::default(),
            signals: ReviewSignals::default(),
            source: ResultSource::Keyword,
            enrichment_error: None,
        }
    }

    /// Whether any of the four tag categories is non-empty
    pub fn has_tags(&self) -> bool {
        !(self.benefit_tags.is_empty()
            && self.texture_tags.is_empty()
            && self.usage_tags.is_empty()
            && self.value_tags.is_empty())
    }
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Flat output row: the review plus its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedReview {
    /// Position of the review in the input collection
    pub index: usize,

    #[serde(flatten)]
    pub review: Review,

    #[serde(flatten)]
    pub result: ClassificationResult,
}

/// Role of a chat message sent to an LLM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A chat message in an LLM conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert_eq!(Rating::clamped(9).get(), 5);
        assert_eq!(Rating::clamped(-3).get(), 1);
    }

    #[test]
    fn test_rating_deserialization_rejects_out_of_range() {
        let ok: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }

    #[test]
    fn test_sentiment_from_rating() {
        assert_eq!(Sentiment::from_rating(Rating::clamped(5)), Sentiment::Pos);
        assert_eq!(Sentiment::from_rating(Rating::clamped(4)), Sentiment::Pos);
        assert_eq!(Sentiment::from_rating(Rating::clamped(3)), Sentiment::Neu);
        assert_eq!(Sentiment::from_rating(Rating::clamped(2)), Sentiment::Neg);
        assert_eq!(Sentiment::from_rating(Rating::clamped(1)), Sentiment::Neg);
    }

    #[test]
    fn test_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Sentiment::Neg).unwrap();
        assert_eq!(json, "\"NEG\"");
        assert_eq!(" pos ".parse::<Sentiment>().unwrap(), Sentiment::Pos);
        assert_eq!("mid".parse::<Strength>().unwrap(), Strength::Mid);
        assert!("maybe".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_rebuy_flag() {
        let review = Review::new("좋아요", Rating::clamped(5)).with_meta(ReviewMeta {
            purchase_tag: Some("재구매".to_string()),
            ..Default::default()
        });
        assert!(review.is_rebuy());
        assert!(!Review::new("좋아요", Rating::clamped(5)).is_rebuy());
    }

    #[test]
    fn test_analyzed_review_flattens_fields() {
        let row = AnalyzedReview {
            index: 3,
            review: Review::new("무난해요", Rating::clamped(3)),
            result: ClassificationResult::neutral(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["index"], 3);
        assert_eq!(value["text"], "무난해요");
        assert_eq!(value["sentiment"], "NEU");
        assert_eq!(value["strength"], "MID");
    }
}
