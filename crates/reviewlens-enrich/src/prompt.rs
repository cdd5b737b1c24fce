//! Prompt construction and response parsing

use crate::provider::LlmError;
use reviewlens_core::{ChatMessage, Rating, Sentiment, Strength};
use serde::{Deserialize, Serialize};

/// Reviews are cut to this many characters before prompting
pub const MAX_REVIEW_CHARS: usize = 500;

const SYSTEM_PROMPT: &str = "당신은 화장품 리뷰를 분류하는 분석가입니다. 요청한 JSON 객체 하나만 출력하세요.";

/// Truncate to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the chat messages asking for a judgement of one review
pub fn build_messages(text: &str, rating: Rating) -> Vec<ChatMessage> {
    let review = truncate_chars(text.trim(), MAX_REVIEW_CHARS);
    let user = format!(
        r#"토너 리뷰 하나를 분류해 주세요.

별점: {rating}/5
리뷰: "{review}"

아래 형식의 JSON으로만 답하세요.
{{
  "sentiment": "POS | NEU | NEG",
  "strength": "STRONG | MID | WEAK",
  "benefit_tags": ["진정", "보습", "장벽", "결", "피지" 중 언급된 것],
  "texture_tags": ["물같음", "쫀쫀", "끈적", "흡수" 중 언급된 것],
  "usage_tags": ["닦토", "스킨팩", "레이어링", "바디" 중 언급된 것],
  "pain_points": [불만 사항을 짧은 구절로],
  "positive_points": [만족 사항을 짧은 구절로],
  "reason_buy": "가성비 | 진정 | 보습 | 대용량 | 기타"
}}

기준:
- sentiment: 전체 만족도. 별점이 높아도 피부 트러블이나 사용 중단이 있으면 NEG
- strength: 감정의 강도. 무난하거나 애매하면 WEAK
- 태그와 포인트는 리뷰에 근거가 있을 때만, 없으면 빈 배열
- reason_buy: 구매 이유가 분명하지 않으면 "기타""#
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// Remove a surrounding ``` fence (optionally tagged `json`)
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// A structured judgement returned by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmJudgement {
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<Strength>,
    #[serde(default)]
    pub benefit_tags: Vec<String>,
    #[serde(default)]
    pub texture_tags: Vec<String>,
    #[serde(default)]
    pub usage_tags: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub positive_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_buy: Option<String>,
}

impl LlmJudgement {
    /// Fallback stored for reviews whose enrichment failed
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neu,
            strength: Some(Strength::Mid),
            benefit_tags: Vec::new(),
            texture_tags: Vec::new(),
            usage_tags: Vec::new(),
            pain_points: Vec::new(),
            positive_points: Vec::new(),
            reason_buy: None,
        }
    }
}

/// Lenient wire shape: labels as free strings, lists possibly as a single
/// string or null
#[derive(Deserialize)]
struct RawJudgement {
    sentiment: String,
    #[serde(default)]
    strength: Option<String>,
    #[serde(default)]
    benefit_tags: Option<StringOrList>,
    #[serde(default)]
    texture_tags: Option<StringOrList>,
    #[serde(default)]
    usage_tags: Option<StringOrList>,
    #[serde(default)]
    pain_points: Option<StringOrList>,
    #[serde(default)]
    positive_points: Option<StringOrList>,
    #[serde(default)]
    reason_buy: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

fn into_list(value: Option<StringOrList>) -> Vec<String> {
    let items = match value {
        None => Vec::new(),
        Some(StringOrList::One(item)) => vec![item],
        Some(StringOrList::Many(items)) => items,
    };
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse a model response into a judgement. Malformed JSON and unknown
/// sentiment labels are errors; an unknown strength label is dropped.
pub fn parse_judgement(content: &str) -> Result<LlmJudgement, LlmError> {
    let body = strip_code_fence(content);
    let raw: RawJudgement = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("malformed judgement JSON: {e}")))?;

    let sentiment = raw
        .sentiment
        .parse::<Sentiment>()
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    Ok(LlmJudgement {
        sentiment,
        strength: raw.strength.and_then(|s| s.parse::<Strength>().ok()),
        benefit_tags: into_list(raw.benefit_tags),
        texture_tags: into_list(raw.texture_tags),
        usage_tags: into_list(raw.usage_tags),
        pain_points: into_list(raw.pain_points),
        positive_points: into_list(raw.positive_points),
        reason_buy: raw
            .reason_buy
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        let text = "가".repeat(600);
        assert_eq!(truncate_chars(&text, MAX_REVIEW_CHARS).chars().count(), 500);
        assert_eq!(truncate_chars("짧아요", 500), "짧아요");
    }

    #[test]
    fn test_prompt_contains_truncated_review() {
        let text = format!("{}끝", "가".repeat(600));
        let messages = build_messages(&text, Rating::clamped(5));
        assert_eq!(messages.len(), 2);
        assert!(!messages[1].content.contains('끝'));
        assert!(messages[1].content.contains("별점: 5/5"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_judgement() {
        let content = r#"```json
{"sentiment": "neg", "strength": "WEAK", "benefit_tags": ["보습"], "usage_tags": "닦토",
 "pain_points": ["따가움", " "], "reason_buy": "가성비"}
```"#;
        let judgement = parse_judgement(content).unwrap();
        assert_eq!(judgement.sentiment, Sentiment::Neg);
        assert_eq!(judgement.strength, Some(Strength::Weak));
        assert_eq!(judgement.usage_tags, vec!["닦토"]);
        assert_eq!(judgement.pain_points, vec!["따가움"]);
        assert_eq!(judgement.reason_buy.as_deref(), Some("가성비"));
        assert!(judgement.texture_tags.is_empty());
    }

    #[test]
    fn test_unknown_sentiment_is_invalid() {
        let err = parse_judgement(r#"{"sentiment": "MIXED"}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_malformed_json_is_invalid() {
        assert!(parse_judgement("sentiment: POS").is_err());
    }

    #[test]
    fn test_unknown_strength_dropped() {
        let judgement = parse_judgement(r#"{"sentiment": "POS", "strength": "HUGE"}"#).unwrap();
        assert_eq!(judgement.strength, None);
    }
}
