//! Controlled-vocabulary tag extraction with context suppression

use crate::context::ContextReport;
use crate::lexicon::Lexicon;
use crate::matcher::{KeywordSet, TagTable};
use reviewlens_core::{ClassificationResult, Result, Sentiment};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tags extracted from one review
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSet {
    pub benefit: Vec<String>,
    pub texture: Vec<String>,
    pub usage: Vec<String>,
    pub value: Vec<String>,
}

/// Tag category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    Benefit,
    Texture,
    Usage,
    Value,
}

#[derive(Debug, Clone)]
pub struct Tagger {
    benefit: TagTable,
    texture: TagTable,
    usage: TagTable,
    value: TagTable,
    negative: KeywordSet,
    holy_grail_tag: String,
    aliases: BTreeMap<String, String>,
}

impl Tagger {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        Ok(Self {
            benefit: table("benefit", &lexicon.benefit)?,
            texture: table("texture", &lexicon.texture)?,
            usage: table("usage", &lexicon.usage)?,
            value: table("value", &lexicon.value)?,
            negative: KeywordSet::new("negative", &lexicon.negative)?,
            holy_grail_tag: lexicon.holy_grail_tag.clone(),
            aliases: lexicon.usage_aliases.clone(),
        })
    }

    fn table(&self, category: TagCategory) -> &TagTable {
        match category {
            TagCategory::Benefit => &self.benefit,
            TagCategory::Texture => &self.texture,
            TagCategory::Usage => &self.usage,
            TagCategory::Value => &self.value,
        }
    }

    /// Extract all four categories.
    ///
    /// Benefit and texture are always extracted. Usage and value are empty
    /// when the review is negative context, adversative-negative or
    /// past-negative-usage. The holy-grail value tag is also dropped when a
    /// past-usage marker meets any negative keyword.
    pub fn extract(&self, report: &ContextReport<'_>) -> TagSet {
        let text = report.text;
        let benefit = self.benefit.extract(text);
        let texture = self.texture.extract(text);

        if report.suppresses_tags() {
            return TagSet {
                benefit,
                texture,
                ..Default::default()
            };
        }

        let mut value = self.value.extract(text);
        if report.past_usage && self.negative.contains_any(text) {
            value.retain(|tag| *tag != self.holy_grail_tag);
        }

        TagSet {
            benefit,
            texture,
            usage: self.usage.extract(text),
            value,
        }
    }

    /// Map spellings through the alias table, drop tags outside the
    /// vocabulary and deduplicate, in vocabulary order
    pub fn canonicalize(&self, category: TagCategory, tags: &[String]) -> Vec<String> {
        let mapped: Vec<&str> = tags
            .iter()
            .map(|tag| {
                let tag = tag.trim();
                self.aliases.get(tag).map_or(tag, String::as_str)
            })
            .collect();

        self.table(category)
            .tags()
            .filter(|tag| mapped.contains(tag))
            .map(str::to_string)
            .collect()
    }

    /// Re-apply the hard invariants to a result from any source: skin issue
    /// forces NEG, flagged reviews carry no usage or value tags, and every tag
    /// belongs to the vocabulary.
    pub fn enforce_guards(&self, result: &mut ClassificationResult) {
        if result.flags.has_skin_issue() {
            result.sentiment = Sentiment::Neg;
        }

        result.benefit_tags = self.canonicalize(TagCategory::Benefit, &result.benefit_tags);
        result.texture_tags = self.canonicalize(TagCategory::Texture, &result.texture_tags);
        result.usage_tags = self.canonicalize(TagCategory::Usage, &result.usage_tags);
        result.value_tags = self.canonicalize(TagCategory::Value, &result.value_tags);

        if result.flags.suppresses_tags() {
            result.usage_tags.clear();
            result.value_tags.clear();
        }
    }
}

fn table(name: &str, entries: &[crate::lexicon::TagEntry]) -> Result<TagTable> {
    TagTable::new(
        name,
        entries
            .iter()
            .map(|entry| (entry.tag.as_str(), entry.keywords.as_slice())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextDetector;
    use reviewlens_core::ContextFlags;

    struct Fixture {
        detector: ContextDetector,
        tagger: Tagger,
    }

    impl Fixture {
        fn new() -> Self {
            let lexicon = Lexicon::default();
            Self {
                detector: ContextDetector::new(&lexicon, 2).unwrap(),
                tagger: Tagger::new(&lexicon).unwrap(),
            }
        }

        fn tags(&self, text: &str) -> TagSet {
            self.tagger.extract(&self.detector.inspect(text))
        }
    }

    #[test]
    fn test_plain_extraction() {
        let fx = Fixture::new();
        let tags = fx.tags("정말 촉촉하고 좋아요! 닦토로 쓰니까 각질도 잘 정리되네요");
        assert_eq!(tags.benefit, vec!["보습", "결"]);
        assert_eq!(tags.usage, vec!["닦토"]);
        assert!(tags.value.is_empty());
    }

    #[test]
    fn test_negative_context_suppresses_usage_and_value_only() {
        let fx = Fixture::new();
        let tags = fx.tags("닦토로 쓰다가 모낭염 생겨서 중단, 보습은 인생템급");
        assert_eq!(tags.benefit, vec!["보습"]);
        assert!(tags.usage.is_empty());
        assert!(tags.value.is_empty());
    }

    #[test]
    fn test_holy_grail_dropped_for_past_usage_with_negative_keyword() {
        let fx = Fixture::new();
        // one negative-context hit is not enough for negative context
        let tags = fx.tags("예전엔 인생템이었고 가성비 좋고 냄새도 괜찮아요");
        assert_eq!(tags.value, vec!["가성비"]);
    }

    #[test]
    fn test_holy_grail_kept_without_negative_turn() {
        let fx = Fixture::new();
        let tags = fx.tags("인생템이에요 계속 재구매하고 있어요 촉촉하고 순해서 좋아요");
        assert_eq!(tags.value, vec!["인생템"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let fx = Fixture::new();
        let text = "물같이 가볍고 흡수 잘 되고 스킨팩으로도 좋아요";
        assert_eq!(fx.tags(text), fx.tags(text));
    }

    #[test]
    fn test_canonicalize_maps_aliases_and_orders() {
        let fx = Fixture::new();
        let tags = vec![
            "바디".to_string(),
            "토너팩".to_string(),
            "닥토".to_string(),
            "닦토".to_string(),
            "흡토".to_string(),
        ];
        assert_eq!(
            fx.tagger.canonicalize(TagCategory::Usage, &tags),
            vec!["닦토", "스킨팩", "바디"]
        );
    }

    #[test]
    fn test_enforce_guards() {
        let fx = Fixture::new();
        let mut result = ClassificationResult {
            sentiment: Sentiment::Pos,
            usage_tags: vec!["닦토".to_string()],
            value_tags: vec!["인생템".to_string()],
            benefit_tags: vec!["보습".to_string(), "미백".to_string()],
            flags: ContextFlags {
                skin_issues: vec!["모낭염".to_string()],
                negative_context: true,
                ..Default::default()
            },
            ..Default::default()
        };

        fx.tagger.enforce_guards(&mut result);
        assert_eq!(result.sentiment, Sentiment::Neg);
        assert!(result.usage_tags.is_empty());
        assert!(result.value_tags.is_empty());
        assert_eq!(result.benefit_tags, vec!["보습"]);
    }
}
