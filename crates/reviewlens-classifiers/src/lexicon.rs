//! Keyword tables used by the review classifiers
//!
//! Every table is plain data. `Lexicon::default()` carries the built-in Korean
//! toner vocabulary; YAML files may replace any subset of tables, missing
//! tables fall back to the defaults.

use regex::Regex;
use reviewlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A controlled-vocabulary tag and the substrings that trigger it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub tag: String,
    pub keywords: Vec<String>,
}

/// A labelled regex category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub label: String,
    pub pattern: String,
}

/// All keyword tables consumed by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub strong_markers: Vec<String>,
    pub weak_markers: Vec<String>,
    /// Terms that make a review STRONG on their own
    pub superlatives: Vec<String>,
    pub skin_issue: Vec<String>,
    /// Adversative connectives in priority order
    pub adversative: Vec<String>,
    pub discontinuation: Vec<String>,
    pub negative_context: Vec<String>,
    pub past_usage: Vec<String>,

    pub benefit: Vec<TagEntry>,
    pub texture: Vec<TagEntry>,
    pub usage: Vec<TagEntry>,
    pub value: Vec<TagEntry>,
    /// Value tag withheld from any review reporting a negative turn
    pub holy_grail_tag: String,

    pub pain_points: Vec<PatternEntry>,
    pub positive_points: Vec<PatternEntry>,

    /// Purchase reasons in priority order
    pub reason_buy: Vec<TagEntry>,
    /// Repurchase reasons in priority order
    pub reason_rebuy: Vec<TagEntry>,

    pub switch_keywords: Vec<String>,
    /// Competitor brands in lookup order
    pub competitor_brands: Vec<String>,
    pub loyal_keywords: Vec<String>,
    pub rebuy_keywords: Vec<String>,
    pub churn_keywords: Vec<String>,

    /// Maps free-form tag spellings (e.g. from an LLM) to vocabulary tags
    pub usage_aliases: BTreeMap<String, String>,
}

impl Lexicon {
    /// Load from YAML string and validate
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let lexicon: Self = serde_yaml::from_str(yaml)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Load from a YAML file and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read lexicon {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject empty keywords, empty tag entries and invalid regexes
    pub fn validate(&self) -> Result<()> {
        let lists: [(&str, &[String]); 15] = [
            ("positive", &self.positive),
            ("negative", &self.negative),
            ("strong_markers", &self.strong_markers),
            ("weak_markers", &self.weak_markers),
            ("superlatives", &self.superlatives),
            ("skin_issue", &self.skin_issue),
            ("adversative", &self.adversative),
            ("discontinuation", &self.discontinuation),
            ("negative_context", &self.negative_context),
            ("past_usage", &self.past_usage),
            ("switch_keywords", &self.switch_keywords),
            ("competitor_brands", &self.competitor_brands),
            ("loyal_keywords", &self.loyal_keywords),
            ("rebuy_keywords", &self.rebuy_keywords),
            ("churn_keywords", &self.churn_keywords),
        ];
        for (table, keywords) in lists {
            check_keywords(table, keywords)?;
        }

        let tag_tables: [(&str, &[TagEntry]); 6] = [
            ("benefit", &self.benefit),
            ("texture", &self.texture),
            ("usage", &self.usage),
            ("value", &self.value),
            ("reason_buy", &self.reason_buy),
            ("reason_rebuy", &self.reason_rebuy),
        ];
        for (table, entries) in tag_tables {
            let mut seen = HashSet::new();
            for entry in entries {
                if entry.tag.trim().is_empty() {
                    return Err(Error::config(format!("{table}: empty tag name")));
                }
                if !seen.insert(entry.tag.as_str()) {
                    return Err(Error::config(format!(
                        "{table}: duplicate tag '{}'",
                        entry.tag
                    )));
                }
                if entry.keywords.is_empty() {
                    return Err(Error::config(format!(
                        "{table}: tag '{}' has no keywords",
                        entry.tag
                    )));
                }
                check_keywords(&format!("{table}.{}", entry.tag), &entry.keywords)?;
            }
        }

        for (table, entries) in [
            ("pain_points", &self.pain_points),
            ("positive_points", &self.positive_points),
        ] {
            for entry in entries {
                if entry.label.trim().is_empty() {
                    return Err(Error::config(format!("{table}: empty label")));
                }
                Regex::new(&entry.pattern).map_err(|e| {
                    Error::config(format!(
                        "{table}: invalid pattern for '{}': {e}",
                        entry.label
                    ))
                })?;
            }
        }

        if self.holy_grail_tag.trim().is_empty() {
            return Err(Error::config("holy_grail_tag must not be empty"));
        }

        for (alias, tag) in &self.usage_aliases {
            if alias.trim().is_empty() || tag.trim().is_empty() {
                return Err(Error::config("usage_aliases: empty alias or tag"));
            }
        }

        Ok(())
    }
}

fn check_keywords(table: &str, keywords: &[String]) -> Result<()> {
    match keywords.iter().position(|k| k.trim().is_empty()) {
        Some(idx) => Err(Error::config(format!(
            "{table}: keyword #{idx} is empty"
        ))),
        None => Ok(()),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn tags(entries: &[(&str, &[&str])]) -> Vec<TagEntry> {
    entries
        .iter()
        .map(|(tag, keywords)| TagEntry {
            tag: tag.to_string(),
            keywords: strings(keywords),
        })
        .collect()
}

fn patterns(entries: &[(&str, &str)]) -> Vec<PatternEntry> {
    entries
        .iter()
        .map(|(label, pattern)| PatternEntry {
            label: label.to_string(),
            pattern: pattern.to_string(),
        })
        .collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive: strings(&[
                "좋아", "좋았", "좋은", "좋네", "촉촉", "순해", "순하", "진정", "만족", "추천",
                "최고", "재구매", "편해", "산뜻", "잘 맞", "부드러", "보습", "최애", "인생템", "짱",
            ]),
            negative: strings(&[
                "트러블", "뾰루지", "자극적", "자극이 심", "속건조", "건조해요", "건조해서",
                "끈적", "별로", "실망", "최악", "비추", "따끔", "아쉬", "안맞", "안 맞",
                "효과없", "효과 없", "냄새", "후회", "올라왔", "화끈",
            ]),
            strong_markers: strings(&[
                "인생템", "미쳤", "레전드", "최고", "대박", "강추", "평생", "최애", "너무 좋",
                "진짜 좋", "정말 좋", "완전 좋",
            ]),
            weak_markers: strings(&[
                "무난", "그냥", "평범", "나쁘지 않", "나쁘지않", "쏘쏘", "그럭저럭", "보통",
                "모르겠", "글쎄",
            ]),
            superlatives: strings(&["인생템", "미쳤", "레전드"]),
            skin_issue: strings(&[
                "모낭염", "알러지", "알레르기", "두드러기", "피부염", "접촉성", "습진", "염증",
                "발진", "따가워", "따가웠", "따끔거", "화끈거", "붉어졌", "홍조가 심", "가려워",
                "가렵", "좁쌀", "여드름이 올라", "여드름이 났", "뒤집어졌", "뒤집혔", "진물",
                "부작용",
            ]),
            adversative: strings(&["었으나", "았으나", "했으나", "지만", "는데", "은데", "던데"]),
            discontinuation: strings(&[
                "중단", "그만 쓰", "그만쓰", "그만 썼", "그만썼", "버렸", "버림", "못 쓰겠",
                "못쓰겠", "안 쓰게", "안쓰게", "방치", "손이 안 가", "손이 안가", "쓰다 말",
                "환불", "반품",
            ]),
            negative_context: strings(&[
                "안맞", "안 맞", "별로", "실망", "후회", "아쉽", "못쓰", "더이상", "더 이상",
                "효과없", "효과 없", "다신", "다시는", "비추", "돈아깝", "돈 아깝",
            ]),
            past_usage: strings(&[
                "예전에", "예전엔", "전에는", "원래는", "처음엔", "처음에는", "했었", "썼었",
                "사용했었", "쓰던", "작년에",
            ]),
            benefit: tags(&[
                ("진정", &["진정", "시카", "어성초", "붉은기", "가라앉"]),
                ("보습", &["보습", "촉촉", "수분", "건조하지"]),
                ("장벽", &["장벽", "세라마이드", "튼튼"]),
                ("결", &["피부결", "결이", "결정리", "결 정리", "각질", "매끈"]),
                ("피지", &["피지", "유분", "번들", "모공", "블랙헤드"]),
            ]),
            texture: tags(&[
                ("물같음", &["물같", "물 같", "묽", "가벼", "산뜻"]),
                ("쫀쫀", &["쫀쫀", "쫀득", "점성", "꾸덕"]),
                ("끈적", &["끈적", "끈끈", "미끌"]),
                ("흡수", &["흡수", "스며"]),
            ]),
            usage: tags(&[
                ("닦토", &["닦토", "닥토", "닦아내", "화장솜"]),
                ("스킨팩", &["스킨팩", "토너팩", "팩으로", "솜팩"]),
                ("레이어링", &["레이어링", "7스킨", "겹바름", "덧발"]),
                ("바디", &["바디", "몸에", "몸까지"]),
            ]),
            value: tags(&[
                ("가성비", &["가성비", "저렴", "대용량", "싸고", "혜자"]),
                ("무난", &["무난", "데일리", "기본템"]),
                ("애매", &["애매", "모르겠", "글쎄", "밍밍"]),
                ("인생템", &["인생템", "최애", "정착", "없으면 안", "평생"]),
            ]),
            holy_grail_tag: "인생템".to_string(),
            pain_points: patterns(&[
                (
                    "자극/트러블",
                    "트러블|뾰루지|따가|따끔|쓰라|자극|뒤집|올라오|올라왔|모낭염|알러지|알레르기|화끈",
                ),
                ("보습부족", "건조|당김|당겨|갈라|푸석|보습.{0,4}(부족|약)"),
                ("끈적/무거움", "끈적|답답|무거|텁텁|기름져|겉돌"),
                ("효과없음", "효과.{0,3}(없|모르)|변화.{0,3}없|잘 모르겠|밍밍"),
                ("향/냄새", "냄새|냄시|알코올|향이.{0,4}(강|별로|싫|독)"),
                ("가격", "비싸|비쌈|가격.{0,4}(부담|사악|올랐)|돈.?아깝"),
                ("용기/패키지", "펌프|뚜껑|용기.{0,4}(불편|별로)|흘러|샜|새요|새서|누수"),
                ("흡수불량", "흡수.{0,4}(안|느리|더디)|안 ?스며"),
            ]),
            positive_points: patterns(&[
                ("순함/저자극", "순해|순하|저자극|자극.{0,3}없"),
                ("보습력", "촉촉|보습|수분감|건조하지 않"),
                ("진정효과", "진정|붉은기|가라앉|열감"),
                ("흡수력", "흡수.{0,3}(잘|빠르|빨리)|잘 스며"),
                ("산뜻함", "산뜻|가볍|가벼|끈적이지 않|끈적임.{0,3}없"),
                ("가성비", "가성비|저렴|싸고|혜자"),
                ("대용량", "대용량|용량.{0,3}(많|크|넉넉)"),
                ("피부결개선", "피부결|결이|결 ?정리|매끈|매끄"),
                ("재구매의사", "재구매|또 ?살|또 ?구매|쟁여|계속 쓸|정착"),
            ]),
            reason_buy: tags(&[
                ("가성비", &["가성비", "저렴", "싸고", "싸서", "혜자", "할인", "세일"]),
                ("진정", &["진정", "시카", "어성초", "붉은기", "예민"]),
                ("보습", &["보습", "촉촉", "수분", "건조"]),
                ("대용량", &["대용량", "용량", "양이 많", "넉넉"]),
            ]),
            reason_rebuy: tags(&[
                ("효능", &["효과", "진정", "보습", "촉촉", "피부가 좋아"]),
                (
                    "안전성",
                    &["순해", "순하", "자극 없", "자극없", "트러블 없", "트러블없", "민감", "예민"],
                ),
                ("습관", &["계속", "꾸준히", "항상", "늘 쓰", "정착", "매번", "몇통째", "번째"]),
                ("가성비", &["가성비", "저렴", "할인", "세일", "혜자"]),
            ]),
            switch_keywords: strings(&[
                "갈아타", "갈아탔", "바꿨", "바꿔", "바꿀", "대신", "다른 제품", "다른 거",
                "다른거", "넘어가", "넘어갔",
            ]),
            competitor_brands: strings(&[
                "라운드랩", "토리든", "아누아", "독도토너", "스킨1004", "이니스프리", "에스네이처",
                "토니모리", "닥터지", "달바", "마녀공장", "구달",
            ]),
            loyal_keywords: strings(&[
                "인생템", "최애", "없으면 안", "필수템", "애정템", "평생", "계속 쓸",
            ]),
            rebuy_keywords: strings(&[
                "재구매", "재구", "또 사", "또사", "계속 사", "계속사", "꾸준히", "n번째",
                "번째 구매", "몇통째",
            ]),
            churn_keywords: strings(&[
                "다른 거", "다른거", "바꿀", "갈아타", "안 살", "안살", "다시 안", "다시안",
                "바꿔야", "다른 제품",
            ]),
            usage_aliases: [
                ("닥토", "닦토"),
                ("닦아내는 토너", "닦토"),
                ("토너팩", "스킨팩"),
                ("스킨팩/토너팩", "스킨팩"),
                ("팩", "스킨팩"),
                ("마스크팩", "스킨팩"),
                ("솜팩", "스킨팩"),
                ("겹바름", "레이어링"),
                ("덧바름", "레이어링"),
                ("7스킨", "레이어링"),
                ("7토너", "레이어링"),
                ("바디토너", "바디"),
                ("몸", "바디"),
            ]
            .into_iter()
            .map(|(alias, tag)| (alias.to_string(), tag.to_string()))
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_is_valid() {
        let lexicon = Lexicon::default();
        lexicon.validate().unwrap();
        assert_eq!(lexicon.adversative[0], "었으나");
        assert!(lexicon.value.iter().any(|e| e.tag == lexicon.holy_grail_tag));
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = r#"
positive:
  - great
negative:
  - awful
"#;
        let lexicon = Lexicon::from_yaml(yaml).unwrap();
        assert_eq!(lexicon.positive, vec!["great"]);
        assert_eq!(lexicon.negative, vec!["awful"]);
        assert_eq!(lexicon.skin_issue, Lexicon::default().skin_issue);
    }

    #[test]
    fn test_rejects_empty_keyword() {
        let yaml = r#"
negative:
  - ""
"#;
        let err = Lexicon::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_regex() {
        let yaml = r#"
pain_points:
  - label: broken
    pattern: "(unclosed"
"#;
        let err = Lexicon::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_rejects_tag_without_keywords() {
        let yaml = r#"
usage:
  - tag: 닦토
    keywords: []
"#;
        assert!(Lexicon::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_yaml_round_trip_preserves_order() {
        let lexicon = Lexicon::default();
        let yaml = lexicon.to_yaml().unwrap();
        let parsed = Lexicon::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, lexicon);
    }
}
