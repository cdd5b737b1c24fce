//! Substring keyword matching built on Aho-Corasick

use aho_corasick::AhoCorasick;
use reviewlens_core::{Error, Result};

/// Normalize review text before matching
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// A set of keywords matched as substrings.
///
/// Keywords are lowercased and deduplicated at construction; lookups expect
/// text already passed through [`normalize`]. Counting considers overlapping
/// occurrences, so a keyword nested inside another still counts.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    name: String,
    keywords: Vec<String>,
    automaton: AhoCorasick,
}

impl KeywordSet {
    /// Build a keyword set
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut unique: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().to_lowercase();
            if keyword.is_empty() {
                return Err(Error::config(format!("{name}: empty keyword")));
            }
            if !unique.contains(&keyword) {
                unique.push(keyword);
            }
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&unique)
            .map_err(|e| Error::classifier(format!("Failed to build {name} matcher: {e}")))?;

        Ok(Self {
            name,
            keywords: unique,
            automaton,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Number of distinct keywords occurring in `text`
    pub fn score(&self, text: &str) -> usize {
        self.hits(text).into_iter().filter(|hit| *hit).count()
    }

    /// Whether any keyword occurs in `text`
    pub fn contains_any(&self, text: &str) -> bool {
        !self.keywords.is_empty() && self.automaton.is_match(text)
    }

    /// Keywords occurring in `text`, in table order
    pub fn matches(&self, text: &str) -> Vec<&str> {
        self.hits(text)
            .into_iter()
            .zip(&self.keywords)
            .filter_map(|(hit, keyword)| hit.then_some(keyword.as_str()))
            .collect()
    }

    fn hits(&self, text: &str) -> Vec<bool> {
        let mut seen = vec![false; self.keywords.len()];
        for m in self.automaton.find_overlapping_iter(text) {
            seen[m.pattern().as_usize()] = true;
        }
        seen
    }
}

/// Ordered `(tag, keywords)` table where the first matching tag can be
/// looked up, or every matching tag collected.
#[derive(Debug, Clone)]
pub struct TagTable {
    entries: Vec<(String, KeywordSet)>,
}

impl TagTable {
    pub fn new<'a, I>(name: &str, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let entries = entries
            .into_iter()
            .map(|(tag, keywords)| {
                KeywordSet::new(format!("{name}.{tag}"), keywords).map(|set| (tag.to_string(), set))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Tag names in table order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == tag)
    }

    /// Every tag with at least one keyword in `text`, in table order
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, set)| set.contains_any(text))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// First tag in priority order with a keyword in `text`
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, set)| set.contains_any(text))
            .map(|(tag, _)| tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_counts_distinct_keywords() {
        let set = KeywordSet::new("test", ["좋아", "촉촉", "최고"]).unwrap();
        assert_eq!(set.score("좋아요 좋아요 좋아요"), 1);
        assert_eq!(set.score("촉촉하고 좋아요"), 2);
        assert_eq!(set.score("그냥 그래요"), 0);
    }

    #[test]
    fn test_score_counts_nested_keywords() {
        let set = KeywordSet::new("test", ["효과없", "없"]).unwrap();
        assert_eq!(set.score("효과없어요"), 2);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let set = KeywordSet::new("test", ["별로", "별로", "실망"]).unwrap();
        assert_eq!(set.keywords().len(), 2);
        assert_eq!(set.score("별로 실망"), 2);
    }

    #[test]
    fn test_case_insensitive() {
        let set = KeywordSet::new("test", ["CICA"]).unwrap();
        assert!(set.contains_any(&normalize("Cica toner")));
        assert_eq!(set.matches("cica"), vec!["cica"]);
    }

    #[test]
    fn test_matches_in_table_order() {
        let set = KeywordSet::new("test", ["b", "a"]).unwrap();
        assert_eq!(set.matches("a b"), vec!["b", "a"]);
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = KeywordSet::new("test", Vec::<String>::new()).unwrap();
        assert!(set.is_empty());
        assert!(!set.contains_any("anything"));
        assert_eq!(set.score("anything"), 0);
    }

    #[test]
    fn test_empty_keyword_rejected() {
        assert!(KeywordSet::new("test", ["ok", ""]).is_err());
    }

    #[test]
    fn test_tag_table_order_and_priority() {
        let first = vec!["저렴".to_string()];
        let second = vec!["촉촉".to_string(), "보습".to_string()];
        let table =
            TagTable::new("reason", [("가성비", first.as_slice()), ("보습", second.as_slice())])
                .unwrap();

        assert_eq!(table.extract("촉촉하고 저렴"), vec!["가성비", "보습"]);
        assert_eq!(table.first_match("촉촉하고 저렴"), Some("가성비"));
        assert_eq!(table.first_match("물 같아요"), None);
        assert!(table.contains_tag("보습"));
    }
}
