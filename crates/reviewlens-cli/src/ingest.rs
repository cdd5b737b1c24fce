//! Review ingestion from JSON exports
//!
//! Accepted layouts:
//! - a JSON array of records
//! - a JSON object whose first array-valued field holds the records
//!   (SQL client exports)
//! - JSON lines, one record per line
//!
//! Field names are matched case-insensitively against known aliases; fields
//! not recognized are kept in `ReviewMeta::extra`.

use reviewlens_core::{Error, Rating, Result, Review, ReviewMeta};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

const TEXT_FIELDS: &[&str] = &["review_content", "text", "content"];
const RATING_FIELDS: &[&str] = &["review_rating", "rating"];
const BRAND_FIELDS: &[&str] = &["brand_name", "brand"];
const PLATFORM_FIELDS: &[&str] = &["platform"];
const DATE_FIELDS: &[&str] = &["review_date", "date"];
const ID_FIELDS: &[&str] = &["review_id", "id"];
const PURCHASE_TAG_FIELDS: &[&str] = &["purchase_tag"];

/// Turns raw records into reviews
pub struct Ingestor<'a> {
    brand_aliases: &'a BTreeMap<String, String>,
}

impl<'a> Ingestor<'a> {
    pub fn new(brand_aliases: &'a BTreeMap<String, String>) -> Self {
        Self { brand_aliases }
    }

    pub fn load(&self, path: &Path) -> Result<Vec<Review>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ingest(format!("failed to read {}: {e}", path.display())))?;
        let reviews = self.parse(&content)?;
        info!(path = %path.display(), reviews = reviews.len(), "Reviews loaded");
        Ok(reviews)
    }

    pub fn parse(&self, content: &str) -> Result<Vec<Review>> {
        let records = records(content)?;
        let mut reviews = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for (position, record) in records.into_iter().enumerate() {
            let Value::Object(fields) = record else {
                warn!(position, "Skipping record that is not a JSON object");
                skipped += 1;
                continue;
            };
            match self.review(position, fields) {
                Some(review) => reviews.push(review),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, "Some records were skipped");
        }
        Ok(reviews)
    }

    fn review(&self, position: usize, fields: Map<String, Value>) -> Option<Review> {
        let mut fields = Fields::new(fields);

        let Some(raw_rating) = fields.take(RATING_FIELDS) else {
            warn!(position, "Skipping record without a rating");
            return None;
        };
        let Some(value) = rating_value(&raw_rating) else {
            warn!(position, rating = %raw_rating, "Skipping record with a non-numeric rating");
            return None;
        };
        let rating = Rating::try_from(value).unwrap_or_else(|_| {
            warn!(position, rating = value, "Rating outside 1-5, clamping");
            Rating::clamped(value)
        });

        let text = fields.take(TEXT_FIELDS).map(text_value).unwrap_or_default();
        let meta = ReviewMeta {
            id: fields.take(ID_FIELDS).and_then(string_value),
            platform: fields.take(PLATFORM_FIELDS).and_then(string_value),
            brand: fields
                .take(BRAND_FIELDS)
                .and_then(string_value)
                .map(|brand| self.canonical_brand(&brand)),
            date: fields.take(DATE_FIELDS).and_then(string_value),
            purchase_tag: fields.take(PURCHASE_TAG_FIELDS).and_then(string_value),
            extra: fields.into_rest(),
        };

        Some(Review::new(text, rating).with_meta(meta))
    }

    fn canonical_brand(&self, brand: &str) -> String {
        let brand = brand.trim();
        self.brand_aliases
            .iter()
            .find(|(alias, _)| alias.trim() == brand)
            .map_or_else(|| brand.to_string(), |(_, canonical)| canonical.clone())
    }
}

/// Split the document into raw records
fn records(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(document) = serde_json::from_str::<Value>(trimmed) {
        match document {
            Value::Array(items) => return Ok(items),
            Value::Object(map) => {
                if let Some(Value::Array(items)) = map.values().find(|v| v.is_array()).cloned() {
                    return Ok(items);
                }
                return Ok(vec![Value::Object(map)]);
            }
            other => {
                return Err(Error::ingest(format!(
                    "expected an array or object of reviews, found {other}"
                )))
            }
        }
    }

    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::ingest(format!("line {}: invalid JSON: {e}", number + 1)))
        })
        .collect()
}

/// Record fields with case-insensitive alias lookup
struct Fields {
    map: Map<String, Value>,
}

impl Fields {
    fn new(map: Map<String, Value>) -> Self {
        Self { map }
    }

    /// Remove every field matching an alias and return the first non-null
    /// one in alias order
    fn take(&mut self, aliases: &[&str]) -> Option<Value> {
        let mut found = None;
        for alias in aliases {
            let keys: Vec<String> = self
                .map
                .keys()
                .filter(|key| key.eq_ignore_ascii_case(alias))
                .cloned()
                .collect();
            for key in keys {
                if let Some(value) = self.map.remove(&key) {
                    if found.is_none() && !value.is_null() {
                        found = Some(value);
                    }
                }
            }
        }
        found
    }

    fn into_rest(self) -> Map<String, Value> {
        self.map
    }
}

fn rating_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn text_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_value(value: Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}
