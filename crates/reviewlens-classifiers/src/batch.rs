//! Parallel batch classification and aggregate statistics
//!
//! Reviews are independent, so the collection is split into contiguous
//! chunks classified on the blocking thread pool and reassembled in input
//! order.

use crate::classifier::ReviewClassifier;
use futures::future::try_join_all;
use reviewlens_core::{
    AnalyzedReview, ClassificationResult, Error, Result, Review, Sentiment, Strength,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Brand key for reviews without a brand
const UNKNOWN_BRAND: &str = "unknown";

/// Runs a classifier over a review collection on all cores
#[derive(Clone)]
pub struct BatchClassifier {
    classifier: Arc<dyn ReviewClassifier>,
    workers: usize,
}

impl BatchClassifier {
    /// One worker per logical CPU
    pub fn new(classifier: Arc<dyn ReviewClassifier>) -> Self {
        Self::with_workers(classifier, num_cpus::get())
    }

    pub fn with_workers(classifier: Arc<dyn ReviewClassifier>, workers: usize) -> Self {
        Self {
            classifier,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Classify every review; output order matches input order
    pub async fn classify_all(&self, reviews: Vec<Review>) -> Result<Vec<AnalyzedReview>> {
        let total = reviews.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let chunk_size = total.div_ceil(self.workers);
        let mut chunks: Vec<Vec<(usize, Review)>> = Vec::with_capacity(self.workers);
        let mut indexed = reviews.into_iter().enumerate().peekable();
        while indexed.peek().is_some() {
            chunks.push(indexed.by_ref().take(chunk_size).collect());
        }

        let handles = chunks.into_iter().enumerate().map(|(chunk_id, chunk)| {
            let classifier = Arc::clone(&self.classifier);
            tokio::task::spawn_blocking(move || {
                let rows: Vec<AnalyzedReview> = chunk
                    .into_iter()
                    .map(|(index, review)| {
                        let result = classifier.classify(&review);
                        record(&result);
                        AnalyzedReview {
                            index,
                            review,
                            result,
                        }
                    })
                    .collect();
                debug!(chunk = chunk_id, reviews = rows.len(), "Chunk classified");
                rows
            })
        });

        let chunks = try_join_all(handles)
            .await
            .map_err(|e| Error::internal(format!("classification worker failed: {e}")))?;

        let rows: Vec<AnalyzedReview> = chunks.into_iter().flatten().collect();
        info!(
            reviews = rows.len(),
            workers = self.workers,
            classifier = self.classifier.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch classified"
        );
        Ok(rows)
    }
}

fn record(result: &ClassificationResult) {
    metrics::counter!(
        "reviewlens_reviews_classified_total",
        "sentiment" => result.sentiment.as_str()
    )
    .increment(1);
}

/// Sentiment counts for one slice of the data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(rename = "POS")]
    pub pos: usize,
    #[serde(rename = "NEU")]
    pub neu: usize,
    #[serde(rename = "NEG")]
    pub neg: usize,
}

impl SentimentCounts {
    fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Pos => self.pos += 1,
            Sentiment::Neu => self.neu += 1,
            Sentiment::Neg => self.neg += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pos + self.neu + self.neg
    }
}

/// Per-brand breakdown within a [`BatchSummary`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandSummary {
    pub reviews: usize,
    pub sentiment: SentimentCounts,
    pub average_rating: f64,
    pub rebuy_count: usize,
    /// Share of reviews tagged as repurchases, in percent
    pub rebuy_rate: f64,
    /// Repurchase reasons over every rebuy review
    pub rebuy_reasons: BTreeMap<String, usize>,
    /// Repurchase reasons over STRONG rebuy reviews only
    pub strong_rebuy_reasons: BTreeMap<String, usize>,
    /// Value tag counts; 무난 and 애매 give the neutral and ambiguous share
    pub value_tags: BTreeMap<String, usize>,
    pub switch_signals: usize,
    #[serde(skip)]
    rating_sum: u64,
}

impl BrandSummary {
    fn add(&mut self, row: &AnalyzedReview) {
        let result = &row.result;
        self.reviews += 1;
        self.sentiment.add(result.sentiment);
        self.rating_sum += u64::from(row.review.rating.get());

        if row.review.is_rebuy() {
            self.rebuy_count += 1;
            if let Some(reason) = &result.signals.reason_rebuy {
                *self.rebuy_reasons.entry(reason.clone()).or_default() += 1;
                if result.strength == Strength::Strong {
                    *self.strong_rebuy_reasons.entry(reason.clone()).or_default() += 1;
                }
            }
        }
        for tag in &result.value_tags {
            *self.value_tags.entry(tag.clone()).or_default() += 1;
        }
        if result.signals.switch_signal {
            self.switch_signals += 1;
        }
    }

    fn finish(&mut self) {
        if self.reviews > 0 {
            self.average_rating = self.rating_sum as f64 / self.reviews as f64;
            self.rebuy_rate = self.rebuy_count as f64 / self.reviews as f64 * 100.0;
        }
    }
}

/// Aggregate statistics over classified reviews
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub sentiment: SentimentCounts,
    pub strength: BTreeMap<String, usize>,
    pub brands: BTreeMap<String, BrandSummary>,
    /// Reviewed brand to the competitor it names when switching away
    pub switch_matrix: BTreeMap<String, BTreeMap<String, usize>>,
    pub average_rating: f64,
    pub rebuy_count: usize,
    pub rebuy_sentiment: SentimentCounts,
    /// Reviews whose LLM enrichment failed
    pub enrichment_errors: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[AnalyzedReview]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            strength: Strength::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
            ..Default::default()
        };

        let mut rating_sum = 0u64;
        for row in rows {
            summary.sentiment.add(row.result.sentiment);
            *summary
                .strength
                .entry(row.result.strength.as_str().to_string())
                .or_default() += 1;

            let brand = row.review.meta.brand.as_deref().unwrap_or(UNKNOWN_BRAND);
            summary.brands.entry(brand.to_string()).or_default().add(row);

            let signals = &row.result.signals;
            let target = signals
                .switch_to_brand
                .as_deref()
                .filter(|target| signals.switch_signal && !target.is_empty());
            if let Some(target) = target {
                *summary
                    .switch_matrix
                    .entry(brand.to_string())
                    .or_default()
                    .entry(target.to_string())
                    .or_default() += 1;
            }

            rating_sum += u64::from(row.review.rating.get());
            if row.review.is_rebuy() {
                summary.rebuy_count += 1;
                summary.rebuy_sentiment.add(row.result.sentiment);
            }
            if row.result.enrichment_error.is_some() {
                summary.enrichment_errors += 1;
            }
        }

        summary.brands.values_mut().for_each(BrandSummary::finish);
        if !rows.is_empty() {
            summary.average_rating = rating_sum as f64 / rows.len() as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::KeywordClassifier;
    use reviewlens_core::{Rating, ReviewMeta};

    fn reviews(n: usize) -> Vec<Review> {
        (0..n)
            .map(|i| {
                let text = if i % 2 == 0 {
                    format!("촉촉하고 좋아요 {i}")
                } else {
                    format!("모낭염이 생겼어요 {i}")
                };
                Review::new(text, Rating::clamped(5)).with_meta(ReviewMeta {
                    brand: Some(if i % 3 == 0 { "A" } else { "B" }.to_string()),
                    purchase_tag: (i % 4 == 0).then(|| "재구매".to_string()),
                    ..Default::default()
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn test_order_preserved_across_workers() {
        let batch = BatchClassifier::with_workers(Arc::new(KeywordClassifier::new().unwrap()), 3);
        let rows = batch.classify_all(reviews(10)).await.unwrap();

        assert_eq!(rows.len(), 10);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.index, i);
            assert!(row.review.text.ends_with(&i.to_string()));
            let expected = if i % 2 == 0 { Sentiment::Pos } else { Sentiment::Neg };
            assert_eq!(row.result.sentiment, expected);
        }
    }

    #[tokio::test]
    async fn test_more_workers_than_reviews() {
        let batch = BatchClassifier::with_workers(Arc::new(KeywordClassifier::new().unwrap()), 16);
        let rows = batch.classify_all(reviews(3)).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let batch = BatchClassifier::new(Arc::new(KeywordClassifier::new().unwrap()));
        assert!(batch.classify_all(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary() {
        let batch = BatchClassifier::with_workers(Arc::new(KeywordClassifier::new().unwrap()), 2);
        let rows = batch.classify_all(reviews(8)).await.unwrap();
        let summary = BatchSummary::from_rows(&rows);

        assert_eq!(summary.total, 8);
        assert_eq!(summary.sentiment.pos, 4);
        assert_eq!(summary.sentiment.neg, 4);
        assert_eq!(summary.rebuy_count, 2);
        assert_eq!(summary.rebuy_sentiment.pos, 2);
        assert_eq!(summary.strength.values().sum::<usize>(), 8);
        assert!((summary.average_rating - 5.0).abs() < f64::EPSILON);

        // A: reviews 0, 3, 6; B: reviews 1, 2, 4, 5, 7; rebuys are 0 and 4
        let a = &summary.brands["A"];
        assert_eq!(a.reviews, 3);
        assert_eq!(a.sentiment.pos, 2);
        assert_eq!(a.sentiment.neg, 1);
        assert_eq!(a.rebuy_count, 1);
        assert!((a.rebuy_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(a.rebuy_reasons.get("효능"), Some(&1));

        let b = &summary.brands["B"];
        assert_eq!(b.reviews, 5);
        assert_eq!(b.sentiment.pos, 2);
        assert_eq!(b.sentiment.neg, 3);
        assert!((b.rebuy_rate - 20.0).abs() < 1e-9);
        assert!((b.average_rating - 5.0).abs() < f64::EPSILON);
        assert!(summary.switch_matrix.is_empty());
    }

    fn row(index: usize, brand: &str, rating: u8, result: ClassificationResult) -> AnalyzedReview {
        AnalyzedReview {
            index,
            review: Review::new("리뷰", Rating::clamped(i64::from(rating))).with_meta(ReviewMeta {
                brand: Some(brand.to_string()),
                purchase_tag: Some("재구매".to_string()),
                ..Default::default()
            }),
            result,
        }
    }

    #[test]
    fn test_brand_rebuy_reasons_and_switch_matrix() {
        let mut strong = ClassificationResult::neutral();
        strong.strength = Strength::Strong;
        strong.signals.reason_rebuy = Some("효능".to_string());

        let mut habit = ClassificationResult::neutral();
        habit.signals.reason_rebuy = Some("습관".to_string());
        habit.value_tags = vec!["무난".to_string()];

        let mut switched = ClassificationResult::neutral();
        switched.signals.switch_signal = true;
        switched.signals.switch_to_brand = Some("토리든".to_string());

        // a competitor named without a switch keyword is not a switch
        let mut mention = ClassificationResult::neutral();
        mention.signals.switch_to_brand = Some("아누아".to_string());

        let rows = vec![
            row(0, "A", 5, strong),
            row(1, "A", 3, habit),
            row(2, "A", 2, switched.clone()),
            row(3, "B", 4, switched),
            row(4, "B", 4, mention),
        ];
        let summary = BatchSummary::from_rows(&rows);

        let a = &summary.brands["A"];
        assert_eq!(a.rebuy_reasons.get("효능"), Some(&1));
        assert_eq!(a.rebuy_reasons.get("습관"), Some(&1));
        assert_eq!(a.strong_rebuy_reasons.len(), 1);
        assert_eq!(a.strong_rebuy_reasons.get("효능"), Some(&1));
        assert_eq!(a.value_tags.get("무난"), Some(&1));
        assert_eq!(a.switch_signals, 1);
        assert!((a.average_rating - 10.0 / 3.0).abs() < 1e-9);
        assert!((a.rebuy_rate - 100.0).abs() < 1e-9);

        assert_eq!(summary.switch_matrix["A"]["토리든"], 1);
        assert_eq!(summary.switch_matrix["B"]["토리든"], 1);
        assert_eq!(summary.switch_matrix["B"].len(), 1);
    }
}
