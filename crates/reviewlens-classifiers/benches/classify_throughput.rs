//! Classification throughput benchmarks
//!
//! Run with: cargo bench -p reviewlens-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;

use reviewlens_classifiers::{BatchClassifier, KeywordClassifier, ReviewClassifier};
use reviewlens_core::{Rating, Review};

const SAMPLES: &[(&str, &str, u8)] = &[
    ("short_positive", "촉촉하고 좋아요", 5),
    ("adversative", "처음에는 좋았는데 쓰다보니 트러블이 올라왔어요", 4),
    (
        "skin_issue",
        "예전에 닦토로 잘써서 재구매했었으나 모낭염이 올라와서 중단했네여요",
        5,
    ),
    (
        "long_mixed",
        "향은 무난하고 물같이 가벼워서 닦토로 쓰기 좋아요. 가성비도 괜찮고 대용량이라 \
         바디에도 막 쓰는데 건조한 날에는 살짝 아쉽네요. 그래도 재구매 의사 있어요",
        4,
    ),
];

/// Single-review latency per scenario
fn benchmark_single_review(c: &mut Criterion) {
    let classifier = KeywordClassifier::new().expect("Failed to create keyword classifier");

    let mut group = c.benchmark_group("keyword_classifier");
    group.sample_size(200);

    for (name, text, rating) in SAMPLES {
        let review = Review::new(*text, Rating::clamped(i64::from(*rating)));
        group.bench_with_input(BenchmarkId::new("classify", name), &review, |b, review| {
            b.iter(|| classifier.classify(black_box(review)))
        });
    }

    group.finish();
}

/// Batch throughput across worker counts
fn benchmark_batch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let classifier = Arc::new(KeywordClassifier::new().expect("Failed to create keyword classifier"));

    let reviews: Vec<Review> = (0..10_000)
        .map(|i| {
            let (_, text, rating) = SAMPLES[i % SAMPLES.len()];
            Review::new(text, Rating::clamped(i64::from(rating)))
        })
        .collect();

    let mut group = c.benchmark_group("batch_classifier");
    group.sample_size(10);
    group.throughput(Throughput::Elements(reviews.len() as u64));

    for workers in [1, 2, num_cpus::get()] {
        let batch = BatchClassifier::with_workers(classifier.clone(), workers);
        group.bench_with_input(BenchmarkId::new("classify_all", workers), &workers, |b, _| {
            b.iter(|| rt.block_on(batch.classify_all(black_box(reviews.clone()))).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_review, benchmark_batch);
criterion_main!(benches);
