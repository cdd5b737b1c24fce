//! Property tests for the keyword classifier

use proptest::prelude::*;
use reviewlens_classifiers::{KeywordClassifier, ReviewClassifier};
use reviewlens_core::{Rating, Review, Sentiment};
use std::sync::OnceLock;

fn classifier() -> &'static KeywordClassifier {
    static CLASSIFIER: OnceLock<KeywordClassifier> = OnceLock::new();
    CLASSIFIER.get_or_init(|| KeywordClassifier::new().unwrap())
}

/// Fragments drawn from the lexicons so generated text actually hits rules
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "촉촉하고", "좋아요", "인생템", "닦토로", "스킨팩", "가성비", "예전에", "썼었는데",
        "지만", "는데", "었으나", "트러블", "별로", "실망", "후회", "모낭염", "알러지",
        "중단", "버렸어요", "무난", "그냥", "대박", "최고", "물같이", "끈적", " ", "!",
    ])
}

fn review_text() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.join(" ")),
        any::<String>(),
    ]
}

proptest! {
    #[test]
    fn classification_is_deterministic(text in review_text(), rating in 1u8..=5) {
        let review = Review::new(text, Rating::new(rating).unwrap());
        prop_assert_eq!(classifier().classify(&review), classifier().classify(&review));
    }

    #[test]
    fn skin_issue_is_always_negative(text in review_text(), rating in 1u8..=5) {
        let review = Review::new(text, Rating::new(rating).unwrap());
        let result = classifier().classify(&review);
        if result.flags.has_skin_issue() {
            prop_assert_eq!(result.sentiment, Sentiment::Neg);
        }
    }

    #[test]
    fn suppression_flags_clear_usage_and_holy_grail(text in review_text(), rating in 1u8..=5) {
        let review = Review::new(text, Rating::new(rating).unwrap());
        let result = classifier().classify(&review);
        if result.flags.suppresses_tags() {
            prop_assert!(result.usage_tags.is_empty());
            prop_assert!(!result.value_tags.iter().any(|t| t == "인생템"));
        }
    }

    #[test]
    fn five_stars_with_skin_reaction_is_negative(prefix in review_text(), suffix in review_text()) {
        let text = format!("{prefix} 모낭염 {suffix}");
        let review = Review::new(text, Rating::new(5).unwrap());
        prop_assert_eq!(classifier().classify(&review).sentiment, Sentiment::Neg);
    }

    #[test]
    fn guards_do_not_change_keyword_results(text in review_text(), rating in 1u8..=5) {
        let review = Review::new(text, Rating::new(rating).unwrap());
        let result = classifier().classify(&review);
        let mut guarded = result.clone();
        classifier().tagger().enforce_guards(&mut guarded);
        prop_assert_eq!(guarded, result);
    }
}
