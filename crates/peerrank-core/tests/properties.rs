//! Property tests for the aggregation and ranking invariants.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use peerrank_core::aggregate::{arithmetic_mean, smooth, trimmed_mean};
use peerrank_core::{rank_dimension, Entry, RankingConfig, Rating, ScoreResult};
use proptest::prelude::*;

const DIM: &str = "fun";

fn entry(id: &str, contestant: &[f64], jury: &[f64]) -> Entry {
    let at = DateTime::<Utc>::UNIX_EPOCH;
    let ratings = contestant
        .iter()
        .enumerate()
        .map(|(i, s)| Rating::contestant(format!("{}-c{}", id, i), *s, at))
        .chain(
            jury.iter()
                .enumerate()
                .map(|(i, s)| Rating::jury(format!("{}-j{}", id, i), *s, at)),
        );
    Entry::new(id, id, format!("owner-{}", id)).with_ratings(DIM, ratings)
}

fn owners() -> BTreeMap<String, u32> {
    [("owner-a", 10), ("owner-b", 10)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn rank_of(results: &[ScoreResult], id: &str) -> u32 {
    results
        .iter()
        .find(|r| r.entry_id == id)
        .and_then(|r| r.placement.rank())
        .expect("entry is ranked")
}

proptest! {
    #[test]
    fn small_samples_are_not_trimmed(scores in prop::collection::vec(0.0f64..=10.0, 0..10)) {
        let result = trimmed_mean(&scores, &RankingConfig::default());
        prop_assert_eq!(result.value, arithmetic_mean(&scores));
        prop_assert_eq!(result.trimmed_per_tail, 0);
    }

    #[test]
    fn trimmed_mean_stays_within_score_range(scores in prop::collection::vec(0.0f64..=10.0, 1..200)) {
        let result = trimmed_mean(&scores, &RankingConfig::default());
        prop_assert!((0.0..=10.0).contains(&result.value));
        prop_assert_eq!(result.remaining_count + 2 * result.trimmed_per_tail, scores.len());
    }

    #[test]
    fn zero_weight_is_exactly_baseline(robust in 0.0f64..=10.0, baseline in 0.0f64..=10.0) {
        let result = smooth(robust, 0, baseline, &RankingConfig::default());
        prop_assert_eq!(result.final_score, baseline);
    }

    #[test]
    fn large_weight_converges_to_robust_mean(robust in 0.0f64..=10.0, baseline in 0.0f64..=10.0) {
        let result = smooth(robust, 10_000_000, baseline, &RankingConfig::default());
        prop_assert!((result.final_score - robust).abs() < 1e-4);
    }

    #[test]
    fn final_score_lies_between_robust_mean_and_baseline(
        robust in 0.0f64..=10.0,
        baseline in 0.0f64..=10.0,
        weight in 0u32..500,
    ) {
        let result = smooth(robust, weight, baseline, &RankingConfig::default());
        let (lo, hi) = if robust < baseline { (robust, baseline) } else { (baseline, robust) };
        prop_assert!(result.final_score >= lo - 1e-9 && result.final_score <= hi + 1e-9);
    }

    #[test]
    fn self_ratings_are_never_counted(
        others in prop::collection::vec(0.0f64..=10.0, 1..30),
        own in prop::collection::vec(0.0f64..=10.0, 1..5),
    ) {
        let at = DateTime::<Utc>::UNIX_EPOCH;
        let e = entry("a", &others, &[])
            .with_ratings(DIM, own.iter().map(|s| Rating::contestant("owner-a", *s, at)));

        let results = rank_dimension(&[e], DIM, 0, &owners(), &RankingConfig::default());
        prop_assert_eq!(results[0].rating_count, others.len());
        prop_assert_eq!(results[0].dropped_self_ratings, own.len());
        prop_assert_eq!(results[0].raw_mean, arithmetic_mean(&others));
    }

    #[test]
    fn raising_ratings_never_lowers_relative_rank(
        a_contestant in prop::collection::vec(0.0f64..=10.0, 20..40),
        a_jury in prop::collection::vec(0.0f64..=10.0, 5..8),
        b_contestant in prop::collection::vec(0.0f64..=10.0, 20..40),
        b_jury in prop::collection::vec(0.0f64..=10.0, 5..8),
        delta in 0.0f64..3.0,
    ) {
        let config = RankingConfig::default();
        let b = entry("b", &b_contestant, &b_jury);
        let before = rank_dimension(
            &[entry("a", &a_contestant, &a_jury), b.clone()],
            DIM, 5, &owners(), &config,
        );

        let raise = |scores: &[f64]| -> Vec<f64> {
            scores.iter().map(|s| (s + delta).min(10.0)).collect()
        };
        let after = rank_dimension(
            &[entry("a", &raise(&a_contestant), &raise(&a_jury)), b],
            DIM, 5, &owners(), &config,
        );

        if rank_of(&before, "a") <= rank_of(&before, "b") {
            prop_assert!(rank_of(&after, "a") <= rank_of(&after, "b"));
        }
    }

    #[test]
    fn identical_inputs_give_identical_output(
        a in prop::collection::vec(0.0f64..=10.0, 0..30),
        b in prop::collection::vec(0.0f64..=10.0, 0..30),
    ) {
        let config = RankingConfig {
            min_contestant_absolute: 5,
            min_jury_absolute: 0,
            min_jury_percent: 0.0,
            ..RankingConfig::default()
        };
        let entries = [entry("a", &a, &[]), entry("b", &b, &[])];
        let first = rank_dimension(&entries, DIM, 0, &owners(), &config);
        let second = rank_dimension(&entries, DIM, 0, &owners(), &config);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
