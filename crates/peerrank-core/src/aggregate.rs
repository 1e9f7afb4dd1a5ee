//! Robust aggregation: trimmed mean followed by shrinkage toward a baseline.
//!
//! The trimmed mean bounds the pull of a handful of extreme or coordinated
//! ratings. Shrinkage then protects under-sampled entries: with few weighted
//! ratings the score sits near the dimension baseline, and as the weighted
//! count grows past `smoothing_strength` the entry's own data dominates.

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;

/// How the robust mean was obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrimMethod {
    /// Sample too small to trim
    ArithmeticMean,
    Trimmed,
}

/// Result of the trimmed-mean step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrimmedMean {
    pub value: f64,
    pub method: TrimMethod,
    /// Observations removed from each tail
    pub trimmed_per_tail: usize,
    pub original_count: usize,
    pub remaining_count: usize,
}

/// Result of the shrinkage step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Smoothing {
    pub final_score: f64,
    pub robust_mean: f64,
    pub baseline: f64,
    pub weighted_count: u32,
    pub strength: f64,
    /// K / (w + K): share of the final score owed to the baseline
    pub baseline_influence: f64,
}

/// Plain arithmetic mean; 0.0 for an empty slice.
pub fn arithmetic_mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Population variance; 0.0 with fewer than two scores.
pub fn population_variance(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let mean = arithmetic_mean(scores);
    scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64
}

/// Observations trimmed from each tail for a sample of `n`.
pub fn trim_count(n: usize, config: &RankingConfig) -> usize {
    if n < config.min_samples_for_trim {
        return 0;
    }
    let k = (n as f64 * config.trim_percent).floor() as usize;
    // Once a sample is large enough to trim at all, trim at least one per tail
    let k = k.max(1);
    // Never trim away the whole sample
    k.min(n.saturating_sub(1) / 2)
}

/// Trimmed mean of the clean scores.
pub fn trimmed_mean(scores: &[f64], config: &RankingConfig) -> TrimmedMean {
    let n = scores.len();
    let k = trim_count(n, config);

    if k == 0 {
        return TrimmedMean {
            value: arithmetic_mean(scores),
            method: TrimMethod::ArithmeticMean,
            trimmed_per_tail: 0,
            original_count: n,
            remaining_count: n,
        };
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let kept = &sorted[k..n - k];

    TrimmedMean {
        value: arithmetic_mean(kept),
        method: TrimMethod::Trimmed,
        trimmed_per_tail: k,
        original_count: n,
        remaining_count: kept.len(),
    }
}

/// Blend a robust mean with the baseline: (w*m + K*g) / (w + K).
pub fn smooth(robust_mean: f64, weighted_count: u32, baseline: f64, config: &RankingConfig) -> Smoothing {
    let strength = config.smoothing_strength;
    let w = f64::from(weighted_count);

    let (final_score, baseline_influence) = if weighted_count == 0 {
        (baseline, 1.0)
    } else {
        (
            (w * robust_mean + strength * baseline) / (w + strength),
            strength / (w + strength),
        )
    };

    Smoothing {
        final_score,
        robust_mean,
        baseline,
        weighted_count,
        strength,
        baseline_influence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RankingConfig {
        RankingConfig::default()
    }

    #[test]
    fn test_small_sample_is_arithmetic_mean() {
        let scores = [1.0, 9.0, 9.5, 10.0, 0.0, 5.0, 6.5, 7.0, 8.0];
        let result = trimmed_mean(&scores, &config());
        assert_eq!(result.method, TrimMethod::ArithmeticMean);
        assert_eq!(result.value, arithmetic_mean(&scores));
        assert_eq!(result.remaining_count, 9);
    }

    #[test]
    fn test_ten_scores_trim_one_each_side() {
        let scores = [0.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 10.0];
        let result = trimmed_mean(&scores, &config());
        assert_eq!(result.trimmed_per_tail, 1);
        assert_eq!(result.remaining_count, 8);
        assert_eq!(result.value, 5.0);
    }

    #[test]
    fn test_forced_minimum_trim() {
        let config = RankingConfig {
            trim_percent: 0.05,
            ..RankingConfig::default()
        };
        // floor(0.05 * 12) = 0, forced up to 1
        assert_eq!(trim_count(12, &config), 1);
        assert_eq!(trim_count(9, &config), 0);
    }

    #[test]
    fn test_trim_count_for_47() {
        assert_eq!(trim_count(47, &config()), 4);
    }

    #[test]
    fn test_trim_is_order_independent() {
        let a = [3.0, 9.0, 1.0, 7.0, 7.5, 2.0, 8.0, 6.0, 4.0, 5.0, 10.0];
        let mut b = a;
        b.reverse();
        assert_eq!(trimmed_mean(&a, &config()), trimmed_mean(&b, &config()));
    }

    #[test]
    fn test_empty_scores() {
        let result = trimmed_mean(&[], &config());
        assert_eq!(result.value, 0.0);
        assert_eq!(result.original_count, 0);
    }

    #[test]
    fn test_zero_weight_returns_baseline() {
        let result = smooth(9.5, 0, 7.15, &config());
        assert_eq!(result.final_score, 7.15);
        assert_eq!(result.baseline_influence, 1.0);
    }

    #[test]
    fn test_break_even_at_strength() {
        let result = smooth(9.0, 20, 7.0, &config());
        assert_eq!(result.baseline_influence, 0.5);
        assert_eq!(result.final_score, 8.0);
    }

    #[test]
    fn test_large_weight_converges_to_robust_mean() {
        let result = smooth(8.4, 1_000_000, 7.0, &config());
        assert!((result.final_score - 8.4).abs() < 1e-4);
    }

    #[test]
    fn test_population_variance() {
        assert_eq!(population_variance(&[5.0]), 0.0);
        assert_eq!(population_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 4.0);
    }
}
