//! Ranker: orders a dimension's results and assigns display ranks.
//!
//! Eligible entries are sorted by final score, then adjacent pairs whose
//! scores sit within `tie_epsilon` go through the tie-breakers in order:
//! weighted count, variance, jury ratio. When the later entry wins the pair
//! swaps and the walk steps back one position, because the promoted entry
//! may now need to move further up. Ineligible entries follow, unranked,
//! ordered by raw mean.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RankingConfig;
use crate::types::{Placement, ScoreResult};

/// Variances closer than this are treated as equal.
pub const VARIANCE_TOLERANCE: f64 = 1e-6;

/// Tie-breaker that settled a close pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    WeightedCount,
    Variance,
    JuryRatio,
}

/// Outcome of comparing two adjacent results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Scores differ by at least epsilon; the score order stands
    Separated,
    FirstWins(TieBreaker),
    SecondWins(TieBreaker),
    /// Every tie-breaker was exhausted
    Tie,
}

/// Work done by the re-stabilization walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilizeStats {
    pub pair_checks: usize,
    pub swaps: usize,
    /// The swap cap was reached and the remaining order left as is
    pub capped: bool,
}

fn final_score(result: &ScoreResult) -> f64 {
    result.final_score().unwrap_or(f64::NEG_INFINITY)
}

/// Compare an adjacent pair, applying tie-breakers when their final scores
/// are strictly closer than `tie_epsilon`.
pub fn compare_pair(a: &ScoreResult, b: &ScoreResult, config: &RankingConfig) -> PairOutcome {
    let close = (final_score(a) - final_score(b)).abs() < config.tie_epsilon;
    if !close {
        return PairOutcome::Separated;
    }

    if a.weighted_count != b.weighted_count {
        return if a.weighted_count > b.weighted_count {
            PairOutcome::FirstWins(TieBreaker::WeightedCount)
        } else {
            PairOutcome::SecondWins(TieBreaker::WeightedCount)
        };
    }

    if (a.variance - b.variance).abs() > VARIANCE_TOLERANCE {
        return if a.variance < b.variance {
            PairOutcome::FirstWins(TieBreaker::Variance)
        } else {
            PairOutcome::SecondWins(TieBreaker::Variance)
        };
    }

    let (ratio_a, ratio_b) = (a.jury_ratio(), b.jury_ratio());
    if (ratio_a - ratio_b).abs() > config.jury_ratio_margin {
        return if ratio_a > ratio_b {
            PairOutcome::FirstWins(TieBreaker::JuryRatio)
        } else {
            PairOutcome::SecondWins(TieBreaker::JuryRatio)
        };
    }

    PairOutcome::Tie
}

/// Walk adjacent pairs, swapping when the later entry wins a tie-break and
/// stepping back to re-check the newly adjacent pair.
///
/// Already-ordered input costs exactly `len - 1` pair checks. Tie-breakers
/// are not guaranteed transitive across an epsilon chain, so swaps are capped
/// at `len^2`.
pub fn stabilize(results: &mut [ScoreResult], config: &RankingConfig) -> StabilizeStats {
    let n = results.len();
    let swap_cap = n.saturating_mul(n);
    let mut stats = StabilizeStats::default();
    let mut i = 0;

    while i + 1 < n {
        stats.pair_checks += 1;
        match compare_pair(&results[i], &results[i + 1], config) {
            PairOutcome::SecondWins(breaker) if stats.swaps < swap_cap => {
                debug!(
                    winner = %results[i + 1].entry_id,
                    loser = %results[i].entry_id,
                    ?breaker,
                    "tie-break swap"
                );
                results.swap(i, i + 1);
                stats.swaps += 1;
                i = i.saturating_sub(1);
            }
            PairOutcome::SecondWins(_) => {
                if !stats.capped {
                    warn!(swaps = stats.swaps, "tie-break swap cap reached, keeping current order");
                    stats.capped = true;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    stats
}

/// Assign ranks to an already-ordered run of eligible results.
///
/// An entry tied with its predecessor copies the predecessor's rank; every
/// member of a tie is flagged.
pub fn assign_ranks(results: &mut [ScoreResult], config: &RankingConfig) {
    let tied_with_prev: Vec<bool> = (0..results.len())
        .map(|i| i > 0 && compare_pair(&results[i - 1], &results[i], config) == PairOutcome::Tie)
        .collect();

    let mut rank = 1u32;
    for i in 0..results.len() {
        if i > 0 && !tied_with_prev[i] {
            rank = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }
        let tied = tied_with_prev[i] || tied_with_prev.get(i + 1).copied().unwrap_or(false);
        results[i].placement = Placement::Ranked { rank, tied };
    }
}

/// Order a dimension's results: ranked entries first, then unranked ones.
pub fn rank_results(results: Vec<ScoreResult>, config: &RankingConfig) -> Vec<ScoreResult> {
    let (mut ranked, mut unranked): (Vec<_>, Vec<_>) =
        results.into_iter().partition(ScoreResult::is_eligible);

    ranked.sort_by(|a, b| final_score(b).total_cmp(&final_score(a)));
    let stats = stabilize(&mut ranked, config);
    debug!(
        ranked = ranked.len(),
        pair_checks = stats.pair_checks,
        swaps = stats.swaps,
        "ordering stabilized"
    );
    assign_ranks(&mut ranked, config);

    unranked.sort_by(|a, b| b.raw_mean.total_cmp(&a.raw_mean));
    for result in &mut unranked {
        result.placement = Placement::Unranked;
    }

    ranked.extend(unranked);
    ranked
}
