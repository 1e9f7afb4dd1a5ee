//! Per-dimension ranking pipeline.
//!
//! Preprocess every entry, compute the baseline over all of them, then gate,
//! aggregate and rank. The baseline is a barrier: no final score exists until
//! every entry's clean set is known.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{arithmetic_mean, population_variance, smooth, trimmed_mean};
use crate::baseline::{global_baseline, Baseline};
use crate::config::RankingConfig;
use crate::eligibility::{self, Eligibility, Population};
use crate::preprocess::{preprocess, CleanSet};
use crate::ranker::rank_results;
use crate::types::{Entry, Placement, ScoreResult};

/// The ordered results of one dimension together with its baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionRanking {
    pub dimension: String,
    pub baseline: Baseline,
    /// Ranked entries first, then unranked ones
    pub results: Vec<ScoreResult>,
}

impl DimensionRanking {
    /// Run the full pipeline for one dimension.
    pub fn compute(
        entries: &[Entry],
        dimension: &str,
        total_jury: usize,
        owner_rated_counts: &BTreeMap<String, u32>,
        config: &RankingConfig,
    ) -> Self {
        let population = Population {
            total_entries: entries.len(),
            total_jury,
        };

        let sets: Vec<CleanSet<'_>> = entries.iter().map(|e| preprocess(e, dimension)).collect();
        let baseline = global_baseline(&sets, config);

        let results: Vec<ScoreResult> = entries
            .iter()
            .zip(&sets)
            .map(|(entry, set)| {
                let owner_rated = owner_rated_counts.get(&entry.owner_id).copied().unwrap_or(0);
                score_entry(entry, set, baseline.value, owner_rated, &population, config)
            })
            .collect();

        let results = rank_results(results, config);
        let ranked = results.iter().filter(|r| r.placement.is_ranked()).count();
        info!(
            dimension,
            entries = entries.len(),
            ranked,
            baseline = baseline.value,
            "dimension ranked"
        );

        Self {
            dimension: dimension.to_string(),
            baseline,
            results,
        }
    }

    /// Result for one entry, if present.
    pub fn result_for(&self, entry_id: &str) -> Option<&ScoreResult> {
        self.results.iter().find(|r| r.entry_id == entry_id)
    }
}

/// Gate and aggregate one entry. Placement is filled in by the ranker.
pub fn score_entry(
    entry: &Entry,
    set: &CleanSet<'_>,
    baseline: f64,
    owner_rated: u32,
    population: &Population,
    config: &RankingConfig,
) -> ScoreResult {
    let scores = set.scores();
    let contestant_count = set.contestant_count();
    let jury_count = set.jury_count();
    let weighted_count = set.weighted_count();

    let eligibility = eligibility::check(owner_rated, contestant_count, jury_count, population, config);
    let robust = trimmed_mean(&scores, config);

    let smoothing = match &eligibility {
        Eligibility::Eligible => Some(smooth(robust.value, weighted_count, baseline, config)),
        Eligibility::Ineligible { reason } => {
            debug!(entry = %entry.id, code = reason.code(), %reason, "entry not eligible");
            None
        }
    };

    ScoreResult {
        entry_id: entry.id.clone(),
        entry_name: entry.name.clone(),
        eligibility,
        raw_mean: arithmetic_mean(&scores),
        robust,
        smoothing,
        weighted_count,
        rating_count: scores.len(),
        contestant_count,
        jury_count,
        flagged_count: set.flagged_count(),
        dropped_self_ratings: set.dropped_self,
        dropped_invalid: set.dropped_invalid,
        variance: population_variance(&scores),
        placement: Placement::Unranked,
    }
}
