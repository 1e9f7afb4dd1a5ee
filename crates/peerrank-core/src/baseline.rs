//! Global baseline: the reference mean for a dimension.
//!
//! Every entry with at least one clean rating contributes its trimmed mean,
//! whether or not it later passes the eligibility gate. Leaving ineligible
//! entries out would pull the reference toward the well-sampled entries and
//! flatter high-rated, under-sampled ones.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::trimmed_mean;
use crate::config::RankingConfig;
use crate::preprocess::CleanSet;

/// Baseline for one dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Baseline {
    pub value: f64,
    /// Entries whose trimmed mean went into the average
    pub contributing_entries: usize,
    /// True when no entry had data and the configured default was used
    pub defaulted: bool,
}

/// Mean of the per-entry trimmed means over every non-empty clean set.
pub fn global_baseline(sets: &[CleanSet<'_>], config: &RankingConfig) -> Baseline {
    let means: Vec<f64> = sets
        .iter()
        .filter(|set| !set.is_empty())
        .map(|set| trimmed_mean(&set.scores(), config).value)
        .collect();

    if means.is_empty() {
        warn!(
            default = config.default_baseline,
            "no clean ratings in dimension, using default baseline"
        );
        return Baseline {
            value: config.default_baseline,
            contributing_entries: 0,
            defaulted: true,
        };
    }

    Baseline {
        value: means.iter().sum::<f64>() / means.len() as f64,
        contributing_entries: means.len(),
        defaulted: false,
    }
}
