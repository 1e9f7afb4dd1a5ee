//! Preferred-entry designation.
//!
//! Only dimensions where the entry was actually ranked count. A dimension the
//! entry failed eligibility in neither helps nor hurts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::types::ScoreResult;

/// Preferred classification for one entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preference {
    pub entry_id: String,
    pub preferred: bool,
    /// Dimensions the entry was ranked in
    pub ranked_dimensions: usize,
    /// Ranked dimensions where the entry made the top N, in key order
    pub top_dimensions: Vec<String>,
    pub min_required: usize,
}

/// Classify one entry from its per-dimension results.
pub fn classify<'a>(
    entry_id: &str,
    results: impl IntoIterator<Item = (&'a str, &'a ScoreResult)>,
    config: &RankingConfig,
) -> Preference {
    let mut ranked_dimensions = 0;
    let mut top_dimensions = Vec::new();

    for (dimension, result) in results {
        let Some(rank) = result.placement.rank() else {
            continue;
        };
        ranked_dimensions += 1;
        if rank <= config.preferred_top_n {
            top_dimensions.push(dimension.to_string());
        }
    }

    Preference {
        entry_id: entry_id.to_string(),
        preferred: ranked_dimensions > 0 && top_dimensions.len() >= config.preferred_min_dimensions,
        ranked_dimensions,
        top_dimensions,
        min_required: config.preferred_min_dimensions,
    }
}

/// Classify every entry that appears in the per-dimension rankings.
pub fn classify_entries(
    rankings: &BTreeMap<String, Vec<ScoreResult>>,
    config: &RankingConfig,
) -> BTreeMap<String, Preference> {
    let mut by_entry: BTreeMap<&str, Vec<(&str, &ScoreResult)>> = BTreeMap::new();
    for (dimension, results) in rankings {
        for result in results {
            by_entry
                .entry(result.entry_id.as_str())
                .or_default()
                .push((dimension.as_str(), result));
        }
    }

    by_entry
        .into_iter()
        .map(|(entry_id, results)| (entry_id.to_string(), classify(entry_id, results, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{TrimMethod, TrimmedMean};
    use crate::eligibility::{Eligibility, IneligibleReason};
    use crate::types::Placement;

    fn placed(entry_id: &str, placement: Placement) -> ScoreResult {
        let eligibility = if placement.is_ranked() {
            Eligibility::Eligible
        } else {
            Eligibility::Ineligible {
                reason: IneligibleReason::JuryThreshold { required: 5, actual: 0 },
            }
        };
        ScoreResult {
            entry_id: entry_id.to_string(),
            entry_name: entry_id.to_string(),
            eligibility,
            raw_mean: 0.0,
            robust: TrimmedMean {
                value: 0.0,
                method: TrimMethod::ArithmeticMean,
                trimmed_per_tail: 0,
                original_count: 0,
                remaining_count: 0,
            },
            smoothing: None,
            weighted_count: 0,
            rating_count: 0,
            contestant_count: 0,
            jury_count: 0,
            flagged_count: 0,
            dropped_self_ratings: 0,
            dropped_invalid: 0,
            variance: 0.0,
            placement,
        }
    }

    fn ranked(rank: u32) -> Placement {
        Placement::Ranked { rank, tied: false }
    }

    #[test]
    fn test_three_top_ten_dimensions_is_preferred() {
        let results = [
            ("art", placed("g1", ranked(1))),
            ("fun", placed("g1", ranked(10))),
            ("sound", placed("g1", Placement::Ranked { rank: 4, tied: true })),
            ("story", placed("g1", ranked(11))),
        ];
        let pref = classify(
            "g1",
            results.iter().map(|(d, r)| (*d, r)),
            &RankingConfig::default(),
        );
        assert!(pref.preferred);
        assert_eq!(pref.ranked_dimensions, 4);
        assert_eq!(pref.top_dimensions, vec!["art", "fun", "sound"]);
    }

    #[test]
    fn test_unranked_dimensions_do_not_count() {
        let results = [
            ("art", placed("g1", ranked(2))),
            ("fun", placed("g1", ranked(3))),
            ("sound", placed("g1", Placement::Unranked)),
        ];
        let pref = classify(
            "g1",
            results.iter().map(|(d, r)| (*d, r)),
            &RankingConfig::default(),
        );
        assert!(!pref.preferred);
        assert_eq!(pref.ranked_dimensions, 2);
    }

    #[test]
    fn test_never_ranked_is_never_preferred() {
        let config = RankingConfig {
            preferred_min_dimensions: 0,
            ..RankingConfig::default()
        };
        let results = [("art", placed("g1", Placement::Unranked))];
        let pref = classify("g1", results.iter().map(|(d, r)| (*d, r)), &config);
        assert!(!pref.preferred);
    }

    #[test]
    fn test_classify_entries_groups_by_entry() {
        let mut rankings = BTreeMap::new();
        for dim in ["art", "fun", "sound"] {
            rankings.insert(
                dim.to_string(),
                vec![placed("g1", ranked(1)), placed("g2", Placement::Unranked)],
            );
        }
        let prefs = classify_entries(&rankings, &RankingConfig::default());
        assert_eq!(prefs.len(), 2);
        assert!(prefs["g1"].preferred);
        assert!(!prefs["g2"].preferred);
        assert_eq!(prefs["g2"].ranked_dimensions, 0);
    }
}
