//! # peerrank-core
//!
//! Deterministic ranking engine for peer-rated competitions.
//!
//! Two rater populations (a large contestant pool and a small jury) score
//! each entry along independent dimensions. For every dimension this crate
//! produces a ranking that holds up under sparse and adversarial data:
//!
//! 1. **Preprocess**: drop self-ratings and out-of-range scores, keep
//!    high-risk ratings but record them
//! 2. **Baseline**: mean of every rated entry's trimmed mean
//! 3. **Gate**: owner participation, contestant and jury thresholds
//! 4. **Aggregate**: trimmed mean, then shrinkage toward the baseline
//! 5. **Rank**: score order with deterministic tie-breaking
//! 6. **Classify**: preferred entries across dimensions
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same snapshot and configuration, same output
//! 2. **No error path in the core**: bad ratings are dropped, thin data
//!    falls back to defined constants, ineligibility is an outcome
//! 3. **Traceable**: every figure in an explanation is the figure that was
//!    ranked
//! 4. **Parallel-safe**: dimensions share no state and can run on separate
//!    threads
//!
//! ## Example
//!
//! ```rust,ignore
//! use peerrank_core::{explain, rank_competition, Competition, RankingConfig};
//!
//! let competition = Competition::from_yaml_file("snapshot.yaml")?;
//! let config = RankingConfig::default();
//! let ranking = rank_competition(&competition, &config);
//!
//! for result in &ranking.dimensions["innovation"].results {
//!     println!("{}", explain(result, "innovation"));
//! }
//! ```

pub mod aggregate;
pub mod baseline;
pub mod classifier;
pub mod competition;
pub mod config;
pub mod eligibility;
pub mod explain;
pub mod participation;
pub mod pipeline;
pub mod preprocess;
pub mod ranker;
pub mod types;

// Re-export main types at crate root
pub use aggregate::{Smoothing, TrimMethod, TrimmedMean};
pub use baseline::Baseline;
pub use classifier::{classify_entries, Preference};
pub use competition::{Competition, CompetitionError};
pub use config::{ConfigError, RankingConfig};
pub use eligibility::{Eligibility, IneligibleReason, Population};
pub use explain::explain;
pub use participation::owner_rated_counts;
pub use pipeline::DimensionRanking;
pub use types::{Entry, Placement, RaterClass, Rating, ScoreResult};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rank every entry in one dimension.
///
/// This is the main entry point for a single dimension.
///
/// # Arguments
///
/// * `entries` - Every entry in the competition, rated in this dimension or not
/// * `dimension` - Dimension key to rank
/// * `total_jury` - Size of the jury pool
/// * `owner_rated_counts` - Owner -> number of other entries they rated
/// * `config` - Thresholds and constants, fixed for the run
///
/// # Returns
///
/// Ranked entries in rank order followed by unranked entries ordered by raw
/// mean.
pub fn rank_dimension(
    entries: &[Entry],
    dimension: &str,
    total_jury: usize,
    owner_rated_counts: &BTreeMap<String, u32>,
    config: &RankingConfig,
) -> Vec<ScoreResult> {
    DimensionRanking::compute(entries, dimension, total_jury, owner_rated_counts, config).results
}

/// Rankings for every dimension of a competition plus preferred entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitionRanking {
    pub dimensions: BTreeMap<String, DimensionRanking>,
    pub preferences: BTreeMap<String, Preference>,
}

impl CompetitionRanking {
    /// Entries designated preferred, in id order.
    pub fn preferred(&self) -> impl Iterator<Item = &Preference> {
        self.preferences.values().filter(|p| p.preferred)
    }
}

/// Rank every dimension present in the snapshot and classify entries.
pub fn rank_competition(competition: &Competition, config: &RankingConfig) -> CompetitionRanking {
    let dimensions = competition.dimensions();
    rank_competition_dimensions(competition, dimensions.iter().map(String::as_str), config)
}

/// Rank the selected dimensions only.
///
/// Preferred classification only sees the dimensions ranked here.
pub fn rank_competition_dimensions<'a>(
    competition: &Competition,
    dimensions: impl IntoIterator<Item = &'a str>,
    config: &RankingConfig,
) -> CompetitionRanking {
    let owner_counts = competition.owner_rated_counts();

    // Sequential in key order; each dimension is independent
    let dimensions: BTreeMap<String, DimensionRanking> = dimensions
        .into_iter()
        .map(|dimension| {
            let ranking = DimensionRanking::compute(
                &competition.entries,
                dimension,
                competition.total_jury,
                &owner_counts,
                config,
            );
            (dimension.to_string(), ranking)
        })
        .collect();

    let results: BTreeMap<String, Vec<ScoreResult>> = dimensions
        .iter()
        .map(|(dimension, ranking)| (dimension.clone(), ranking.results.clone()))
        .collect();
    let preferences = classify_entries(&results, config);

    CompetitionRanking {
        dimensions,
        preferences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn at(i: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(i)
    }

    fn rated_entry(id: &str, owner: &str, dimension: &str, contestant: &[f64], jury: &[f64]) -> Entry {
        let ratings = contestant
            .iter()
            .enumerate()
            .map(|(i, s)| Rating::contestant(format!("c{}", i), *s, at(i as i64)))
            .chain(
                jury.iter()
                    .enumerate()
                    .map(|(i, s)| Rating::jury(format!("j{}", i), *s, at(1000 + i as i64))),
            );
        Entry::new(id, id.to_uppercase(), owner).with_ratings(dimension, ratings)
    }

    fn active_owners(owners: &[&str]) -> BTreeMap<String, u32> {
        owners.iter().map(|o| (o.to_string(), 10)).collect()
    }

    #[test]
    fn test_basic_dimension_ranking() {
        let entries = vec![
            rated_entry("a", "oa", "art", &[7.0; 20], &[7.0; 5]),
            rated_entry("b", "ob", "art", &[9.0; 20], &[9.0; 5]),
            rated_entry("c", "oc", "art", &[8.0; 3], &[]),
        ];
        let results = rank_dimension(
            &entries,
            "art",
            5,
            &active_owners(&["oa", "ob", "oc"]),
            &RankingConfig::default(),
        );

        let order: Vec<_> = results.iter().map(|r| r.entry_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(results[0].placement.rank(), Some(1));
        assert_eq!(results[1].placement.rank(), Some(2));
        assert_eq!(results[2].placement, Placement::Unranked);
        assert_eq!(
            results[2].eligibility.reason().map(|r| r.code()),
            Some("contestant_threshold")
        );
    }

    #[test]
    fn test_missing_owner_count_is_zero() {
        let entries = vec![rated_entry("a", "oa", "art", &[7.0; 20], &[7.0; 5])];
        let results = rank_dimension(&entries, "art", 5, &BTreeMap::new(), &RankingConfig::default());
        assert_eq!(
            results[0].eligibility.reason().map(|r| r.code()),
            Some("owner_participation")
        );
    }

    #[test]
    fn test_rank_competition_covers_all_dimensions() {
        let entries = vec![
            rated_entry("a", "oa", "art", &[7.0; 20], &[7.0; 5]),
            rated_entry("b", "ob", "fun", &[9.0; 20], &[9.0; 5]),
        ];
        let mut competition = Competition::new(5, entries);
        competition.owner_rated_counts = Some(active_owners(&["oa", "ob"]));

        let ranking = rank_competition(&competition, &RankingConfig::default());
        assert_eq!(ranking.dimensions.len(), 2);
        assert_eq!(ranking.dimensions["art"].results.len(), 2);
        assert_eq!(ranking.preferences.len(), 2);
        assert_eq!(ranking.preferred().count(), 0);
    }

    #[test]
    fn test_identical_runs_serialize_identically() {
        let entries = vec![
            rated_entry("a", "oa", "art", &[7.0, 8.0, 6.5, 9.0], &[7.0]),
            rated_entry("b", "ob", "art", &[9.0, 2.0], &[9.0, 8.0]),
        ];
        let mut competition = Competition::new(2, entries);
        competition.owner_rated_counts = Some(active_owners(&["oa", "ob"]));
        let config = RankingConfig {
            min_contestant_absolute: 1,
            min_jury_absolute: 1,
            ..RankingConfig::default()
        };

        let first = serde_json::to_string(&rank_competition(&competition, &config)).unwrap();
        let second = serde_json::to_string(&rank_competition(&competition, &config)).unwrap();
        assert_eq!(first, second);
    }
}
