//! Core data model: ratings, entries and per-dimension score results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Smoothing, TrimmedMean};
use crate::eligibility::Eligibility;

/// Which rater population a rating came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RaterClass {
    Contestant,
    Jury,
}

impl RaterClass {
    /// Weight of one clean rating toward the participation count.
    pub fn participation_weight(self) -> u32 {
        match self {
            RaterClass::Contestant => 1,
            RaterClass::Jury => 2,
        }
    }
}

impl fmt::Display for RaterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaterClass::Contestant => write!(f, "contestant"),
            RaterClass::Jury => write!(f, "jury"),
        }
    }
}

/// A single recorded rating. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Identity of the rater
    pub rater_id: String,

    /// Population the rater belongs to
    pub rater_class: RaterClass,

    /// Score on the 0-10 scale
    pub score: f64,

    /// When the rating was submitted
    pub timestamp: DateTime<Utc>,

    /// Set by the rating surface when the rater's behavior looked suspicious
    #[serde(default)]
    pub high_risk: bool,
}

impl Rating {
    pub fn new(
        rater_id: impl Into<String>,
        rater_class: RaterClass,
        score: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            rater_id: rater_id.into(),
            rater_class,
            score,
            timestamp,
            high_risk: false,
        }
    }

    pub fn contestant(rater_id: impl Into<String>, score: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(rater_id, RaterClass::Contestant, score, timestamp)
    }

    pub fn jury(rater_id: impl Into<String>, score: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(rater_id, RaterClass::Jury, score, timestamp)
    }

    /// Mark this rating as high-risk.
    pub fn flagged(mut self) -> Self {
        self.high_risk = true;
        self
    }
}

/// A competition entry and every rating it received, keyed by dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique entry identifier
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Identity of the entry's owner; their ratings on this entry never count
    pub owner_id: String,

    /// Dimension name -> ratings in submission order
    #[serde(default)]
    pub ratings: BTreeMap<String, Vec<Rating>>,
}

impl Entry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            ratings: BTreeMap::new(),
        }
    }

    /// Append ratings to a dimension (builder style).
    pub fn with_ratings(
        mut self,
        dimension: impl Into<String>,
        ratings: impl IntoIterator<Item = Rating>,
    ) -> Self {
        self.ratings.entry(dimension.into()).or_default().extend(ratings);
        self
    }

    /// Raw ratings for a dimension; empty if the entry was never rated in it.
    pub fn ratings_for(&self, dimension: &str) -> &[Rating] {
        self.ratings.get(dimension).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Where an entry landed in a dimension's ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Placement {
    Ranked {
        rank: u32,
        /// True for every member of a declared tie
        tied: bool,
    },
    Unranked,
}

impl Placement {
    pub fn rank(&self) -> Option<u32> {
        match self {
            Placement::Ranked { rank, .. } => Some(*rank),
            Placement::Unranked => None,
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Placement::Ranked { .. })
    }

    pub fn is_tied(&self) -> bool {
        matches!(self, Placement::Ranked { tied: true, .. })
    }

    /// Display form: "3", "T-3" or "unranked".
    pub fn display(&self) -> String {
        match self {
            Placement::Ranked { rank, tied: true } => format!("T-{}", rank),
            Placement::Ranked { rank, tied: false } => rank.to_string(),
            Placement::Unranked => "unranked".to_string(),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Everything computed for one entry in one dimension.
///
/// Built once per ranking run. The explainer renders these figures verbatim,
/// so nothing downstream recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResult {
    pub entry_id: String,
    pub entry_name: String,

    /// Outcome of the eligibility gate
    pub eligibility: Eligibility,

    /// Untrimmed, unsmoothed mean of the clean scores (0.0 with no data)
    pub raw_mean: f64,

    /// Trimmed-mean computation over the clean scores
    pub robust: TrimmedMean,

    /// Shrinkage toward the baseline; present only for eligible entries
    pub smoothing: Option<Smoothing>,

    /// Contestant clean ratings plus twice the jury clean ratings
    pub weighted_count: u32,

    pub rating_count: usize,
    pub contestant_count: usize,
    pub jury_count: usize,

    /// Clean ratings that carried the high-risk flag (still counted)
    pub flagged_count: usize,

    /// Self-ratings removed by the preprocessor
    pub dropped_self_ratings: usize,

    /// Out-of-range or non-finite ratings removed by the preprocessor
    pub dropped_invalid: usize,

    /// Population variance of the clean scores
    pub variance: f64,

    pub placement: Placement,
}

impl ScoreResult {
    pub fn is_eligible(&self) -> bool {
        self.eligibility.is_eligible()
    }

    /// Smoothed final score; `None` for ineligible entries.
    pub fn final_score(&self) -> Option<f64> {
        self.smoothing.as_ref().map(|s| s.final_score)
    }

    /// Share of clean ratings that came from the jury.
    pub fn jury_ratio(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.jury_count as f64 / self.rating_count as f64
        }
    }
}
