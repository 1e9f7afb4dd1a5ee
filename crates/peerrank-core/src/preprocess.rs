//! Preprocessor: screens raw ratings into a clean working set.
//!
//! Each rating gets a tagged outcome rather than a keep/drop boolean, so a
//! high-risk rating stays in the scoring set while remaining visible to the
//! audit trail.

use tracing::debug;

use crate::types::{Entry, RaterClass, Rating};

/// Lowest and highest valid score.
pub const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// Why a rating was removed from the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The rater owns the entry
    SelfRating,
    /// Score outside [0, 10] or not a number
    OutOfRange,
}

/// Outcome of screening a single rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    Clean,
    /// Counted toward scoring and also recorded for audit
    CleanButFlagged,
    Dropped(DropReason),
}

/// Screen one rating against the entry owner.
pub fn screen(rating: &Rating, owner_id: &str) -> ScreenOutcome {
    if rating.rater_id == owner_id {
        return ScreenOutcome::Dropped(DropReason::SelfRating);
    }

    // NaN fails the range check too
    if !SCORE_RANGE.contains(&rating.score) {
        return ScreenOutcome::Dropped(DropReason::OutOfRange);
    }

    if rating.high_risk {
        ScreenOutcome::CleanButFlagged
    } else {
        ScreenOutcome::Clean
    }
}

/// A rating that survived screening.
#[derive(Debug, Clone, Copy)]
pub struct Accepted<'a> {
    pub rating: &'a Rating,
    pub flagged: bool,
}

/// The clean working set for one (entry, dimension) pair.
#[derive(Debug, Clone, Default)]
pub struct CleanSet<'a> {
    /// Accepted ratings in their original order
    pub accepted: Vec<Accepted<'a>>,
    pub dropped_self: usize,
    pub dropped_invalid: usize,
}

impl<'a> CleanSet<'a> {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    /// Clean ratings, flagged or not.
    pub fn ratings(&self) -> impl Iterator<Item = &'a Rating> + '_ {
        self.accepted.iter().map(|a| a.rating)
    }

    /// The flagged subset, kept for audit.
    pub fn flagged(&self) -> impl Iterator<Item = &'a Rating> + '_ {
        self.accepted.iter().filter(|a| a.flagged).map(|a| a.rating)
    }

    pub fn flagged_count(&self) -> usize {
        self.accepted.iter().filter(|a| a.flagged).count()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.ratings().map(|r| r.score).collect()
    }

    pub fn count_of(&self, class: RaterClass) -> usize {
        self.ratings().filter(|r| r.rater_class == class).count()
    }

    pub fn contestant_count(&self) -> usize {
        self.count_of(RaterClass::Contestant)
    }

    pub fn jury_count(&self) -> usize {
        self.count_of(RaterClass::Jury)
    }

    /// Contestant ratings count once, jury ratings twice.
    pub fn weighted_count(&self) -> u32 {
        self.ratings().map(|r| r.rater_class.participation_weight()).sum()
    }
}

/// Build the clean working set for one entry in one dimension.
pub fn preprocess<'a>(entry: &'a Entry, dimension: &str) -> CleanSet<'a> {
    let mut set = CleanSet::default();

    for rating in entry.ratings_for(dimension) {
        match screen(rating, &entry.owner_id) {
            ScreenOutcome::Clean => set.accepted.push(Accepted { rating, flagged: false }),
            ScreenOutcome::CleanButFlagged => {
                debug!(
                    entry = %entry.id,
                    dimension,
                    rater = %rating.rater_id,
                    "high-risk rating retained for audit"
                );
                set.accepted.push(Accepted { rating, flagged: true });
            }
            ScreenOutcome::Dropped(DropReason::SelfRating) => set.dropped_self += 1,
            ScreenOutcome::Dropped(DropReason::OutOfRange) => {
                debug!(
                    entry = %entry.id,
                    dimension,
                    rater = %rating.rater_id,
                    score = rating.score,
                    "dropping out-of-range rating"
                );
                set.dropped_invalid += 1;
            }
        }
    }

    set
}
