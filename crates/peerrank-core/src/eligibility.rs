//! Eligibility gate: decides whether an entry is ranked in a dimension.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. owner participation (owner rated enough other entries)
//! 2. contestant threshold
//! 3. jury threshold
//!
//! Failing is an outcome, not an error. The reason is always surfaced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;

/// Population sizes the dynamic thresholds scale with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Population {
    /// Entries in the competition
    pub total_entries: usize,
    /// Size of the jury pool
    pub total_jury: usize,
}

/// Why an entry was kept out of ranked placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IneligibleReason {
    OwnerParticipation { required: u32, actual: u32 },
    ContestantThreshold { required: u32, actual: u32 },
    JuryThreshold { required: u32, actual: u32 },
}

impl IneligibleReason {
    /// Machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            IneligibleReason::OwnerParticipation { .. } => "owner_participation",
            IneligibleReason::ContestantThreshold { .. } => "contestant_threshold",
            IneligibleReason::JuryThreshold { .. } => "jury_threshold",
        }
    }
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::OwnerParticipation { required, actual } => write!(
                f,
                "owner must rate at least {} other entries to be ranked (rated {})",
                required, actual
            ),
            IneligibleReason::ContestantThreshold { required, actual } => write!(
                f,
                "not enough contestant ratings (need {}, have {})",
                required, actual
            ),
            IneligibleReason::JuryThreshold { required, actual } => write!(
                f,
                "not enough jury ratings (need {}, have {})",
                required, actual
            ),
        }
    }
}

/// Gate outcome for one (entry, dimension) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Ineligible { reason: IneligibleReason },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    pub fn reason(&self) -> Option<&IneligibleReason> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::Ineligible { reason } => Some(reason),
        }
    }
}

/// max(absolute, floor(percent x population))
fn dynamic_threshold(absolute: u32, percent: f64, population: usize) -> u32 {
    let scaled = (population as f64 * percent).floor() as u32;
    absolute.max(scaled)
}

/// Contestant ratings required given the number of entries.
pub fn contestant_threshold(population: &Population, config: &RankingConfig) -> u32 {
    dynamic_threshold(
        config.min_contestant_absolute,
        config.min_contestant_percent,
        population.total_entries,
    )
}

/// Jury ratings required given the jury pool size.
pub fn jury_threshold(population: &Population, config: &RankingConfig) -> u32 {
    dynamic_threshold(
        config.min_jury_absolute,
        config.min_jury_percent,
        population.total_jury,
    )
}

/// Run the three checks in order, returning the first failure.
pub fn check(
    owner_rated: u32,
    contestant_count: usize,
    jury_count: usize,
    population: &Population,
    config: &RankingConfig,
) -> Eligibility {
    if owner_rated < config.min_rated_entries_by_owner {
        return Eligibility::Ineligible {
            reason: IneligibleReason::OwnerParticipation {
                required: config.min_rated_entries_by_owner,
                actual: owner_rated,
            },
        };
    }

    let required = contestant_threshold(population, config);
    let actual = saturating_u32(contestant_count);
    if actual < required {
        return Eligibility::Ineligible {
            reason: IneligibleReason::ContestantThreshold { required, actual },
        };
    }

    let required = jury_threshold(population, config);
    let actual = saturating_u32(jury_count);
    if actual < required {
        return Eligibility::Ineligible {
            reason: IneligibleReason::JuryThreshold { required, actual },
        };
    }

    Eligibility::Eligible
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(entries: usize, jury: usize) -> Population {
        Population {
            total_entries: entries,
            total_jury: jury,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let result = check(10, 20, 5, &population(30, 8), &RankingConfig::default());
        assert!(result.is_eligible());
        assert!(result.reason().is_none());
    }

    #[test]
    fn test_owner_participation_first() {
        let result = check(9, 0, 0, &population(30, 8), &RankingConfig::default());
        assert_eq!(
            result.reason(),
            Some(&IneligibleReason::OwnerParticipation { required: 10, actual: 9 })
        );
    }

    #[test]
    fn test_contestant_reason_wins_over_jury() {
        let result = check(12, 3, 1, &population(30, 8), &RankingConfig::default());
        let reason = result.reason().unwrap();
        assert_eq!(reason.code(), "contestant_threshold");
    }

    #[test]
    fn test_percentage_threshold_scales() {
        // 100 entries: max(20, floor(30.0)) = 30
        let config = RankingConfig::default();
        assert_eq!(contestant_threshold(&population(100, 0), &config), 30);
        assert_eq!(contestant_threshold(&population(50, 0), &config), 20);
        // 15 jurors: max(5, floor(7.5)) = 7
        assert_eq!(jury_threshold(&population(0, 15), &config), 7);
    }

    #[test]
    fn test_jury_threshold_failure() {
        let result = check(10, 40, 6, &population(40, 15), &RankingConfig::default());
        assert_eq!(
            result.reason(),
            Some(&IneligibleReason::JuryThreshold { required: 7, actual: 6 })
        );
    }

    #[test]
    fn test_reason_serializes_with_code() {
        let reason = IneligibleReason::JuryThreshold { required: 5, actual: 2 };
        let json = serde_json::to_value(reason).unwrap();
        assert_eq!(json["code"], "jury_threshold");
        assert_eq!(json["required"], 5);
        assert!(reason.to_string().contains("need 5, have 2"));
    }
}
