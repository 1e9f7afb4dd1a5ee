//! Ranking configuration.
//!
//! One `RankingConfig` is passed into every pipeline call and stays fixed for
//! the whole run. Tie epsilon and smoothing strength in particular must not
//! vary between entries, or the ordering stops being consistent.
//!
//! Example YAML (every field is optional and falls back to the default):
//! ```yaml
//! min_rated_entries_by_owner: 10
//! min_contestant_absolute: 20
//! min_contestant_percent: 0.3
//! smoothing_strength: 20
//! tie_epsilon: 0.01
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid ranking configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Thresholds and constants for one ranking run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Owners must have rated at least this many other entries to be ranked
    pub min_rated_entries_by_owner: u32,

    /// Contestant floor: max(absolute, percent x entry count)
    pub min_contestant_absolute: u32,
    pub min_contestant_percent: f64,

    /// Jury floor: max(absolute, percent x jury pool size)
    pub min_jury_absolute: u32,
    pub min_jury_percent: f64,

    /// Fraction trimmed from each tail of the sorted scores
    pub trim_percent: f64,

    /// Samples below this size are averaged without trimming
    pub min_samples_for_trim: usize,

    /// K in (w*m + K*g) / (w + K); also the break-even weighted count
    pub smoothing_strength: f64,

    /// Baseline used when no entry has any clean rating in a dimension
    pub default_baseline: f64,

    /// Final scores closer than this (strictly) go to the tie-breakers
    pub tie_epsilon: f64,

    /// Jury ratios must differ by more than this to break a tie
    pub jury_ratio_margin: f64,

    /// Rank cut-off that counts toward the preferred designation
    pub preferred_top_n: u32,

    /// Top-N dimensions needed for the preferred designation
    pub preferred_min_dimensions: usize,

    /// Rater reputation weighting. Not available in this edition.
    pub rater_reputation: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_rated_entries_by_owner: 10,
            min_contestant_absolute: 20,
            min_contestant_percent: 0.3,
            min_jury_absolute: 5,
            min_jury_percent: 0.5,
            trim_percent: 0.1,
            min_samples_for_trim: 10,
            smoothing_strength: 20.0,
            default_baseline: 7.0,
            tie_epsilon: 0.01,
            jury_ratio_margin: 0.01,
            preferred_top_n: 10,
            preferred_min_dimensions: 3,
            rater_reputation: false,
        }
    }
}

impl RankingConfig {
    /// Parse and validate a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RankingConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RankingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load from a file, choosing JSON for `.json` and YAML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if is_json(path) {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    /// Check every constraint and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("min_contestant_percent", self.min_contestant_percent),
            ("min_jury_percent", self.min_jury_percent),
            ("jury_ratio_margin", self.jury_ratio_margin),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{}: must be within [0, 1], got {}", name, value));
            }
        }

        if !(0.0..0.5).contains(&self.trim_percent) {
            errors.push(format!(
                "trim_percent: must be within [0, 0.5), got {}",
                self.trim_percent
            ));
        }

        if !self.smoothing_strength.is_finite() || self.smoothing_strength < 0.0 {
            errors.push(format!(
                "smoothing_strength: must be non-negative, got {}",
                self.smoothing_strength
            ));
        }

        if !(0.0..=10.0).contains(&self.default_baseline) {
            errors.push(format!(
                "default_baseline: must be within the 0-10 score scale, got {}",
                self.default_baseline
            ));
        }

        if !self.tie_epsilon.is_finite() || self.tie_epsilon <= 0.0 {
            errors.push(format!("tie_epsilon: must be positive, got {}", self.tie_epsilon));
        }

        if self.preferred_top_n == 0 {
            errors.push("preferred_top_n: must be at least 1".to_string());
        }

        if self.rater_reputation {
            errors.push("rater_reputation: not supported in this edition".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Weighted count at which the entry's own data and the baseline carry
    /// equal influence.
    pub fn break_even_weighted_count(&self) -> f64 {
        self.smoothing_strength
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
