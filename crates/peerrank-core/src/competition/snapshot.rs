//! Competition snapshot parsing from YAML/JSON.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::validate_competition_schema;
use crate::config::is_json;
use crate::eligibility::Population;
use crate::participation::owner_rated_counts;
use crate::types::Entry;

/// Errors that can occur when loading a snapshot.
#[derive(Error, Debug)]
pub enum CompetitionError {
    #[error("Failed to read snapshot file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Snapshot does not match schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Snapshot validation failed: {0}")]
    ValidationError(String),
}

/// Immutable input to one ranking run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Competition {
    /// Optional label for reports
    #[serde(default)]
    pub name: Option<String>,

    /// Size of the jury pool
    pub total_jury: usize,

    /// Owner -> number of other entries they rated. Derived from the
    /// ratings when absent.
    #[serde(default)]
    pub owner_rated_counts: Option<BTreeMap<String, u32>>,

    pub entries: Vec<Entry>,
}

impl Competition {
    pub fn new(total_jury: usize, entries: Vec<Entry>) -> Self {
        Self {
            name: None,
            total_jury,
            owner_rated_counts: None,
            entries,
        }
    }

    /// Parse a snapshot from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CompetitionError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a snapshot from JSON string.
    pub fn from_json(json: &str) -> Result<Self, CompetitionError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CompetitionError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CompetitionError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load from a file, choosing JSON for `.json` and YAML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CompetitionError> {
        let path = path.as_ref();
        if is_json(path) {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, CompetitionError> {
        validate_competition_schema(&value).map_err(CompetitionError::SchemaViolation)?;
        let competition: Competition = serde_json::from_value(value)?;
        competition.validate()?;
        Ok(competition)
    }

    /// Structural checks the schema cannot express.
    pub fn validate(&self) -> Result<(), CompetitionError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.id.is_empty() {
                return Err(CompetitionError::ValidationError("entry with empty id".to_string()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CompetitionError::ValidationError(format!(
                    "Duplicate entry ID: {}",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    /// Every dimension rated on any entry, in key order.
    pub fn dimensions(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.ratings.keys().cloned())
            .collect()
    }

    /// Supplied participation counts, or counts derived from the ratings.
    pub fn owner_rated_counts(&self) -> BTreeMap<String, u32> {
        self.owner_rated_counts
            .clone()
            .unwrap_or_else(|| owner_rated_counts(&self.entries))
    }

    pub fn population(&self) -> Population {
        Population {
            total_entries: self.entries.len(),
            total_jury: self.total_jury,
        }
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}
