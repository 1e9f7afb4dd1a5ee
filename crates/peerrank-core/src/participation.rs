//! Owner participation counts derived from a competition snapshot.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::Entry;

/// For every rater, the number of distinct entries other than their own that
/// they rated in at least one dimension.
///
/// Out-of-range scores still count as participation: the rater did submit.
pub fn owner_rated_counts(entries: &[Entry]) -> BTreeMap<String, u32> {
    let mut rated: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for entry in entries {
        let raters = entry
            .ratings
            .values()
            .flatten()
            .map(|rating| rating.rater_id.as_str())
            .filter(|rater| *rater != entry.owner_id);
        for rater in raters {
            rated.entry(rater).or_default().insert(entry.id.as_str());
        }
    }

    rated
        .into_iter()
        .map(|(rater, ids)| (rater.to_string(), u32::try_from(ids.len()).unwrap_or(u32::MAX)))
        .collect()
}
