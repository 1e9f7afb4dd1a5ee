//! Competition snapshots.
//!
//! A snapshot is the immutable input of a ranking run: entries, their
//! ratings and the population sizes. Snapshots are structured data validated
//! against a JSON Schema before they are deserialized.

mod schema;
mod snapshot;

pub use schema::{validate_competition_schema, SchemaError};
pub use snapshot::{Competition, CompetitionError};
