//! # Persistence
//!
//! Condition records, their query-string and JSON encodings, and replay of
//! persisted records into an engine.

pub mod error;
pub mod query;
pub mod record;
pub mod replay;

pub use error::CodecError;
pub use query::{decode_query, encode_query, validate_parameters};
pub use record::{records_from_json, records_to_json, ConditionRecord};
pub use replay::RestoreSummary;
