//! Error types for the filter model and engine

use crate::execution::comparisons::{ComparisonError, FilterComparator};
use crate::types::common::SemanticType;
use crate::types::condition::ConditionId;

/// Filter model, registry and engine errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Comparator '{comparator}' is not applicable to {value_type} values")]
    TypeMismatch {
        comparator: FilterComparator,
        value_type: SemanticType,
    },

    #[error("Format of the following search query is not correct: '{query}'")]
    MalformedRangeQuery { query: String },

    #[error("Comparator '{comparator}' is not available for field '{field}'")]
    ComparatorNotAvailable {
        field: String,
        comparator: FilterComparator,
    },

    #[error("Field '{field}' is already registered as {existing}, cannot register it as {requested}")]
    FieldTypeConflict {
        field: String,
        existing: SemanticType,
        requested: SemanticType,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown comparator '{comparator}' for field '{field}'")]
    UnknownComparator { field: String, comparator: String },

    #[error("Unknown condition: {0}")]
    UnknownCondition(ConditionId),

    #[error("Badge id '{0}' is already used by an initial condition")]
    DuplicateBadge(String),

    #[error("Condition {0} cannot be deleted")]
    ConditionNotDeletable(ConditionId),

    #[error("Condition {0} cannot be edited")]
    ConditionNotEditable(ConditionId),

    #[error("The {0} of the current input is locked")]
    InputLocked(&'static str),

    #[error("Input is incomplete: {0}")]
    IncompleteInput(String),

    #[error("No filter input is open")]
    NoPendingInput,

    #[error("A filter input is already open")]
    InputAlreadyOpen,
}

impl From<ComparisonError> for FilterError {
    fn from(err: ComparisonError) -> Self {
        match err {
            ComparisonError::TypeMismatch {
                comparator,
                value_type,
            } => FilterError::TypeMismatch {
                comparator,
                value_type,
            },
            ComparisonError::MalformedRangeQuery { query } => {
                FilterError::MalformedRangeQuery { query }
            }
        }
    }
}
