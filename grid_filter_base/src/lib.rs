//! # Grid Filter - typed filter conditions for data grids
//!
//! Fields describe how to read a typed value from a row and which comparators
//! apply to it. Conditions pair a field with a comparator and a raw input; the
//! engine combines all active conditions into one row predicate and keeps a
//! row source filtered. Conditions persist as records in a query string.

pub mod config;
pub mod execution;
pub mod format;
pub mod persistence;
pub mod registry;
pub mod types;

pub mod prelude {
    pub use crate::config::{ConfigError, EngineConfig, FilterConfig};
    pub use crate::execution::{
        ComparisonError, FilterComparator, FilterEngine, FilterEvaluator, FilterInput,
        ListDataView, RowPredicate, RowSource,
    };
    pub use crate::format::DateFormatter;
    pub use crate::persistence::{CodecError, ConditionRecord, RestoreSummary};
    pub use crate::registry::FieldRegistry;
    pub use crate::types::{
        ActiveCondition, BadgeId, ConditionFlags, ConditionId, CustomizationDegree, FieldValue,
        FilterCondition, FilterError, FilterField, FilterFieldBuilder, SemanticType,
        SimpleFilterField,
    };
}
