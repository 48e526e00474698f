pub mod comparisons;
pub mod editing;
pub mod engine;
pub mod filter_evaluation;
pub mod type_helper;

// Comparator semantics
pub use comparisons::{number, selection, string, temporal, ComparisonError, FilterComparator};
// Engine and row sources
pub use engine::{FilterEngine, ListDataView, RowSource};
pub use editing::FilterInput;
pub use filter_evaluation::{FilterEvaluator, RowPredicate};
