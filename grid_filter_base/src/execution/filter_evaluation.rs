//! Combined evaluation of the active conditions
//!
//! All conditions are AND-combined with early exit. A condition whose value
//! has the wrong runtime type is left out of the conjunction, and a malformed
//! range query makes its condition fail.

use crate::execution::comparisons::ComparisonError;
use crate::types::condition::ActiveCondition;
use std::sync::Arc;

/// Row predicate installed into a row source
pub type RowPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Returns true if the row should be INCLUDED
    pub fn evaluate_conditions<R>(conditions: &[ActiveCondition<R>], row: &R) -> bool {
        for active in conditions {
            match active.condition().evaluate(row) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(err @ ComparisonError::TypeMismatch { .. }) => {
                    log::warn!("Skipping condition {} ({}): {}", active.id(), active.condition(), err);
                }
                Err(err @ ComparisonError::MalformedRangeQuery { .. }) => {
                    log::debug!("Condition {} does not match: {}", active.id(), err);
                    return false;
                }
            }
        }

        true
    }

    /// Build one predicate over a snapshot of the conditions.
    /// Returns `None` when there is nothing to filter.
    pub fn combine<R: 'static>(conditions: &[ActiveCondition<R>]) -> Option<RowPredicate<R>> {
        if conditions.is_empty() {
            return None;
        }

        let snapshot: Arc<[ActiveCondition<R>]> = conditions.iter().cloned().collect();
        Some(Arc::new(move |row: &R| {
            Self::evaluate_conditions(&snapshot, row)
        }))
    }

    /// Predicate accepting every row
    pub fn accept_all<R: 'static>() -> RowPredicate<R> {
        Arc::new(|_: &R| true)
    }
}
