//! Provisional filter input
//!
//! The (field, comparator, value) triple a user fills in before a chip is
//! created. When an existing condition is edited, its customization degree
//! decides which parts are locked.

use crate::execution::comparisons::FilterComparator;
use crate::execution::type_helper;
use crate::types::condition::{ActiveCondition, CustomizationDegree, FilterCondition};
use crate::types::error::FilterError;
use crate::types::field::FilterField;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

pub struct FilterInput<R> {
    field: Option<Arc<FilterField<R>>>,
    comparator: Option<FilterComparator>,
    value: String,
    customization: CustomizationDegree,
}

impl<R> FilterInput<R> {
    /// Empty input with nothing locked
    pub fn new() -> Self {
        Self {
            field: None,
            comparator: None,
            value: String::new(),
            customization: CustomizationDegree::Everything,
        }
    }

    /// Input pre-filled from a condition being edited
    pub fn for_condition(active: &ActiveCondition<R>) -> Self {
        Self {
            field: Some(Arc::clone(active.condition().field())),
            comparator: Some(active.comparator()),
            value: active.raw_input().to_string(),
            customization: active.customization(),
        }
    }

    pub fn field(&self) -> Option<&Arc<FilterField<R>>> {
        self.field.as_ref()
    }

    pub fn comparator(&self) -> Option<FilterComparator> {
        self.comparator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn customization(&self) -> CustomizationDegree {
        self.customization
    }

    /// Comparators the selected field offers
    pub fn available_comparators(&self) -> &[FilterComparator] {
        self.field.as_ref().map(|f| f.comparators()).unwrap_or(&[])
    }

    /// Enum constants offered for the selected field
    pub fn available_values(&self) -> &[String] {
        self.field.as_ref().map(|f| f.enum_values()).unwrap_or(&[])
    }

    /// Select a field. A comparator the new field does not offer is cleared,
    /// and so is the value when the field type changes.
    pub fn select_field(&mut self, field: Arc<FilterField<R>>) -> Result<(), FilterError> {
        if self.customization.locks_field() {
            return Err(FilterError::InputLocked("field"));
        }

        let type_changed = self
            .field
            .as_ref()
            .map_or(true, |current| current.value_type() != field.value_type());

        if let Some(comparator) = self.comparator {
            if !field.has_comparator(comparator) {
                self.comparator = None;
            }
        }
        if type_changed {
            self.value.clear();
        }

        self.field = Some(field);
        Ok(())
    }

    pub fn select_comparator(&mut self, comparator: FilterComparator) -> Result<(), FilterError> {
        if self.customization.locks_comparator() {
            return Err(FilterError::InputLocked("comparator"));
        }

        let field = self
            .field
            .as_ref()
            .ok_or_else(|| FilterError::IncompleteInput("no field selected".to_string()))?;

        if !field.has_comparator(comparator) {
            return Err(FilterError::ComparatorNotAvailable {
                field: field.description().to_string(),
                comparator,
            });
        }

        if self.comparator.map_or(false, |c| c.is_range() != comparator.is_range()) {
            self.value.clear();
        }
        self.comparator = Some(comparator);
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Set an "is between" value from two dates
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.value = type_helper::join_range(start, end);
    }

    /// Field, comparator and a value that parses for the field type are all present
    pub fn can_accept(&self) -> bool {
        self.missing_part().is_none()
    }

    fn missing_part(&self) -> Option<String> {
        let field = match &self.field {
            Some(field) => field,
            None => return Some("no field selected".to_string()),
        };
        let comparator = match self.comparator {
            Some(comparator) => comparator,
            None => return Some("no comparator selected".to_string()),
        };

        if type_helper::is_valid_input(comparator, field.value_type(), &self.value) {
            None
        } else {
            Some(format!(
                "'{}' is not a valid {} value for '{}'",
                self.value,
                field.value_type(),
                comparator
            ))
        }
    }

    /// Turn the input into a condition if it can be accepted
    pub fn to_condition(&self) -> Result<FilterCondition<R>, FilterError> {
        if let Some(reason) = self.missing_part() {
            return Err(FilterError::IncompleteInput(reason));
        }

        match (&self.field, self.comparator) {
            (Some(field), Some(comparator)) => {
                FilterCondition::new(Arc::clone(field), comparator, self.value.clone())
            }
            _ => Err(FilterError::IncompleteInput("no field selected".to_string())),
        }
    }
}

impl<R> fmt::Debug for FilterInput<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterInput")
            .field("field", &self.field.as_ref().map(|field| field.description()))
            .field("comparator", &self.comparator)
            .field("value", &self.value)
            .field("customization", &self.customization)
            .finish()
    }
}

impl<R> Default for FilterInput<R> {
    fn default() -> Self {
        Self::new()
    }
}
