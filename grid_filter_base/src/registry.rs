//! Field registry
//!
//! Fields keyed by description, in registration order. Registering a
//! description that already exists unions the comparator sets.

use crate::execution::comparisons::FilterComparator;
use crate::types::error::FilterError;
use crate::types::field::FilterField;
use std::collections::HashMap;
use std::sync::Arc;

pub struct FieldRegistry<R> {
    fields: Vec<Arc<FilterField<R>>>,
    index: HashMap<String, usize>,
}

impl<R> FieldRegistry<R> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a field, merging it into an existing one with the same description.
    /// Returns the field as stored.
    pub fn register(&mut self, field: Arc<FilterField<R>>) -> Result<Arc<FilterField<R>>, FilterError> {
        let existing = self.index.get(field.description()).copied();

        match existing {
            Some(position) => {
                let merged = Arc::new(self.fields[position].union(&field)?);
                log::debug!(
                    "Merged field '{}', comparators now {:?}",
                    merged.description(),
                    merged.comparators()
                );
                self.fields[position] = Arc::clone(&merged);
                Ok(merged)
            }
            None => {
                self.index
                    .insert(field.description().to_string(), self.fields.len());
                self.fields.push(Arc::clone(&field));
                Ok(field)
            }
        }
    }

    /// Add one comparator to a registered field
    pub fn add_comparator(
        &mut self,
        description: &str,
        comparator: FilterComparator,
    ) -> Result<Arc<FilterField<R>>, FilterError> {
        let position = *self
            .index
            .get(description)
            .ok_or_else(|| FilterError::UnknownField(description.to_string()))?;

        let updated = Arc::new(self.fields[position].with_added_comparator(comparator)?);
        self.fields[position] = Arc::clone(&updated);
        Ok(updated)
    }

    pub fn get(&self, description: &str) -> Option<&Arc<FilterField<R>>> {
        self.index.get(description).map(|&position| &self.fields[position])
    }

    pub fn require(&self, description: &str) -> Result<&Arc<FilterField<R>>, FilterError> {
        self.get(description)
            .ok_or_else(|| FilterError::UnknownField(description.to_string()))
    }

    /// Resolve a field and one of its comparators by their descriptions
    pub fn resolve(
        &self,
        field: &str,
        comparator: &str,
    ) -> Result<(Arc<FilterField<R>>, FilterComparator), FilterError> {
        let filter_field = self.require(field)?;
        let filter_comparator = filter_field
            .comparator_by_description(comparator)
            .ok_or_else(|| FilterError::UnknownComparator {
                field: field.to_string(),
                comparator: comparator.to_string(),
            })?;

        Ok((Arc::clone(filter_field), filter_comparator))
    }

    pub fn contains(&self, description: &str) -> bool {
        self.index.contains_key(description)
    }

    /// Fields in registration order
    pub fn fields(&self) -> &[Arc<FilterField<R>>] {
        &self.fields
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.description()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R> Default for FieldRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
