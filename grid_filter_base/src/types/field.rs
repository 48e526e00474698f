//! # Filter Fields
//!
//! A filter field binds a typed accessor to a description and the ordered set
//! of comparators a user may pick for it. Fields are assembled through
//! [`FilterFieldBuilder`] and frozen behind an `Arc` once built.

use crate::execution::comparisons::FilterComparator;
use crate::types::common::{FieldValue, SemanticType};
use crate::types::error::FilterError;
use std::fmt;
use std::sync::Arc;

/// Reads one field's value off a row
pub type Accessor<R> = Arc<dyn Fn(&R) -> FieldValue + Send + Sync>;

// ============================================================================
// FILTER FIELD
// ============================================================================

pub struct FilterField<R> {
    description: String,
    value_type: SemanticType,
    accessor: Accessor<R>,
    comparators: Vec<FilterComparator>,
    enum_values: Vec<String>,
}

impl<R> FilterField<R> {
    /// Unique key of the field within one engine
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value_type(&self) -> SemanticType {
        self.value_type
    }

    /// Comparators in the order they are offered
    pub fn comparators(&self) -> &[FilterComparator] {
        &self.comparators
    }

    /// Constant names offered for enum fields, empty for every other type
    pub fn enum_values(&self) -> &[String] {
        &self.enum_values
    }

    pub fn has_comparator(&self, comparator: FilterComparator) -> bool {
        self.comparators.contains(&comparator)
    }

    /// Look up one of this field's comparators by description
    pub fn comparator_by_description(&self, description: &str) -> Option<FilterComparator> {
        self.comparators
            .iter()
            .copied()
            .find(|c| c.description() == description)
    }

    pub fn accessor(&self) -> &Accessor<R> {
        &self.accessor
    }

    /// Read this field's value off a row
    pub fn value_of(&self, row: &R) -> FieldValue {
        (self.accessor)(row)
    }

    /// Union of two registrations of the same field.
    ///
    /// Existing comparators keep their order and new ones are appended. The
    /// accessor of `self` is kept.
    pub fn union(&self, other: &FilterField<R>) -> Result<FilterField<R>, FilterError> {
        if self.value_type != other.value_type {
            return Err(FilterError::FieldTypeConflict {
                field: self.description.clone(),
                existing: self.value_type,
                requested: other.value_type,
            });
        }

        let mut merged = self.clone_shallow();
        for comparator in &other.comparators {
            if !merged.comparators.contains(comparator) {
                merged.comparators.push(*comparator);
            }
        }
        for value in &other.enum_values {
            if !merged.enum_values.contains(value) {
                merged.enum_values.push(value.clone());
            }
        }

        Ok(merged)
    }

    /// Copy of this field with one more comparator
    pub fn with_added_comparator(
        &self,
        comparator: FilterComparator,
    ) -> Result<FilterField<R>, FilterError> {
        if !comparator.is_applicable(self.value_type) {
            return Err(FilterError::TypeMismatch {
                comparator,
                value_type: self.value_type,
            });
        }

        let mut field = self.clone_shallow();
        if !field.comparators.contains(&comparator) {
            field.comparators.push(comparator);
        }
        Ok(field)
    }

    fn clone_shallow(&self) -> FilterField<R> {
        FilterField {
            description: self.description.clone(),
            value_type: self.value_type,
            accessor: Arc::clone(&self.accessor),
            comparators: self.comparators.clone(),
            enum_values: self.enum_values.clone(),
        }
    }
}

impl<R> fmt::Debug for FilterField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterField")
            .field("description", &self.description)
            .field("value_type", &self.value_type)
            .field("comparators", &self.comparators)
            .field("enum_values", &self.enum_values)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Mutable builder for a [`FilterField`].
///
/// Duplicate comparators are ignored with a warning. Inapplicable ones are
/// remembered and make [`FilterFieldBuilder::build`] fail.
pub struct FilterFieldBuilder<R> {
    description: String,
    value_type: SemanticType,
    accessor: Accessor<R>,
    comparators: Vec<FilterComparator>,
    enum_values: Vec<String>,
    rejected: Vec<FilterComparator>,
    warnings: Vec<String>,
}

impl<R: 'static> FilterFieldBuilder<R> {
    /// Start a field of the given type with an empty comparator set.
    ///
    /// Text and enum accessor output is retagged to the declared type, so a
    /// `String` accessor can back an enum field.
    pub fn for_type<F, V>(description: impl Into<String>, value_type: SemanticType, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        let accessor: Accessor<R> = Arc::new(move |row: &R| retag(value_type, accessor(row).into()));

        Self {
            description: description.into(),
            value_type,
            accessor,
            comparators: Vec::new(),
            enum_values: Vec::new(),
            rejected: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn text<F, V>(description: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Text, accessor)
    }

    pub fn number<F, V>(description: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Number, accessor)
    }

    pub fn boolean<F, V>(description: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Boolean, accessor)
    }

    pub fn enumeration<F, V, I, S>(description: impl Into<String>, values: I, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::for_type(description, SemanticType::Enum, accessor).with_enum_values(values)
    }

    pub fn date<F, V>(description: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Date, accessor)
    }

    pub fn date_time<F, V>(description: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::DateTime, accessor)
    }
}

impl<R> FilterFieldBuilder<R> {
    /// Start from an already type-checked accessor
    pub fn from_accessor(
        description: impl Into<String>,
        value_type: SemanticType,
        accessor: Accessor<R>,
    ) -> Self {
        Self {
            description: description.into(),
            value_type,
            accessor,
            comparators: Vec::new(),
            enum_values: Vec::new(),
            rejected: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_comparator(mut self, comparator: FilterComparator) -> Self {
        if !comparator.is_applicable(self.value_type) {
            log::warn!(
                "Comparator '{}' is not applicable to {} field '{}'",
                comparator,
                self.value_type,
                self.description
            );
            self.rejected.push(comparator);
        } else if self.comparators.contains(&comparator) {
            let warning = format!(
                "Comparator '{}' is already present on field '{}'",
                comparator, self.description
            );
            log::warn!("{}", warning);
            self.warnings.push(warning);
        } else {
            self.comparators.push(comparator);
        }
        self
    }

    pub fn with_comparators<I>(self, comparators: I) -> Self
    where
        I: IntoIterator<Item = FilterComparator>,
    {
        comparators
            .into_iter()
            .fold(self, |builder, comparator| builder.with_comparator(comparator))
    }

    /// Append every preset comparator for the field's type
    pub fn with_preset_comparators(self) -> Self {
        let preset = SimpleFilterField::preset(self.value_type);
        self.with_comparators(preset.iter().copied())
    }

    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            let value = value.into();
            if !self.enum_values.contains(&value) {
                self.enum_values.push(value);
            }
        }
        self
    }

    pub fn with_equal_comparator(self) -> Self {
        self.with_comparator(FilterComparator::Equal)
    }

    pub fn with_not_equal_comparator(self) -> Self {
        self.with_comparator(FilterComparator::NotEqual)
    }

    pub fn with_contains_comparator(self) -> Self {
        self.with_comparator(FilterComparator::Contains)
    }

    pub fn with_not_contains_comparator(self) -> Self {
        self.with_comparator(FilterComparator::NotContains)
    }

    pub fn with_greater_than_comparator(self) -> Self {
        self.with_comparator(FilterComparator::GreaterThan)
    }

    pub fn with_less_than_comparator(self) -> Self {
        self.with_comparator(FilterComparator::LessThan)
    }

    pub fn with_greater_than_or_equals_comparator(self) -> Self {
        self.with_comparator(FilterComparator::GreaterThanOrEquals)
    }

    pub fn with_less_than_or_equals_comparator(self) -> Self {
        self.with_comparator(FilterComparator::LessThanOrEquals)
    }

    pub fn with_is_after_comparator(self) -> Self {
        self.with_comparator(FilterComparator::IsAfter)
    }

    pub fn with_is_after_or_equals_comparator(self) -> Self {
        self.with_comparator(FilterComparator::IsAfterOrEquals)
    }

    pub fn with_is_before_comparator(self) -> Self {
        self.with_comparator(FilterComparator::IsBefore)
    }

    pub fn with_is_before_or_equals_comparator(self) -> Self {
        self.with_comparator(FilterComparator::IsBeforeOrEquals)
    }

    pub fn with_is_between_comparator(self) -> Self {
        self.with_comparator(FilterComparator::IsBetween)
    }

    /// Duplicate-comparator warnings collected so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn build(self) -> Result<Arc<FilterField<R>>, FilterError> {
        if let Some(comparator) = self.rejected.first() {
            return Err(FilterError::TypeMismatch {
                comparator: *comparator,
                value_type: self.value_type,
            });
        }

        Ok(Arc::new(self.finish()))
    }

    fn finish(self) -> FilterField<R> {
        FilterField {
            description: self.description,
            value_type: self.value_type,
            accessor: self.accessor,
            comparators: self.comparators,
            enum_values: self.enum_values,
        }
    }
}

fn retag(value_type: SemanticType, value: FieldValue) -> FieldValue {
    match (value_type, value) {
        (SemanticType::Enum, FieldValue::Text(s)) => FieldValue::Enum(s),
        (SemanticType::Text, FieldValue::Enum(s)) => FieldValue::Text(s),
        (_, value) => value,
    }
}

// ============================================================================
// PRESETS
// ============================================================================

/// Fields carrying the default comparator set of their type
pub struct SimpleFilterField;

impl SimpleFilterField {
    /// Default comparators per semantic type
    pub fn preset(value_type: SemanticType) -> &'static [FilterComparator] {
        match value_type {
            SemanticType::Text => &[
                FilterComparator::NotEqual,
                FilterComparator::Equal,
                FilterComparator::Contains,
                FilterComparator::NotContains,
            ],
            SemanticType::Number => &[
                FilterComparator::Equal,
                FilterComparator::NotEqual,
                FilterComparator::Contains,
                FilterComparator::NotContains,
                FilterComparator::LessThan,
                FilterComparator::GreaterThan,
            ],
            SemanticType::Date => &[
                FilterComparator::IsBefore,
                FilterComparator::IsAfter,
                FilterComparator::IsBetween,
            ],
            SemanticType::DateTime => &[FilterComparator::IsBefore, FilterComparator::IsAfter],
            SemanticType::Boolean => &[FilterComparator::Equal, FilterComparator::NotEqual],
            SemanticType::Enum => &[
                FilterComparator::Equal,
                FilterComparator::NotEqual,
                FilterComparator::Contains,
                FilterComparator::NotContains,
            ],
        }
    }

    /// Field of any type with its preset comparators
    pub fn for_type<R, F, V>(
        description: impl Into<String>,
        value_type: SemanticType,
        accessor: F,
    ) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Arc::new(
            FilterFieldBuilder::for_type(description, value_type, accessor)
                .with_preset_comparators()
                .finish(),
        )
    }

    pub fn text<R, F, V>(description: impl Into<String>, accessor: F) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Text, accessor)
    }

    pub fn number<R, F, V>(description: impl Into<String>, accessor: F) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Number, accessor)
    }

    pub fn boolean<R, F, V>(description: impl Into<String>, accessor: F) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Boolean, accessor)
    }

    pub fn enumeration<R, F, V, I, S>(
        description: impl Into<String>,
        values: I,
        accessor: F,
    ) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(
            FilterFieldBuilder::enumeration(description, values, accessor)
                .with_preset_comparators()
                .finish(),
        )
    }

    pub fn date<R, F, V>(description: impl Into<String>, accessor: F) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::Date, accessor)
    }

    pub fn date_time<R, F, V>(description: impl Into<String>, accessor: F) -> Arc<FilterField<R>>
    where
        R: 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self::for_type(description, SemanticType::DateTime, accessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Person {
        name: String,
        salary: f64,
        department: &'static str,
    }

    fn person() -> Person {
        Person {
            name: "Sarah".to_string(),
            salary: 9050.60,
            department: "HR",
        }
    }

    #[test]
    fn test_builder_keeps_order_and_ignores_duplicates() {
        let builder = FilterFieldBuilder::number("Salary", |p: &Person| p.salary)
            .with_greater_than_comparator()
            .with_less_than_comparator()
            .with_greater_than_comparator();

        assert_eq!(builder.warnings().len(), 1);

        let field = builder.build().unwrap();
        assert_eq!(
            field.comparators(),
            &[FilterComparator::GreaterThan, FilterComparator::LessThan]
        );
        assert_eq!(field.value_of(&person()), FieldValue::Number(9050.60));
    }

    #[test]
    fn test_builder_rejects_inapplicable_comparator() {
        let result = FilterFieldBuilder::text("Name", |p: &Person| p.name.clone())
            .with_equal_comparator()
            .with_greater_than_comparator()
            .build();

        assert_matches!(
            result,
            Err(FilterError::TypeMismatch {
                comparator: FilterComparator::GreaterThan,
                value_type: SemanticType::Text,
            })
        );
    }

    #[test]
    fn test_presets_are_applicable() {
        for value_type in SemanticType::ALL {
            for comparator in SimpleFilterField::preset(value_type) {
                assert!(comparator.is_applicable(value_type));
            }
        }
    }

    #[test]
    fn test_enum_accessor_is_retagged() {
        let field = SimpleFilterField::enumeration(
            "Department",
            ["HR", "IT", "SALES"],
            |p: &Person| p.department,
        );

        assert_eq!(field.value_of(&person()), FieldValue::Enum("HR".to_string()));
        assert_eq!(field.enum_values().len(), 3);
        assert!(field.has_comparator(FilterComparator::Contains));
    }

    #[test]
    fn test_union_merges_comparators() {
        let first = FilterFieldBuilder::number("Salary", |p: &Person| p.salary)
            .with_greater_than_comparator()
            .build()
            .unwrap();
        let second = FilterFieldBuilder::number("Salary", |p: &Person| p.salary)
            .with_less_than_comparator()
            .with_greater_than_comparator()
            .build()
            .unwrap();

        let merged = first.union(&second).unwrap();
        assert_eq!(
            merged.comparators(),
            &[FilterComparator::GreaterThan, FilterComparator::LessThan]
        );
    }

    #[test]
    fn test_union_rejects_type_conflict() {
        let number = SimpleFilterField::number("Salary", |p: &Person| p.salary);
        let text = SimpleFilterField::text("Salary", |p: &Person| p.name.clone());

        assert_matches!(
            number.union(&text),
            Err(FilterError::FieldTypeConflict {
                existing: SemanticType::Number,
                requested: SemanticType::Text,
                ..
            })
        );
    }

    #[test]
    fn test_comparator_by_description() {
        let field = SimpleFilterField::date("Birthday", |_: &Person| FieldValue::Null);
        assert_eq!(
            field.comparator_by_description("is between"),
            Some(FilterComparator::IsBetween)
        );
        assert_eq!(field.comparator_by_description("is equals to"), None);
    }
}
