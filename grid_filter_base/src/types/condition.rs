//! # Filter Conditions
//!
//! A condition is the immutable triple (field, comparator, raw input). Active
//! conditions additionally carry the chip metadata used for editing, deletion
//! and persistence.

use crate::execution::comparisons::{ComparisonError, FilterComparator};
use crate::execution::type_helper;
use crate::types::error::FilterError;
use crate::types::field::FilterField;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Badge id written for conditions that did not come from an initial filter
pub const NO_BADGE_ID: &str = "noBadgeId";

/// Badge id marking an initial condition the user deleted
pub const DELETED_INITIAL_BADGE_ID: &str = "deletedInitialCondition";

// ============================================================================
// IDENTIFIERS AND FLAGS
// ============================================================================

/// Engine-unique identity of an active condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionId(pub u64);

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Persistence identity of a chip
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BadgeId {
    NoBadge,
    Initial(String),
    DeletedInitial,
}

impl BadgeId {
    pub fn as_str(&self) -> &str {
        match self {
            BadgeId::NoBadge => NO_BADGE_ID,
            BadgeId::Initial(id) => id,
            BadgeId::DeletedInitial => DELETED_INITIAL_BADGE_ID,
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, BadgeId::Initial(_))
    }
}

impl From<&str> for BadgeId {
    fn from(value: &str) -> Self {
        match value {
            "" | NO_BADGE_ID => BadgeId::NoBadge,
            DELETED_INITIAL_BADGE_ID => BadgeId::DeletedInitial,
            id => BadgeId::Initial(id.to_string()),
        }
    }
}

impl From<String> for BadgeId {
    fn from(value: String) -> Self {
        BadgeId::from(value.as_str())
    }
}

impl From<BadgeId> for String {
    fn from(value: BadgeId) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which parts of an editable condition may change while it is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomizationDegree {
    /// Field, comparator and value can all change
    #[default]
    Everything,
    /// Field and comparator are locked
    InputValue,
    /// Field is locked
    ConditionAndInputValue,
    /// Condition cannot be edited
    Nothing,
}

impl CustomizationDegree {
    pub fn locks_field(&self) -> bool {
        !matches!(self, CustomizationDegree::Everything)
    }

    pub fn locks_comparator(&self) -> bool {
        matches!(
            self,
            CustomizationDegree::InputValue | CustomizationDegree::Nothing
        )
    }

    pub fn allows_editing(&self) -> bool {
        !matches!(self, CustomizationDegree::Nothing)
    }

    pub fn as_display_string(&self) -> &'static str {
        match self {
            CustomizationDegree::Everything => "everything",
            CustomizationDegree::InputValue => "input_value",
            CustomizationDegree::ConditionAndInputValue => "condition_and_input_value",
            CustomizationDegree::Nothing => "nothing",
        }
    }
}

impl FromStr for CustomizationDegree {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "everything" => Ok(CustomizationDegree::Everything),
            "input_value" => Ok(CustomizationDegree::InputValue),
            "condition_and_input_value" => Ok(CustomizationDegree::ConditionAndInputValue),
            "nothing" => Ok(CustomizationDegree::Nothing),
            other => Err(format!("Unknown customization degree: {}", other)),
        }
    }
}

/// Chip metadata attached to a condition when it becomes active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFlags {
    pub badge_id: BadgeId,
    pub deletable: bool,
    pub editable: bool,
    pub customization: CustomizationDegree,
}

impl Default for ConditionFlags {
    /// Conditions entered by the user can be deleted but not edited
    fn default() -> Self {
        Self {
            badge_id: BadgeId::NoBadge,
            deletable: true,
            editable: false,
            customization: CustomizationDegree::Everything,
        }
    }
}

impl ConditionFlags {
    pub fn new(deletable: bool, editable: bool, customization: CustomizationDegree) -> Self {
        Self {
            badge_id: BadgeId::NoBadge,
            deletable,
            editable,
            customization,
        }
    }

    pub fn with_badge_id(mut self, badge_id: BadgeId) -> Self {
        self.badge_id = badge_id;
        self
    }
}

// ============================================================================
// CONDITIONS
// ============================================================================

pub struct FilterCondition<R> {
    field: Arc<FilterField<R>>,
    comparator: FilterComparator,
    raw_input: String,
}

impl<R> FilterCondition<R> {
    /// Create a condition.
    ///
    /// The comparator must be offered by the field and applicable to its
    /// type. Non-blank range queries must split into exactly two parts.
    pub fn new(
        field: Arc<FilterField<R>>,
        comparator: FilterComparator,
        raw_input: impl Into<String>,
    ) -> Result<Self, FilterError> {
        if !comparator.is_applicable(field.value_type()) {
            return Err(FilterError::TypeMismatch {
                comparator,
                value_type: field.value_type(),
            });
        }

        if !field.has_comparator(comparator) {
            return Err(FilterError::ComparatorNotAvailable {
                field: field.description().to_string(),
                comparator,
            });
        }

        let raw_input = raw_input.into();
        if comparator.is_range() && !raw_input.trim().is_empty() {
            type_helper::split_range(&raw_input)?;
        }

        Ok(Self {
            field,
            comparator,
            raw_input,
        })
    }

    pub fn field(&self) -> &Arc<FilterField<R>> {
        &self.field
    }

    pub fn comparator(&self) -> FilterComparator {
        self.comparator
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Evaluate this condition against one row.
    ///
    /// Null values never match. A value whose runtime type differs from the
    /// field's declared type is a type mismatch.
    pub fn evaluate(&self, row: &R) -> Result<bool, ComparisonError> {
        let value = self.field.value_of(row);

        match value.semantic_type() {
            None => Ok(false),
            Some(actual) if actual != self.field.value_type() => {
                Err(ComparisonError::TypeMismatch {
                    comparator: self.comparator,
                    value_type: actual,
                })
            }
            Some(_) => self.comparator.compare(&value, &self.raw_input),
        }
    }

    /// Same field, comparator and input
    pub fn same_as(&self, field: &str, comparator: &str, input: &str) -> bool {
        self.field.description() == field
            && self.comparator.description() == comparator
            && self.raw_input == input
    }
}

impl<R> Clone for FilterCondition<R> {
    fn clone(&self) -> Self {
        Self {
            field: Arc::clone(&self.field),
            comparator: self.comparator,
            raw_input: self.raw_input.clone(),
        }
    }
}

impl<R> fmt::Debug for FilterCondition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCondition")
            .field("field", &self.field.description())
            .field("comparator", &self.comparator)
            .field("raw_input", &self.raw_input)
            .finish()
    }
}

impl<R> fmt::Display for FilterCondition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.field.description(),
            self.comparator,
            self.raw_input
        )
    }
}

/// A condition shown as a chip
pub struct ActiveCondition<R> {
    id: ConditionId,
    condition: FilterCondition<R>,
    flags: ConditionFlags,
}

impl<R> ActiveCondition<R> {
    pub fn new(id: ConditionId, condition: FilterCondition<R>, flags: ConditionFlags) -> Self {
        Self {
            id,
            condition,
            flags,
        }
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn condition(&self) -> &FilterCondition<R> {
        &self.condition
    }

    pub fn flags(&self) -> &ConditionFlags {
        &self.flags
    }

    pub fn badge_id(&self) -> &BadgeId {
        &self.flags.badge_id
    }

    pub fn is_deletable(&self) -> bool {
        self.flags.deletable
    }

    pub fn is_editable(&self) -> bool {
        self.flags.editable && self.flags.customization.allows_editing()
    }

    pub fn customization(&self) -> CustomizationDegree {
        self.flags.customization
    }

    pub fn field_description(&self) -> &str {
        self.condition.field().description()
    }

    pub fn comparator(&self) -> FilterComparator {
        self.condition.comparator()
    }

    pub fn raw_input(&self) -> &str {
        self.condition.raw_input()
    }

    pub(crate) fn with_id(&self, id: ConditionId) -> Self {
        Self {
            id,
            condition: self.condition.clone(),
            flags: self.flags.clone(),
        }
    }

    pub(crate) fn with_badge_id(&self, badge_id: BadgeId) -> Self {
        Self {
            id: self.id,
            condition: self.condition.clone(),
            flags: self.flags.clone().with_badge_id(badge_id),
        }
    }
}

impl<R> Clone for ActiveCondition<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            condition: self.condition.clone(),
            flags: self.flags.clone(),
        }
    }
}

impl<R> fmt::Debug for ActiveCondition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveCondition")
            .field("id", &self.id)
            .field("condition", &self.condition)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::common::{FieldValue, SemanticType};
    use crate::types::field::{FilterFieldBuilder, SimpleFilterField};
    use assert_matches::assert_matches;

    struct Row {
        salary: FieldValue,
    }

    fn salary_field() -> Arc<FilterField<Row>> {
        SimpleFilterField::number("Salary", |r: &Row| r.salary.clone())
    }

    #[test]
    fn test_condition_rejects_unavailable_comparator() {
        let result = FilterCondition::new(salary_field(), FilterComparator::GreaterThanOrEquals, "1");
        assert_matches!(result, Err(FilterError::ComparatorNotAvailable { .. }));

        let result = FilterCondition::new(salary_field(), FilterComparator::IsAfter, "1");
        assert_matches!(
            result,
            Err(FilterError::TypeMismatch {
                value_type: SemanticType::Number,
                ..
            })
        );
    }

    #[test]
    fn test_condition_rejects_malformed_range() {
        let birthday = FilterFieldBuilder::date("Birthday", |_: &Row| FieldValue::Null)
            .with_is_between_comparator()
            .build()
            .unwrap();

        assert_matches!(
            FilterCondition::new(Arc::clone(&birthday), FilterComparator::IsBetween, "2000-01-01"),
            Err(FilterError::MalformedRangeQuery { .. })
        );
        assert!(FilterCondition::new(Arc::clone(&birthday), FilterComparator::IsBetween, "").is_ok());
        assert!(
            FilterCondition::new(birthday, FilterComparator::IsBetween, "2000-01-01#2002-08-12")
                .is_ok()
        );
    }

    #[test]
    fn test_evaluate_checks_runtime_type() {
        let condition =
            FilterCondition::new(salary_field(), FilterComparator::GreaterThan, "5000").unwrap();

        let rich = Row {
            salary: FieldValue::Number(9050.60),
        };
        let wrong = Row {
            salary: FieldValue::from("9050.60"),
        };
        let missing = Row {
            salary: FieldValue::Null,
        };

        assert_eq!(condition.evaluate(&rich), Ok(true));
        assert_matches!(
            condition.evaluate(&wrong),
            Err(ComparisonError::TypeMismatch {
                value_type: SemanticType::Text,
                ..
            })
        );
        assert_eq!(condition.evaluate(&missing), Ok(false));
    }

    #[test]
    fn test_badge_id_conversion() {
        assert_eq!(BadgeId::from("noBadgeId"), BadgeId::NoBadge);
        assert_eq!(BadgeId::from("deletedInitialCondition"), BadgeId::DeletedInitial);
        assert_eq!(BadgeId::from("2"), BadgeId::Initial("2".to_string()));
        assert_eq!(BadgeId::Initial("7".to_string()).to_string(), "7");
    }

    #[test]
    fn test_customization_degree_locks() {
        assert!(!CustomizationDegree::Everything.locks_field());
        assert!(CustomizationDegree::InputValue.locks_field());
        assert!(CustomizationDegree::InputValue.locks_comparator());
        assert!(CustomizationDegree::ConditionAndInputValue.locks_field());
        assert!(!CustomizationDegree::ConditionAndInputValue.locks_comparator());
        assert!(!CustomizationDegree::Nothing.allows_editing());
        assert_eq!(
            "CONDITION_AND_INPUT_VALUE".parse::<CustomizationDegree>(),
            Ok(CustomizationDegree::ConditionAndInputValue)
        );
    }
}
