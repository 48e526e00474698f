//! # Filter Comparators
//!
//! The closed family of comparison operators a filter condition can use, with
//! their applicability table and the per-type comparison rules.
//!
//! Every comparison receives the typed value read off a row and the raw query
//! string entered by the user. Queries that cannot be parsed for the value's
//! type are not errors: the comparison simply yields `false` (or, for the
//! temporal ordering comparators, falls back to raw text equality).

use crate::execution::type_helper::{self, check_type_applicable};
use crate::types::common::{FieldValue, SemanticType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error types for comparison operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComparisonError {
    #[error("Comparator '{comparator}' is not applicable to {value_type} values")]
    TypeMismatch {
        comparator: FilterComparator,
        value_type: SemanticType,
    },

    #[error("Format of the following search query is not correct: '{query}'")]
    MalformedRangeQuery { query: String },
}

// ============================================================================
// COMPARATOR FAMILY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterComparator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterThanOrEquals,
    LessThanOrEquals,
    IsAfter,
    IsAfterOrEquals,
    IsBefore,
    IsBeforeOrEquals,
    IsBetween,
}

const ALL_TYPES: &[SemanticType] = &[
    SemanticType::Text,
    SemanticType::Number,
    SemanticType::Boolean,
    SemanticType::Enum,
    SemanticType::Date,
    SemanticType::DateTime,
];

const SUBSTRING_TYPES: &[SemanticType] =
    &[SemanticType::Text, SemanticType::Number, SemanticType::Enum];

const NUMBER_TYPES: &[SemanticType] = &[SemanticType::Number];

const TEMPORAL_TYPES: &[SemanticType] = &[SemanticType::Date, SemanticType::DateTime];

const DATE_TYPES: &[SemanticType] = &[SemanticType::Date];

impl FilterComparator {
    /// Every comparator, in the order they are offered to users
    pub const ALL: [FilterComparator; 13] = [
        FilterComparator::Equal,
        FilterComparator::NotEqual,
        FilterComparator::Contains,
        FilterComparator::NotContains,
        FilterComparator::GreaterThan,
        FilterComparator::LessThan,
        FilterComparator::GreaterThanOrEquals,
        FilterComparator::LessThanOrEquals,
        FilterComparator::IsAfter,
        FilterComparator::IsAfterOrEquals,
        FilterComparator::IsBefore,
        FilterComparator::IsBeforeOrEquals,
        FilterComparator::IsBetween,
    ];

    /// User-facing label, also the stable key used in persisted records
    pub fn description(&self) -> &'static str {
        match self {
            FilterComparator::Equal => "is equals to",
            FilterComparator::NotEqual => "is not equals to",
            FilterComparator::Contains => "contains",
            FilterComparator::NotContains => "not contains",
            FilterComparator::GreaterThan => "is greater than",
            FilterComparator::LessThan => "is less than",
            FilterComparator::GreaterThanOrEquals => "is greater than or equals",
            FilterComparator::LessThanOrEquals => "is less than or equals",
            FilterComparator::IsAfter => "is after",
            FilterComparator::IsAfterOrEquals => "is after or equals",
            FilterComparator::IsBefore => "is before",
            FilterComparator::IsBeforeOrEquals => "is before or equals",
            FilterComparator::IsBetween => "is between",
        }
    }

    /// Look up a comparator by its exact description
    pub fn from_description(description: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.description() == description)
    }

    /// Semantic types this comparator can be used with
    pub fn applicable_types(&self) -> &'static [SemanticType] {
        match self {
            FilterComparator::Equal | FilterComparator::NotEqual => ALL_TYPES,
            FilterComparator::Contains | FilterComparator::NotContains => SUBSTRING_TYPES,
            FilterComparator::GreaterThan
            | FilterComparator::LessThan
            | FilterComparator::GreaterThanOrEquals
            | FilterComparator::LessThanOrEquals => NUMBER_TYPES,
            FilterComparator::IsAfter
            | FilterComparator::IsAfterOrEquals
            | FilterComparator::IsBefore
            | FilterComparator::IsBeforeOrEquals => TEMPORAL_TYPES,
            FilterComparator::IsBetween => DATE_TYPES,
        }
    }

    pub fn is_applicable(&self, value_type: SemanticType) -> bool {
        self.applicable_types().contains(&value_type)
    }

    /// Comparators whose query is a `start#end` range instead of a single value
    pub fn is_range(&self) -> bool {
        matches!(self, FilterComparator::IsBetween)
    }

    /// Compare a row value against a raw query.
    ///
    /// Null values never match. The applicability check runs before any
    /// comparison and rejects values of an inapplicable type.
    pub fn compare(&self, value: &FieldValue, query: &str) -> Result<bool, ComparisonError> {
        let value_type = match value.semantic_type() {
            Some(value_type) => value_type,
            None => return Ok(false),
        };

        check_type_applicable(*self, value_type)?;

        match value {
            FieldValue::Text(actual) => string::compare(actual, query, *self),
            FieldValue::Number(actual) => number::compare(*actual, query, *self),
            FieldValue::Boolean(actual) => selection::compare_boolean(*actual, query, *self),
            FieldValue::Enum(actual) => selection::compare_enum(actual, query, *self),
            FieldValue::Date(actual) => temporal::compare_date(*actual, query, *self),
            FieldValue::DateTime(actual) => temporal::compare_date_time(*actual, query, *self),
            FieldValue::Null => Ok(false),
        }
    }
}

impl fmt::Display for FilterComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Accepts either the description (`"is greater than"`) or the variant name (`"greater_than"`)
impl FromStr for FilterComparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(comparator) = Self::from_description(s) {
            return Ok(comparator);
        }

        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| variant_name(*c) == normalized)
            .ok_or_else(|| format!("Unknown comparator: {}", s))
    }
}

fn variant_name(comparator: FilterComparator) -> &'static str {
    match comparator {
        FilterComparator::Equal => "equal",
        FilterComparator::NotEqual => "not_equal",
        FilterComparator::Contains => "contains",
        FilterComparator::NotContains => "not_contains",
        FilterComparator::GreaterThan => "greater_than",
        FilterComparator::LessThan => "less_than",
        FilterComparator::GreaterThanOrEquals => "greater_than_or_equals",
        FilterComparator::LessThanOrEquals => "less_than_or_equals",
        FilterComparator::IsAfter => "is_after",
        FilterComparator::IsAfterOrEquals => "is_after_or_equals",
        FilterComparator::IsBefore => "is_before",
        FilterComparator::IsBeforeOrEquals => "is_before_or_equals",
        FilterComparator::IsBetween => "is_between",
    }
}

fn unsupported(comparator: FilterComparator, value_type: SemanticType) -> ComparisonError {
    ComparisonError::TypeMismatch {
        comparator,
        value_type,
    }
}

// ============================================================================
// PER-TYPE RULES
// ============================================================================

/// Text comparison
pub mod string {
    use super::*;

    /// Equality is case-sensitive, inequality is not
    pub fn compare(
        actual: &str,
        query: &str,
        comparator: FilterComparator,
    ) -> Result<bool, ComparisonError> {
        match comparator {
            FilterComparator::Equal => Ok(actual == query),
            FilterComparator::NotEqual => Ok(actual.to_lowercase() != query.to_lowercase()),
            FilterComparator::Contains => Ok(actual.contains(query)),
            FilterComparator::NotContains => Ok(!actual.contains(query)),
            _ => Err(unsupported(comparator, SemanticType::Text)),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_equal_is_case_sensitive() {
            assert!(compare("HR", "HR", FilterComparator::Equal).unwrap());
            assert!(!compare("HR", "hr", FilterComparator::Equal).unwrap());
        }

        #[test]
        fn test_not_equal_ignores_case() {
            assert!(!compare("HR", "hr", FilterComparator::NotEqual).unwrap());
            assert!(compare("HR", "IT", FilterComparator::NotEqual).unwrap());
        }

        #[test]
        fn test_contains() {
            assert!(compare("Sarah", "ara", FilterComparator::Contains).unwrap());
            assert!(!compare("Sarah", "ARA", FilterComparator::Contains).unwrap());
            assert!(compare("Sarah", "xyz", FilterComparator::NotContains).unwrap());
            assert!(!compare("Sarah", "Sa", FilterComparator::NotContains).unwrap());
        }

        #[test]
        fn test_ordering_is_rejected() {
            assert!(compare("b", "a", FilterComparator::GreaterThan).is_err());
        }
    }
}

/// Numeric comparison; the query must parse as a finite number, otherwise nothing matches
pub mod number {
    use super::*;

    pub fn compare(
        actual: f64,
        query: &str,
        comparator: FilterComparator,
    ) -> Result<bool, ComparisonError> {
        if !comparator.is_applicable(SemanticType::Number) {
            return Err(unsupported(comparator, SemanticType::Number));
        }

        let expected = match type_helper::parse_number(query) {
            Some(expected) => expected,
            None => return Ok(false),
        };

        match comparator {
            FilterComparator::Equal => Ok(actual == expected),
            FilterComparator::NotEqual => Ok(actual != expected),
            // Shortest f64 text: 5000.0 renders as "5000", so "5000.0" is not contained
            FilterComparator::Contains => Ok(actual.to_string().contains(query)),
            FilterComparator::NotContains => Ok(!actual.to_string().contains(query)),
            FilterComparator::GreaterThan => Ok(actual > expected),
            FilterComparator::LessThan => Ok(actual < expected),
            FilterComparator::GreaterThanOrEquals => Ok(actual >= expected),
            FilterComparator::LessThanOrEquals => Ok(actual <= expected),
            _ => Err(unsupported(comparator, SemanticType::Number)),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_greater_than_is_strict() {
            assert!(compare(9050.60, "5000", FilterComparator::GreaterThan).unwrap());
            assert!(!compare(1000.0, "5000", FilterComparator::GreaterThan).unwrap());
            assert!(!compare(5000.0, "5000", FilterComparator::GreaterThan).unwrap());
        }

        #[test]
        fn test_inclusive_bounds() {
            assert!(compare(5000.0, "5000", FilterComparator::GreaterThanOrEquals).unwrap());
            assert!(compare(5000.0, "5000.0", FilterComparator::LessThanOrEquals).unwrap());
            assert!(!compare(5000.5, "5000", FilterComparator::LessThanOrEquals).unwrap());
        }

        #[test]
        fn test_non_numeric_query_never_matches() {
            for comparator in [
                FilterComparator::Equal,
                FilterComparator::NotEqual,
                FilterComparator::Contains,
                FilterComparator::NotContains,
                FilterComparator::GreaterThan,
                FilterComparator::LessThan,
            ] {
                assert!(!compare(12.0, "abc", comparator).unwrap());
            }
        }

        #[test]
        fn test_contains_uses_textual_form() {
            assert!(compare(9050.6, "905", FilterComparator::Contains).unwrap());
            assert!(!compare(9050.6, "77", FilterComparator::Contains).unwrap());
            assert!(compare(9050.6, "77", FilterComparator::NotContains).unwrap());
            assert!(compare(5000.0, "5000", FilterComparator::Contains).unwrap());
            assert!(!compare(5000.0, "5000.0", FilterComparator::Contains).unwrap());
        }
    }
}

/// Enum and boolean comparison
pub mod selection {
    use super::*;

    /// Enum values compare by constant name
    pub fn compare_enum(
        actual: &str,
        query: &str,
        comparator: FilterComparator,
    ) -> Result<bool, ComparisonError> {
        match comparator {
            FilterComparator::Equal => Ok(actual == query),
            FilterComparator::NotEqual => Ok(actual != query),
            FilterComparator::Contains => Ok(actual.contains(query)),
            FilterComparator::NotContains => Ok(!actual.contains(query)),
            _ => Err(unsupported(comparator, SemanticType::Enum)),
        }
    }

    pub fn compare_boolean(
        actual: bool,
        query: &str,
        comparator: FilterComparator,
    ) -> Result<bool, ComparisonError> {
        let expected = type_helper::parse_boolean(query);

        match comparator {
            FilterComparator::Equal => Ok(actual == expected),
            FilterComparator::NotEqual => Ok(actual != expected),
            _ => Err(unsupported(comparator, SemanticType::Boolean)),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_enum_comparison() {
            assert!(compare_enum("HR", "HR", FilterComparator::Equal).unwrap());
            assert!(compare_enum("HR", "IT", FilterComparator::NotEqual).unwrap());
            assert!(compare_enum("SALES", "AL", FilterComparator::Contains).unwrap());
            assert!(compare_enum("SALES", "HR", FilterComparator::NotContains).unwrap());
        }

        #[test]
        fn test_boolean_comparison() {
            assert!(compare_boolean(true, "true", FilterComparator::Equal).unwrap());
            assert!(compare_boolean(true, "TRUE", FilterComparator::Equal).unwrap());
            assert!(compare_boolean(false, "anything", FilterComparator::Equal).unwrap());
            assert!(compare_boolean(true, "false", FilterComparator::NotEqual).unwrap());
            assert!(compare_boolean(true, "false", FilterComparator::Contains).is_err());
        }
    }
}

/// Date and date-time comparison
pub mod temporal {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    pub fn compare_date(
        actual: NaiveDate,
        query: &str,
        comparator: FilterComparator,
    ) -> Result<bool, ComparisonError> {
        if comparator == FilterComparator::IsBetween {
            return is_between(actual, query);
        }

        if !comparator.is_applicable(SemanticType::Date) {
            return Err(unsupported(comparator, SemanticType::Date));
        }

        let text = FieldValue::Date(actual).to_string();
        Ok(order(
            actual,
            type_helper::parse_date(query),
            &text,
            query,
            comparator,
        ))
    }

    pub fn compare_date_time(
        actual: NaiveDateTime,
        query: &str,
        comparator: FilterComparator,
    ) -> Result<bool, ComparisonError> {
        if !comparator.is_applicable(SemanticType::DateTime) {
            return Err(unsupported(comparator, SemanticType::DateTime));
        }

        let text = FieldValue::DateTime(actual).to_string();
        Ok(order(
            actual,
            type_helper::parse_date_time(query),
            &text,
            query,
            comparator,
        ))
    }

    /// Apply an equality or ordering comparator to a parsed query.
    ///
    /// Unparsable queries never satisfy equality. The ordering comparators
    /// fall back to comparing the value's ISO text with the raw query.
    fn order<T: PartialOrd>(
        actual: T,
        expected: Option<T>,
        actual_text: &str,
        query: &str,
        comparator: FilterComparator,
    ) -> bool {
        match (expected, comparator) {
            (Some(expected), FilterComparator::Equal) => actual == expected,
            (Some(expected), FilterComparator::NotEqual) => actual != expected,
            (Some(expected), FilterComparator::IsAfter) => actual > expected,
            (Some(expected), FilterComparator::IsAfterOrEquals) => actual >= expected,
            (Some(expected), FilterComparator::IsBefore) => actual < expected,
            (Some(expected), FilterComparator::IsBeforeOrEquals) => actual <= expected,
            (None, FilterComparator::Equal | FilterComparator::NotEqual) => false,
            (None, _) => actual_text == query,
            (Some(_), _) => false,
        }
    }

    /// Inclusive range check for `start#end` queries; a blank query matches everything
    pub fn is_between(actual: NaiveDate, query: &str) -> Result<bool, ComparisonError> {
        if query.trim().is_empty() {
            return Ok(true);
        }

        let (start, end) = type_helper::split_range(query)?;
        log::debug!("Checking if {} is between {} and {}", actual, start, end);

        match (type_helper::parse_date(start), type_helper::parse_date(end)) {
            (Some(start), Some(end)) => Ok(start <= actual && actual <= end),
            _ => {
                let text = FieldValue::Date(actual).to_string();
                Ok(text == start && text == end)
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use assert_matches::assert_matches;

        fn date(y: i32, m: u32, d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        }

        #[test]
        fn test_is_between_scenario() {
            let query = "2000-01-01#2002-08-12";
            assert!(is_between(date(2002, 5, 9), query).unwrap());
            assert!(!is_between(date(1990, 12, 17), query).unwrap());
            assert!(is_between(date(2000, 1, 1), query).unwrap());
        }

        #[test]
        fn test_is_between_is_inclusive_at_both_bounds() {
            let query = "2000-01-01#2002-08-12";
            assert!(is_between(date(2002, 8, 12), query).unwrap());
            assert!(!is_between(date(1999, 12, 31), query).unwrap());
            assert!(!is_between(date(2002, 8, 13), query).unwrap());
        }

        #[test]
        fn test_is_between_blank_query_matches() {
            assert!(is_between(date(1990, 1, 1), "").unwrap());
            assert!(is_between(date(1990, 1, 1), "   ").unwrap());
        }

        #[test]
        fn test_is_between_malformed_query() {
            assert_matches!(
                is_between(date(1990, 1, 1), "2000-01-01"),
                Err(ComparisonError::MalformedRangeQuery { .. })
            );
        }

        #[test]
        fn test_is_between_unparsable_dates_fall_back_to_text() {
            assert!(!is_between(date(2000, 1, 1), "yesterday#today").unwrap());
        }

        #[test]
        fn test_date_ordering() {
            let d = date(2010, 6, 15);
            assert!(compare_date(d, "2010-06-14", FilterComparator::IsAfter).unwrap());
            assert!(!compare_date(d, "2010-06-15", FilterComparator::IsAfter).unwrap());
            assert!(compare_date(d, "2010-06-15", FilterComparator::IsAfterOrEquals).unwrap());
            assert!(compare_date(d, "2010-06-16", FilterComparator::IsBefore).unwrap());
            assert!(compare_date(d, "2010-06-15", FilterComparator::IsBeforeOrEquals).unwrap());
        }

        #[test]
        fn test_unparsable_query_falls_back_to_raw_equality() {
            let d = date(2010, 6, 15);
            assert!(!compare_date(d, "next week", FilterComparator::IsAfter).unwrap());
            assert!(!compare_date(d, "next week", FilterComparator::Equal).unwrap());
            assert!(!compare_date(d, "next week", FilterComparator::NotEqual).unwrap());
        }

        #[test]
        fn test_date_time_ordering() {
            let dt = date(2021, 3, 1).and_hms_opt(12, 0, 0).unwrap();
            assert!(compare_date_time(dt, "2021-03-01T11:59", FilterComparator::IsAfter).unwrap());
            assert!(compare_date_time(dt, "2021-03-01T12:00:00", FilterComparator::Equal).unwrap());
            assert!(!compare_date_time(dt, "2021-03-01", FilterComparator::IsBefore).unwrap());
            assert_matches!(
                compare_date_time(dt, "2021-03-01#2021-03-02", FilterComparator::IsBetween),
                Err(ComparisonError::TypeMismatch { .. })
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    #[test]
    fn test_descriptions_are_unique() {
        let mut descriptions: Vec<&str> = FilterComparator::ALL
            .iter()
            .map(|c| c.description())
            .collect();
        descriptions.sort();
        descriptions.dedup();
        assert_eq!(descriptions.len(), FilterComparator::ALL.len());
    }

    #[test]
    fn test_from_description_round_trip() {
        for comparator in FilterComparator::ALL {
            assert_eq!(
                FilterComparator::from_description(comparator.description()),
                Some(comparator)
            );
        }
        assert_eq!(FilterComparator::from_description("IS AFTER"), None);
    }

    #[test]
    fn test_from_str_accepts_names() {
        assert_eq!(
            "greater_than".parse::<FilterComparator>(),
            Ok(FilterComparator::GreaterThan)
        );
        assert_eq!(
            "is between".parse::<FilterComparator>(),
            Ok(FilterComparator::IsBetween)
        );
        assert!("between-ish".parse::<FilterComparator>().is_err());
    }

    #[test]
    fn test_applicability_table() {
        assert!(FilterComparator::Equal.is_applicable(SemanticType::Boolean));
        assert!(FilterComparator::NotEqual.is_applicable(SemanticType::DateTime));
        assert!(FilterComparator::Contains.is_applicable(SemanticType::Number));
        assert!(!FilterComparator::Contains.is_applicable(SemanticType::Date));
        assert!(!FilterComparator::GreaterThan.is_applicable(SemanticType::Text));
        assert!(FilterComparator::IsAfter.is_applicable(SemanticType::DateTime));
        assert!(FilterComparator::IsBetween.is_applicable(SemanticType::Date));
        assert!(!FilterComparator::IsBetween.is_applicable(SemanticType::DateTime));
    }

    #[test]
    fn test_compare_rejects_inapplicable_value() {
        let result = FilterComparator::GreaterThan.compare(&FieldValue::from("9000"), "5000");
        assert_matches!(
            result,
            Err(ComparisonError::TypeMismatch {
                comparator: FilterComparator::GreaterThan,
                value_type: SemanticType::Text,
            })
        );
    }

    #[test]
    fn test_null_never_matches() {
        for comparator in FilterComparator::ALL {
            assert_eq!(comparator.compare(&FieldValue::Null, "x"), Ok(false));
        }
    }

    #[test]
    fn test_equal_and_not_equal_are_complements_for_parsed_input() {
        let date = NaiveDate::from_ymd_opt(2002, 5, 9).unwrap();
        let samples = [
            (FieldValue::Number(5000.0), "5000"),
            (FieldValue::Number(5000.0), "4999.99"),
            (FieldValue::Date(date), "2002-05-09"),
            (FieldValue::Date(date), "2002-05-10"),
            (
                FieldValue::DateTime(date.and_hms_opt(8, 0, 0).unwrap()),
                "2002-05-09T08:00:00",
            ),
            (
                FieldValue::DateTime(date.and_hms_opt(8, 0, 0).unwrap()),
                "2002-05-09T09:00",
            ),
        ];

        for (value, query) in samples {
            let equal = FilterComparator::Equal.compare(&value, query).unwrap();
            let not_equal = FilterComparator::NotEqual.compare(&value, query).unwrap();
            assert_ne!(equal, not_equal, "value {} query {}", value, query);
        }
    }

    #[test]
    fn test_unparsable_input_is_defined() {
        let value = FieldValue::Number(1.0);
        assert_eq!(FilterComparator::Equal.compare(&value, "one"), Ok(false));
        assert_eq!(FilterComparator::NotEqual.compare(&value, "one"), Ok(false));
    }
}
