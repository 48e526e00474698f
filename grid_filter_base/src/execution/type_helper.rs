//! # Type Helpers
//!
//! Total parsing and validation functions for raw query strings.
//! None of these functions fail: unparsable input yields `false` / `None`.

use crate::execution::comparisons::{ComparisonError, FilterComparator};
use crate::types::common::SemanticType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Separator between the two dates of an "is between" query
pub const RANGE_SEPARATOR: char = '#';

const DATE_FORMAT: &str = "%Y-%m-%d";

const LOCAL_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

const OFFSET_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Parse a decimal number, surrounding whitespace ignored. Non-finite values are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_number(s: &str) -> bool {
    parse_number(s).is_some()
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn is_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Parse an ISO-8601 date-time. The time component is required; an offset is
/// accepted and dropped, keeping the local wall-clock time.
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    for format in LOCAL_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_DATE_TIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.naive_local());
        }
    }

    None
}

pub fn is_date_time(s: &str) -> bool {
    parse_date_time(s).is_some()
}

/// Boolean parsing with `"true"` (any ASCII case) as the only true value
pub fn parse_boolean(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

/// Split an "is between" query into its start and end parts.
/// Fails unless the query splits into exactly two parts.
pub fn split_range(query: &str) -> Result<(&str, &str), ComparisonError> {
    let mut parts = query.split(RANGE_SEPARATOR);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) if !start.is_empty() && !end.is_empty() => {
            Ok((start, end))
        }
        _ => Err(ComparisonError::MalformedRangeQuery {
            query: query.to_string(),
        }),
    }
}

/// Join two dates into an "is between" query
pub fn join_range(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}{}{}",
        start.format(DATE_FORMAT),
        RANGE_SEPARATOR,
        end.format(DATE_FORMAT)
    )
}

/// Guard run before every comparison
pub fn check_type_applicable(
    comparator: FilterComparator,
    value_type: SemanticType,
) -> Result<(), ComparisonError> {
    if comparator.is_applicable(value_type) {
        Ok(())
    } else {
        Err(ComparisonError::TypeMismatch {
            comparator,
            value_type,
        })
    }
}

/// Check that a raw input is well-formed for the given comparator and type.
/// Used to decide whether an input may be accepted, not during evaluation.
pub fn is_valid_input(comparator: FilterComparator, value_type: SemanticType, input: &str) -> bool {
    if comparator == FilterComparator::IsBetween {
        return match split_range(input) {
            Ok((start, end)) => matches!((parse_date(start), parse_date(end)), (Some(s), Some(e)) if s <= e),
            Err(_) => false,
        };
    }

    match value_type {
        SemanticType::Number => is_number(input),
        SemanticType::Date => is_date(input),
        SemanticType::DateTime => is_date_time(input),
        SemanticType::Text | SemanticType::Enum | SemanticType::Boolean => !input.trim().is_empty(),
    }
}
