// ============================================================================
// SEMANTIC TYPES
// ============================================================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared value domain of a filter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Text,
    Number,
    Boolean,
    Enum,
    Date,
    DateTime,
}

impl SemanticType {
    pub const ALL: [SemanticType; 6] = [
        SemanticType::Text,
        SemanticType::Number,
        SemanticType::Boolean,
        SemanticType::Enum,
        SemanticType::Date,
        SemanticType::DateTime,
    ];

    /// Check if values of this type are points in time
    pub fn is_temporal(&self) -> bool {
        matches!(self, SemanticType::Date | SemanticType::DateTime)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Number)
    }

    /// Types whose input is picked from a closed list of values
    pub fn is_selectable(&self) -> bool {
        matches!(self, SemanticType::Enum | SemanticType::Boolean)
    }

    pub fn as_display_string(&self) -> &'static str {
        match self {
            SemanticType::Text => "text",
            SemanticType::Number => "number",
            SemanticType::Boolean => "boolean",
            SemanticType::Enum => "enum",
            SemanticType::Date => "date",
            SemanticType::DateTime => "date_time",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display_string())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(SemanticType::Text),
            "number" | "numeric" => Ok(SemanticType::Number),
            "boolean" | "bool" => Ok(SemanticType::Boolean),
            "enum" => Ok(SemanticType::Enum),
            "date" => Ok(SemanticType::Date),
            "date_time" | "datetime" => Ok(SemanticType::DateTime),
            other => Err(format!("Unknown semantic type: {}", other)),
        }
    }
}

// ============================================================================
// FIELD VALUES
// ============================================================================

/// Value read off a row by a field accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Enum constant name
    Enum(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl FieldValue {
    /// Semantic type carried by this value, `None` for null
    pub fn semantic_type(&self) -> Option<SemanticType> {
        match self {
            FieldValue::Text(_) => Some(SemanticType::Text),
            FieldValue::Number(_) => Some(SemanticType::Number),
            FieldValue::Boolean(_) => Some(SemanticType::Boolean),
            FieldValue::Enum(_) => Some(SemanticType::Enum),
            FieldValue::Date(_) => Some(SemanticType::Date),
            FieldValue::DateTime(_) => Some(SemanticType::DateTime),
            FieldValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// Plain textual form, used by substring comparators and raw-equality fallbacks.
/// Dates render as ISO-8601 (`2024-01-31`, `2024-01-31T08:30:00`).
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Enum(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_types() {
        let text = FieldValue::from("Alice");
        assert_eq!(text.semantic_type(), Some(SemanticType::Text));
        assert_eq!(text.as_text(), Some("Alice"));

        let number = FieldValue::from(9050.6);
        assert_eq!(number.semantic_type(), Some(SemanticType::Number));
        assert_eq!(number.as_number(), Some(9050.6));

        let missing: FieldValue = Option::<bool>::None.into();
        assert!(missing.is_null());
        assert_eq!(missing.semantic_type(), None);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Number(5000.0).to_string(), "5000");
        assert_eq!(FieldValue::Number(9050.6).to_string(), "9050.6");

        let date = NaiveDate::from_ymd_opt(2002, 5, 9).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2002-05-09");

        let dt = date.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(FieldValue::DateTime(dt).to_string(), "2002-05-09T08:30:00");
    }

    #[test]
    fn test_semantic_type_from_str() {
        assert_eq!("Number".parse::<SemanticType>(), Ok(SemanticType::Number));
        assert_eq!("datetime".parse::<SemanticType>(), Ok(SemanticType::DateTime));
        assert!("money".parse::<SemanticType>().is_err());
    }

    #[test]
    fn test_semantic_type_categories() {
        assert!(SemanticType::Date.is_temporal());
        assert!(SemanticType::DateTime.is_temporal());
        assert!(!SemanticType::Text.is_temporal());
        assert!(SemanticType::Enum.is_selectable());
        assert!(SemanticType::Number.is_numeric());
    }
}
