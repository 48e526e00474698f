//! # JSON Records
//!
//! Rows held as `serde_json::Value` objects, read through dotted field paths
//! (`address.city`, `items.0.name`) and converted to typed field values.

use crate::execution::type_helper;
use crate::types::common::{FieldValue, SemanticType};
use crate::types::field::Accessor;
use serde_json::Value;
use std::sync::Arc;

/// Path lookup on JSON rows
pub trait JsonRecord {
    /// Walk a dotted path; numeric components index into arrays
    fn get_field_by_path(&self, path: &str) -> Option<&Value>;

    /// Typed value at `path`, `Null` when missing or unconvertible
    fn field_value(&self, path: &str, value_type: SemanticType) -> FieldValue {
        self.get_field_by_path(path)
            .map(|value| json_to_field_value(value, value_type))
            .unwrap_or(FieldValue::Null)
    }
}

impl JsonRecord for Value {
    fn get_field_by_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;

        for part in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }
}

/// Convert a JSON value to the declared semantic type.
///
/// Numbers accept JSON numbers and numeric strings. Dates and date-times
/// accept ISO strings. Booleans accept JSON booleans and `"true"`/`"false"`.
pub fn json_to_field_value(value: &Value, value_type: SemanticType) -> FieldValue {
    let converted = match (value_type, value) {
        (_, Value::Null) => return FieldValue::Null,

        (SemanticType::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (SemanticType::Text, Value::Number(n)) => Some(FieldValue::Text(n.to_string())),
        (SemanticType::Text, Value::Bool(b)) => Some(FieldValue::Text(b.to_string())),

        (SemanticType::Enum, Value::String(s)) => Some(FieldValue::Enum(s.clone())),

        (SemanticType::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
        (SemanticType::Number, Value::String(s)) => {
            type_helper::parse_number(s).map(FieldValue::Number)
        }

        (SemanticType::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (SemanticType::Boolean, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(FieldValue::Boolean(true)),
            "false" => Some(FieldValue::Boolean(false)),
            _ => None,
        },

        (SemanticType::Date, Value::String(s)) => type_helper::parse_date(s).map(FieldValue::Date),
        (SemanticType::DateTime, Value::String(s)) => {
            type_helper::parse_date_time(s).map(FieldValue::DateTime)
        }

        _ => None,
    };

    converted.unwrap_or_else(|| {
        log::debug!("Cannot read {} as a {} value", value, value_type);
        FieldValue::Null
    })
}

/// Accessor reading a typed value from a JSON row
pub fn json_accessor(path: impl Into<String>, value_type: SemanticType) -> Accessor<Value> {
    let path = path.into();
    Arc::new(move |row: &Value| row.field_value(&path, value_type))
}
