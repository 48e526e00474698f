use crate::persistence::error::CodecError;
use crate::types::condition::{ActiveCondition, BadgeId};
use serde::{Deserialize, Serialize};

/// Persisted form of one chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRecord {
    #[serde(rename = "id")]
    pub component_id: String,
    pub field: String,
    pub condition: String,
    pub input: String,
    pub badge_id: BadgeId,
    pub deletable: bool,
    pub editable: bool,
}

impl ConditionRecord {
    pub fn from_active<R>(component_id: &str, active: &ActiveCondition<R>) -> Self {
        Self {
            component_id: component_id.to_string(),
            field: active.field_description().to_string(),
            condition: active.comparator().description().to_string(),
            input: active.raw_input().to_string(),
            badge_id: active.badge_id().clone(),
            deletable: active.is_deletable(),
            editable: active.flags().editable,
        }
    }

    /// Records describing the same condition of the same component
    pub fn same_condition(&self, other: &ConditionRecord) -> bool {
        self.component_id == other.component_id
            && self.field == other.field
            && self.condition == other.condition
            && self.input == other.input
    }
}

pub fn records_to_json(records: &[ConditionRecord]) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn records_from_json(json: &str) -> Result<Vec<ConditionRecord>, CodecError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let record = ConditionRecord {
            component_id: "people".to_string(),
            field: "Salary".to_string(),
            condition: "is greater than".to_string(),
            input: "5000".to_string(),
            badge_id: BadgeId::NoBadge,
            deletable: true,
            editable: false,
        };

        let json = records_to_json(&[record.clone()]).unwrap();
        assert!(json.contains("\"id\": \"people\""));
        assert!(json.contains("\"badgeId\": \"noBadgeId\""));

        assert_eq!(records_from_json(&json).unwrap(), vec![record]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            records_from_json("{not json"),
            Err(CodecError::Json(_))
        ));
    }
}
