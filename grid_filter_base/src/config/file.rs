//! TOML filter configuration
//!
//! ```toml
//! identifier = "people"
//! date_patterns = ["%d.%m.%Y"]
//!
//! [[fields]]
//! description = "Salary"
//! type = "number"
//! path = "salary"
//! comparators = ["is greater than", "less_than"]
//!
//! [[initial]]
//! field = "Salary"
//! condition = "is greater than"
//! input = "5000"
//! editable = true
//! customization = "input_value"
//! ```

use crate::config::runtime::EngineConfig;
use crate::execution::comparisons::FilterComparator;
use crate::execution::engine::FilterEngine;
use crate::format::DateFormatter;
use crate::types::common::SemanticType;
use crate::types::condition::{BadgeId, ConditionFlags, CustomizationDegree};
use crate::types::error::FilterError;
use crate::types::field::{FilterField, FilterFieldBuilder};
use crate::types::record::json_accessor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown value type '{value_type}' for field '{field}'")]
    UnknownType { field: String, value_type: String },

    #[error("Unknown comparator '{comparator}' for field '{field}'")]
    UnknownComparator { field: String, comparator: String },

    #[error("Unknown customization degree '{0}'")]
    UnknownCustomization(String),

    #[error("Field '{field}' is invalid: {source}")]
    Field {
        field: String,
        #[source]
        source: FilterError,
    },

    #[error("Initial condition on '{field}' is invalid: {source}")]
    Initial {
        field: String,
        #[source]
        source: FilterError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub reset_restores_baseline: Option<bool>,

    #[serde(default)]
    pub date_patterns: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldConfig>,

    #[serde(default)]
    pub initial: Vec<InitialConditionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub description: String,

    #[serde(rename = "type")]
    pub value_type: String,

    /// Dotted JSON path, defaults to the description
    #[serde(default)]
    pub path: Option<String>,

    /// Comparators by description or name
    #[serde(default)]
    pub comparators: Vec<String>,

    /// Add the preset comparators of the type; implied when `comparators` is empty
    #[serde(default)]
    pub preset: bool,

    #[serde(default)]
    pub enum_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialConditionConfig {
    pub field: String,
    pub condition: String,

    #[serde(default)]
    pub input: String,

    #[serde(default = "default_true")]
    pub deletable: bool,

    #[serde(default)]
    pub editable: bool,

    #[serde(default)]
    pub customization: Option<String>,

    #[serde(default)]
    pub badge_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FilterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        log::debug!(
            "Loaded filter configuration from {} ({} fields, {} initial conditions)",
            path.as_ref().display(),
            config.fields.len(),
            config.initial.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Engine preferences from the environment, overridden by this file
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(identifier) = &self.identifier {
            config = config.with_identifier(identifier.clone());
        }
        if let Some(restore) = self.reset_restores_baseline {
            config = config.with_reset_restores_baseline(restore);
        }
        config
    }

    pub fn date_formatter(&self) -> DateFormatter {
        DateFormatter::new(self.date_patterns.iter().cloned())
    }

    /// Engine over JSON rows with the configured fields and initial conditions
    pub fn build_engine(
        &self,
        rows: Vec<serde_json::Value>,
    ) -> Result<FilterEngine<serde_json::Value>, ConfigError> {
        let mut engine = FilterEngine::with_config(rows, self.engine_config());

        for field in &self.fields {
            let built = field.build()?;
            engine
                .register_field(built)
                .map_err(|source| ConfigError::Field {
                    field: field.description.clone(),
                    source,
                })?;
        }

        for initial in &self.initial {
            let comparator = parse_comparator(&initial.field, &initial.condition)?;
            let flags = initial.flags()?;
            engine
                .add_initial_condition(&initial.field, comparator, initial.input.clone(), flags)
                .map_err(|source| ConfigError::Initial {
                    field: initial.field.clone(),
                    source,
                })?;
        }

        Ok(engine)
    }
}

impl FieldConfig {
    fn build(&self) -> Result<Arc<FilterField<serde_json::Value>>, ConfigError> {
        let value_type: SemanticType =
            self.value_type
                .parse()
                .map_err(|_| ConfigError::UnknownType {
                    field: self.description.clone(),
                    value_type: self.value_type.clone(),
                })?;

        let path = self.path.as_deref().unwrap_or(&self.description);
        let mut builder = FilterFieldBuilder::from_accessor(
            self.description.clone(),
            value_type,
            json_accessor(path, value_type),
        )
        .with_enum_values(self.enum_values.iter().cloned());

        for name in &self.comparators {
            builder = builder.with_comparator(parse_comparator(&self.description, name)?);
        }
        if self.preset || self.comparators.is_empty() {
            builder = builder.with_preset_comparators();
        }

        builder.build().map_err(|source| ConfigError::Field {
            field: self.description.clone(),
            source,
        })
    }
}

impl InitialConditionConfig {
    fn flags(&self) -> Result<ConditionFlags, ConfigError> {
        let customization = match &self.customization {
            Some(name) => name
                .parse::<CustomizationDegree>()
                .map_err(|_| ConfigError::UnknownCustomization(name.clone()))?,
            None => CustomizationDegree::Everything,
        };

        let flags = ConditionFlags::new(self.deletable, self.editable, customization);
        Ok(match &self.badge_id {
            Some(id) => flags.with_badge_id(BadgeId::from(id.as_str())),
            None => flags,
        })
    }
}

fn parse_comparator(field: &str, name: &str) -> Result<FilterComparator, ConfigError> {
    name.parse().map_err(|_| ConfigError::UnknownComparator {
        field: field.to_string(),
        comparator: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::io::Write;

    const CONFIG: &str = r#"
identifier = "people"
reset_restores_baseline = true
date_patterns = ["%d.%m.%Y"]

[[fields]]
description = "Name"
type = "text"
path = "name"

[[fields]]
description = "Salary"
type = "number"
path = "pay.salary"
comparators = ["is greater than", "less_than"]

[[fields]]
description = "Department"
type = "enum"
path = "department"
enum_values = ["HR", "IT"]
preset = true

[[initial]]
field = "Department"
condition = "is equals to"
input = "HR"
editable = true
customization = "input_value"
"#;

    fn rows() -> Vec<serde_json::Value> {
        vec![
            json!({ "name": "Sarah", "pay": { "salary": 9050.6 }, "department": "HR" }),
            json!({ "name": "Tom", "pay": { "salary": 1000 }, "department": "IT" }),
            json!({ "name": "Anna", "pay": { "salary": "5000" }, "department": "HR" }),
        ]
    }

    #[test]
    fn test_parse_config() {
        let config = FilterConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.identifier.as_deref(), Some("people"));
        assert_eq!(config.fields.len(), 3);
        assert_eq!(config.initial.len(), 1);
        assert!(config.initial[0].deletable);
        assert_eq!(config.date_formatter().patterns(), &["%d.%m.%Y".to_string()]);
    }

    #[test]
    fn test_build_engine() {
        let config = FilterConfig::from_toml_str(CONFIG).unwrap();
        let mut engine = config.build_engine(rows()).unwrap();

        assert_eq!(engine.config().component_id(), "people");
        assert_eq!(
            engine.field("Salary").unwrap().comparators(),
            &[FilterComparator::GreaterThan, FilterComparator::LessThan]
        );
        assert_eq!(engine.field("Name").unwrap().comparators().len(), 4);
        assert_eq!(engine.source().filtered_count(), 2);

        engine
            .add_condition("Salary", FilterComparator::GreaterThan, "6000")
            .unwrap();
        let names: Vec<&str> = engine
            .source()
            .filtered_rows()
            .into_iter()
            .filter_map(|row| row["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Sarah"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = FilterConfig::load(file.path()).unwrap();
        assert_eq!(config.fields[1].path.as_deref(), Some("pay.salary"));
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            FilterConfig::load("/nonexistent/grid-filter.toml"),
            Err(ConfigError::Io(_))
        );
    }

    #[test]
    fn test_invalid_definitions() {
        let config = FilterConfig::from_toml_str(
            r#"
[[fields]]
description = "Salary"
type = "money"
"#,
        )
        .unwrap();
        assert_matches!(config.build_engine(vec![]), Err(ConfigError::UnknownType { .. }));

        let config = FilterConfig::from_toml_str(
            r#"
[[fields]]
description = "Name"
type = "text"
comparators = ["is after"]
"#,
        )
        .unwrap();
        assert_matches!(
            config.build_engine(vec![]),
            Err(ConfigError::Field {
                source: FilterError::TypeMismatch { .. },
                ..
            })
        );

        let config = FilterConfig::from_toml_str(
            r#"
[[fields]]
description = "Name"
type = "text"

[[initial]]
field = "Name"
condition = "resembles"
"#,
        )
        .unwrap();
        assert_matches!(
            config.build_engine(vec![]),
            Err(ConfigError::UnknownComparator { .. })
        );

        assert_matches!(
            FilterConfig::from_toml_str("fields = 3"),
            Err(ConfigError::Toml(_))
        );
    }
}
