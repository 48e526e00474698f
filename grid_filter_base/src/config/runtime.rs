// ENGINE PREFERENCES

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Component identifier written into persisted records. Records are only
    /// replayed into an engine with the same identifier.
    pub identifier: Option<String>,

    /// Whether `reset()` brings the initial conditions back
    pub reset_restores_baseline: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            identifier: env::var("GRID_FILTER_IDENTIFIER")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            reset_restores_baseline: env::var("GRID_FILTER_RESET_RESTORES_BASELINE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl EngineConfig {
    /// Configuration that ignores the environment
    pub fn new() -> Self {
        Self {
            identifier: None,
            reset_restores_baseline: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_reset_restores_baseline(mut self, restore: bool) -> Self {
        self.reset_restores_baseline = restore;
        self
    }

    /// Identifier used for persistence, empty when none is set
    pub fn component_id(&self) -> &str {
        self.identifier.as_deref().unwrap_or("")
    }
}
