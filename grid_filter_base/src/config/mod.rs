pub mod file;
pub mod runtime;

pub use file::{ConfigError, FieldConfig, FilterConfig, InitialConditionConfig};
pub use runtime::EngineConfig;
