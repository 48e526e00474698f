//! # Grid Filter CLI
//!
//! Loads a filter configuration and JSON rows, applies conditions from a
//! saved query string and from the command line, and reports the result.

use grid_filter_base::config::{ConfigError, FilterConfig};
use grid_filter_base::execution::FilterComparator;
use grid_filter_base::persistence::CodecError;
use grid_filter_base::types::FilterError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read rows from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rows in {path}: {source}")]
    Rows {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rows in {0} must be a JSON array")]
    NotAnArray(PathBuf),

    #[error("Invalid query string: {0}")]
    Query(#[from] CodecError),

    #[error("Invalid condition '{0}', expected FIELD|COMPARATOR|INPUT")]
    InvalidCondition(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Failed to write rows: {0}")]
    Output(#[source] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Io { .. } => 2,
            CliError::Rows { .. } | CliError::NotAnArray(_) => 3,
            CliError::Query(_) | CliError::InvalidCondition(_) | CliError::Filter(_) => 4,
            CliError::Output(_) => 5,
        }
    }
}

/// A condition given on the command line as `FIELD|COMPARATOR|INPUT`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionArg {
    pub field: String,
    pub comparator: FilterComparator,
    pub input: String,
}

pub fn parse_condition(arg: &str) -> Result<ConditionArg, CliError> {
    let invalid = || CliError::InvalidCondition(arg.to_string());

    let mut parts = arg.splitn(3, '|');
    let field = parts.next().map(str::trim).filter(|f| !f.is_empty()).ok_or_else(invalid)?;
    let comparator = parts
        .next()
        .ok_or_else(invalid)?
        .parse::<FilterComparator>()
        .map_err(|_| invalid())?;
    let input = parts.next().unwrap_or("").to_string();

    Ok(ConditionArg {
        field: field.to_string(),
        comparator,
        input,
    })
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub rows: PathBuf,
    pub query: Option<String>,
    pub conditions: Vec<ConditionArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRun {
    pub rows: Vec<Value>,
    pub query: String,
    pub labels: Vec<String>,
    pub total: usize,
}

pub fn run(options: &RunOptions) -> Result<FilterRun, CliError> {
    let config = FilterConfig::load(&options.config)?;
    let rows = load_rows(&options.rows)?;
    let total = rows.len();

    let mut engine = config.build_engine(rows)?;

    if let Some(query) = &options.query {
        let summary = engine.restore_from_query(query)?;
        log::debug!(
            "Query applied {} conditions, removed {}, skipped {}",
            summary.applied,
            summary.removed,
            summary.skipped
        );
    }

    for condition in &options.conditions {
        engine.add_condition(&condition.field, condition.comparator, condition.input.clone())?;
    }

    let formatter = config.date_formatter();
    let labels = engine
        .conditions()
        .iter()
        .map(|active| formatter.condition_label(active.condition()))
        .collect();

    let filtered: Vec<Value> = engine.source().filtered_rows().into_iter().cloned().collect();
    log::info!("{} of {} rows match", filtered.len(), total);

    Ok(FilterRun {
        rows: filtered,
        query: engine.to_query_string(),
        labels,
        total,
    })
}

/// Rows as pretty-printed JSON
pub fn render_rows(rows: &[Value]) -> Result<String, CliError> {
    serde_json::to_string_pretty(rows).map_err(CliError::Output)
}

fn load_rows(path: &Path) -> Result<Vec<Value>, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| CliError::Rows {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Array(rows) => Ok(rows),
        _ => Err(CliError::NotAnArray(path.to_path_buf())),
    }
}
