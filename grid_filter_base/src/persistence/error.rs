/// Errors decoding persisted filter state
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid number of query parameters: {0} (expected 4, 5 or 7)")]
    InvalidParameterCount(usize),

    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown query parameter: {0}")]
    UnknownParameter(String),

    #[error("Query parameter '{key}' has {actual} value(s), expected {expected}")]
    LengthMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Query parameter '{0}' has a blank value")]
    BlankValue(String),

    #[error("Query parameter '{key}' is not a boolean: '{value}'")]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid percent-encoding: {0}")]
    Decoding(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
