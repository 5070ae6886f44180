use thiserror::Error;

/// Failures inside a single curl parse. Most of them only cause the offending
/// argument to be skipped; `EmptyInput` and `MissingUrl` abort the parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty input")]
    EmptyInput,

    #[error("No target url found")]
    MissingUrl,

    #[error("Flag {flag} expects a value")]
    MissingValue { flag: String },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid form field: {0}")]
    InvalidFormField(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to parse spec as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spec document is not a JSON object")]
    NotAnObject,
}
