// Error kinds surfaced by the dashboard pipeline

use thiserror::Error;

/// Domain failures. Orchestration code wraps these in `anyhow::Error` with context.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashError {
    /// The input table could not be read or parsed. Terminal for the session.
    #[error("failed to load data from {source_name}: {reason}")]
    LoadFailure { source_name: String, reason: String },

    #[error("field '{field}' not found (available: {})", .available.join(", "))]
    UnknownField { field: String, available: Vec<String> },

    #[error("field '{field}' is not numeric and cannot be summed")]
    NonNumericField { field: String },

    #[error("sum aggregation requires a value field")]
    MissingValueField,

    #[error("invalid value '{value}' for {option} (expected one of: {expected})")]
    InvalidOption {
        option: String,
        value: String,
        expected: String,
    },

    #[error("category '{category}' is not present in field '{field}'")]
    UnknownCategory { field: String, category: String },
}

impl DashError {
    pub fn load_failure(source_name: impl Into<String>, reason: impl ToString) -> Self {
        DashError::LoadFailure {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_option(option: &str, value: &str, expected: &[&str]) -> Self {
        DashError::InvalidOption {
            option: option.to_string(),
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}
