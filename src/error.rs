//! Error types.
//!
//! Two layers:
//!
//! - [`MatchError`]: typed failures raised by the library (selection,
//!   classification, ingest, persistence). Callers can match on the kind.
//! - [`AppError`]: what the binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - 2: invalid input / usage (bad CSV, empty table, unknown column)
//! - 3: no valid fit or data-integrity failure during classification
//! - 4: persistence or internal failure

use thiserror::Error;

/// Failures raised by the matching pipeline and its collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Table '{table}' has no rows.")]
    EmptyInput { table: String },

    #[error("Mismatched lengths: {train} ({train_len}) and {ideal} ({ideal_len})")]
    LengthMismatch {
        train: String,
        train_len: usize,
        ideal: String,
        ideal_len: usize,
    },

    #[error("No valid ideal function found for training column '{column}'.")]
    NoValidFit { column: String },

    #[error("No ideal function value found for x = {x}")]
    MissingIdealPoint { x: f64 },

    #[error("No maximum deviation recorded for training column '{column}'.")]
    MissingDeviation { column: String },

    #[error("Invalid table '{table}': {message}")]
    InvalidTable { table: String, message: String },

    #[error("Failed to persist table '{table}': {message}")]
    Persistence { table: String, message: String },

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },
}

impl MatchError {
    pub fn invalid_table(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTable {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn persistence(table: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Persistence {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            MatchError::EmptyInput { .. }
            | MatchError::InvalidTable { .. }
            | MatchError::Io { .. } => 2,
            MatchError::LengthMismatch { .. }
            | MatchError::NoValidFit { .. }
            | MatchError::MissingIdealPoint { .. }
            | MatchError::MissingDeviation { .. } => 3,
            MatchError::Persistence { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_errors_map_to_exit_codes() {
        let err: AppError = MatchError::NoValidFit { column: "y1".to_string() }.into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.message(), "No valid ideal function found for training column 'y1'.");

        let err: AppError = MatchError::persistence("test_results", "disk full").into();
        assert_eq!(err.exit_code(), 4);

        let err: AppError = MatchError::EmptyInput { table: "train".to_string() }.into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_point_message_names_x() {
        let err = MatchError::MissingIdealPoint { x: 2.5 };
        assert_eq!(err.to_string(), "No ideal function value found for x = 2.5");
    }
}
