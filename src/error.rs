//! Error types for runbook loading, validation, and execution.
//!
//! Validation failures carry a stable numeric code and render to the
//! machine-readable `{"Message": ..., "Code": ...}` body served to clients.
//! Configuration load failures are hard errors with no JSON body: they are
//! operational faults for the embedding caller, not for clients.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Stable numeric codes carried by machine-readable error bodies.
///
/// These are part of the wire contract; existing values must never be
/// renumbered.
pub struct ErrorCode;

impl ErrorCode {
    /// A required parameter was missing, failed its pattern, or the pattern
    /// itself would not compile.
    pub const PARAMETER_VALIDATION: u16 = 1;
}

/// A request-fatal parameter validation failure.
///
/// Any of these aborts the whole run before a single subprocess is spawned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A declared required parameter has no supplied value.
    #[error("parameter '{0}' is missing")]
    MissingParameter(String),

    /// The configured validation pattern does not compile.
    #[error("cannot compile pattern '{pattern}' for parameter '{name}'")]
    InvalidPattern { name: String, pattern: String },

    /// A supplied value does not match its validation pattern.
    #[error("value '{value}' for parameter '{name}' is not valid")]
    InvalidValue { name: String, value: String },
}

impl ValidationError {
    /// The stable numeric code for this failure class.
    pub fn code(&self) -> u16 {
        ErrorCode::PARAMETER_VALIDATION
    }

    /// Build the machine-readable body served to clients.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            code: self.code(),
        }
    }
}

/// Serializable error representation for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Code")]
    pub code: u16,
}

impl ErrorBody {
    /// Render the body as a JSON string.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"Message":"serialization failed","Code":0}"#.to_string())
    }
}

/// The unified error type for runbook operations.
#[derive(Error, Debug)]
pub enum RunbookError {
    /// The runbook file could not be read.
    #[error("failed to read runbook '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML deserialization failed.
    #[error("failed to parse runbook: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON deserialization failed.
    #[error("failed to parse runbook: {0}")]
    Json(#[from] serde_json::Error),

    /// Parameter validation rejected the request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The output sink rejected a write.
    #[error("failed to write response output")]
    Output(#[source] std::io::Error),
}

impl RunbookError {
    /// The JSON body for errors that have a client-facing representation.
    ///
    /// Only validation failures produce a body; load and output errors are
    /// surfaced to the embedding caller instead.
    pub fn body(&self) -> Option<ErrorBody> {
        match self {
            RunbookError::Validation(err) => Some(err.to_body()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RunbookError>;
