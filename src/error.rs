//! Error types for weekplan
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown person/task, missing household)
//! - 3: Rejected by household rules (toggling a chore nobody owes)
//! - 4: Operation failed (I/O, serialization, lock contention)
//!
//! The resolver and aggregator never produce errors; invalid references
//! degrade to empty results there. Errors only surface from admin mutations,
//! persistence and argument parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the weekplan CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for weekplan operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Household not initialized at {0}")]
    NotInitialized(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Household rule rejections (exit code 3)
    #[error("{person} is not assigned to {task} on {date}")]
    NotAssigned {
        person: String,
        task: String,
        date: String,
    },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotInitialized(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDate(_)
            | Error::PersonNotFound(_)
            | Error::TaskNotFound(_) => exit_codes::USER_ERROR,

            Error::NotAssigned { .. } => exit_codes::REJECTED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotAssigned { person, task, date } => Some(serde_json::json!({
                "person": person,
                "task": task,
                "date": date,
            })),
            Error::PersonNotFound(input) => Some(serde_json::json!({ "person": input })),
            Error::TaskNotFound(input) => Some(serde_json::json!({ "task": input })),
            Error::InvalidConfig(message) => Some(serde_json::json!({ "message": message })),
            Error::NotInitialized(path) | Error::LockFailed(path) => {
                Some(serde_json::json!({ "path": path.display().to_string() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for weekplan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
