//! Error types for multisql.
//!
//! Only run-level failures live here. Anything that goes wrong while talking to
//! a single server is captured as an [`ExecutionOutcome`](crate::executor::ExecutionOutcome)
//! instead and never aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error type. Every variant ends the process with exit status 1.
#[derive(Error, Debug)]
pub enum MultisqlError {
    /// No configuration document at the expected location.
    #[error("Configuration file {} not found", .0.display())]
    ConfigFileMissing(PathBuf),

    /// The configuration document exists but is not a group mapping.
    #[error("Configuration file {} is invalid: {}", .0.display(), .1)]
    ConfigInvalid(PathBuf, String),

    /// The requested group is not a key of the configuration mapping.
    #[error("Group {0} was not found")]
    GroupNotFound(String),

    /// The SQL input file does not exist.
    #[error("Input file {} was not found", .0.display())]
    SqlFileMissing(PathBuf),

    /// The SQL input file exists but could not be read.
    #[error("Input file {} could not be read: {}", .0.display(), .1)]
    SqlFileUnreadable(PathBuf, String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MultisqlError {
    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigFileMissing(_) | Self::ConfigInvalid(..) => "Configuration Error",
            Self::GroupNotFound(_) => "Group Error",
            Self::SqlFileMissing(_) | Self::SqlFileUnreadable(..) => "Input Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using MultisqlError.
pub type Result<T> = std::result::Result<T, MultisqlError>;
