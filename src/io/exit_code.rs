//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - operation completed, results found
//! - `1`: General error - unspecified failure
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::DocError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Entity or member not found, command otherwise ran (code 3)
    NotFound = 3,

    /// Declaration records could not be decoded (code 4)
    DecodeError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Success` if a lookup produced something, `NotFound` otherwise.
    pub fn from_lookup<T>(result: &Option<T>) -> Self {
        match result {
            Some(_) => ExitCode::Success,
            None => ExitCode::NotFound,
        }
    }

    /// Map a `DocError` to the exit code scripts should see.
    pub fn from_error(error: &DocError) -> Self {
        match error {
            DocError::EntityNotFound { .. } | DocError::MemberNotFound { .. } => {
                ExitCode::NotFound
            }
            DocError::Decode { .. } => ExitCode::DecodeError,
            DocError::FileRead { .. } | DocError::FileWrite { .. } => ExitCode::IoError,
            DocError::ConfigError { .. } => ExitCode::ConfigError,
            DocError::Model(_) | DocError::General(_) => ExitCode::GeneralError,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Not found",
            ExitCode::DecodeError => "Decode error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
        }
    }
}
