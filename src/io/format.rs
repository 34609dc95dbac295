//! Format definitions for CLI output.
//!
//! Provides structured format types for consistent JSON responses.

use crate::error::DocError;
use crate::io::exit_code::ExitCode;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response envelope.
///
/// Provides consistent structure for both success and error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "ENTITY_NOT_FOUND", "DECODE_ERROR")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Actual data payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details and suggestions (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Exit code for shell scripts
    pub exit_code: u8,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub suggestions: Vec<String>,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create a not found response.
    pub fn not_found(what: &str, name: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: "NOT_FOUND".to_string(),
            message: format!("{what} '{name}' not found"),
            data: None,
            error: Some(ErrorDetails {
                suggestions: vec![
                    "Check the spelling and the enclosing scopes".to_string(),
                    "Run 'docgraph build <records>' to list registered entities".to_string(),
                ],
            }),
            exit_code: ExitCode::NotFound as u8,
        }
    }

    /// Create an error response from a `DocError`.
    pub fn from_error(error: &DocError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: error.to_string(),
            data: None,
            error: Some(ErrorDetails {
                suggestions: error
                    .recovery_suggestions()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
            exit_code: ExitCode::from_error(error) as u8,
        }
    }
}
