//! Error types for the documentation model
//!
//! Structural anomalies in the graph (cycles, ambiguity, unresolved names) are
//! never errors: the algorithms log and degrade. These types cover API misuse
//! and the I/O boundary around the model.

use crate::types::{EntityId, MemberId};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pipeline and CLI operations
#[derive(Error, Debug)]
pub enum DocError {
    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Declaration records could not be decoded
    #[error("Failed to decode declaration records from '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Entity '{name}' not found. Check the qualified name (e.g. 'ns::Class').")]
    EntityNotFound { name: String },

    #[error("Member '{name}' not found in '{entity}' or any of its base classes")]
    MemberNotFound { entity: String, name: String },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl DocError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::EntityNotFound { .. } => "ENTITY_NOT_FOUND",
            Self::MemberNotFound { .. } => "MEMBER_NOT_FOUND",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::Model(_) => "MODEL_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::FileWrite { .. } => vec![
                "Check that the target directory exists and is writable",
                "Check available disk space",
            ],
            Self::Decode { .. } => vec![
                "The records file must be a JSON object with an 'entities' array",
                "Each entity needs at least 'name' and 'kind'",
            ],
            Self::EntityNotFound { .. } => vec![
                "Use the fully qualified name, including enclosing namespaces",
                "Run 'docgraph build <records>' to list the registered entities",
            ],
            Self::MemberNotFound { .. } => vec![
                "Run 'docgraph members <records> <entity>' to list reachable members",
            ],
            Self::ConfigError { .. } => vec![
                "Run 'docgraph init --force' to regenerate the settings file",
                "Check DG_* environment variables for typos",
            ],
            _ => vec![],
        }
    }
}

/// Errors raised when the model API is used with the wrong ids or variants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Entity id {id:?} is not registered in this model")]
    UnknownEntity { id: EntityId },

    #[error("Member id {id:?} is not registered in this model")]
    UnknownMember { id: MemberId },

    #[error("'{name}' is not a class-like entity")]
    NotAClass { name: String },

    #[error("'{name}' is not a namespace")]
    NotANamespace { name: String },

    #[error("Unrecognized member kind '{kind}'")]
    UnknownMemberKind { kind: String },

    #[error("Unrecognized compound type '{kind}'")]
    UnknownCompoundType { kind: String },

    #[error("Unrecognized protection level '{value}'")]
    UnknownProtection { value: String },

    #[error("Unrecognized virtualness specifier '{value}'")]
    UnknownSpecifier { value: String },
}

/// Result type alias for pipeline operations
pub type DocResult<T> = Result<T, DocError>;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, DocError>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> Result<T, DocError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, DocError> {
        self.map_err(|e| DocError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, DocError> {
        self.map_err(|e| DocError::General(format!("Error processing '{}': {}", path.display(), e)))
    }
}
