//! Declaration records as front ends emit them.
//!
//! Everything is plain strings here; kinds, protections and language tags
//! are decoded by the pipeline so that one bad record can be logged and
//! skipped without rejecting the whole document.

use crate::error::{DocError, DocResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A batch of declaration records.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDocument {
    #[serde(default)]
    pub entities: Vec<RawEntity>,
}

impl RawDocument {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and decode a records file.
    pub fn from_path(path: &Path) -> DocResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DocError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| DocError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// A class-like or namespace-like declaration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawEntity {
    /// Fully qualified, `::` separated
    pub name: String,
    pub kind: String,
    pub file: String,
    pub line: u32,
    pub column: u16,
    pub language: Option<String>,
    pub protection: Option<String>,
    pub documented: bool,
    pub hidden: bool,
    pub is_static: bool,
    pub traits: Vec<String>,
    pub template_params: Vec<String>,
    pub bases: Vec<RawBase>,
    pub using_namespaces: Vec<String>,
    pub using_declarations: Vec<String>,
    /// Inline namespace
    pub inline: bool,
    pub members: Vec<RawMember>,
}

/// A base class, either just its name or with edge attributes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawBase {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        protection: Option<String>,
        #[serde(default)]
        virtualness: Option<String>,
    },
}

impl RawBase {
    /// Base name as written, possibly with a template spec (`Base<T>`).
    pub fn name(&self) -> &str {
        match self {
            RawBase::Name(name) | RawBase::Detailed { name, .. } => name,
        }
    }

    pub fn protection(&self) -> Option<&str> {
        match self {
            RawBase::Name(_) => None,
            RawBase::Detailed { protection, .. } => protection.as_deref(),
        }
    }

    pub fn virtualness(&self) -> Option<&str> {
        match self {
            RawBase::Name(_) => None,
            RawBase::Detailed { virtualness, .. } => virtualness.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawMember {
    pub name: String,
    pub kind: String,
    pub protection: Option<String>,
    pub virtualness: Option<String>,
    #[serde(rename = "type")]
    pub type_string: String,
    pub args: String,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub friend: bool,
    pub related: bool,
    pub constructor: bool,
    pub destructor: bool,
    pub documented: bool,
    pub hidden: bool,
    pub file: Option<String>,
    pub line: u32,
}
