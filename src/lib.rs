//! Cross-referenced symbol model for documentation generators.
//!
//! Declaration records from language front ends are turned into a
//! [`DocumentationModel`]: classes and namespaces with their inheritance
//! edges, categorised member lists, merged all-members tables, template
//! instances and resolved using relations. Renderers query the finished
//! model; [`tagfile::TagFileWriter`] exports it for other runs to link
//! against.

pub mod categorize;
pub mod config;
pub mod display;
pub mod error;
pub mod ingest;
pub mod io;
pub mod logging;
pub mod merge;
pub mod model;
pub mod namespace;
pub mod query;
pub mod relations;
pub mod tagfile;
pub mod template;
pub mod types;

// Explicit exports for better API clarity
pub use config::{ConfigFacade, MapConfig, ModelOptions, Settings};
pub use error::{DocError, DocResult, ModelError, ModelResult};
pub use ingest::{BuildSummary, Pipeline, RawDocument};
pub use merge::MergeStats;
pub use model::{DocumentationModel, MemberInfo, MemberListType, MemberRecord};
pub use relations::BaseEdge;
pub use tagfile::TagFileWriter;
pub use types::{
    CompactString, CompoundType, EntityId, Location, MemberId, MemberKind, Protection, Specifier,
    SrcLang, compact_string,
};
