//! Front-end boundary: declaration records in, finished model out.

mod pipeline;
mod records;
mod resolve;

pub use pipeline::{BuildSummary, Pipeline};
pub use records::{RawBase, RawDocument, RawEntity, RawMember};
pub use resolve::{ScopeResolver, split_template_spec};
