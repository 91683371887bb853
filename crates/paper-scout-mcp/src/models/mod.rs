//! Data models: papers, identities, queries, and tool inputs.
//!
//! Tool inputs use `#[serde(rename_all = "camelCase")]` to match the
//! JSON Schemas advertised over MCP.

mod enums;
mod inputs;
mod paper;
mod query;

pub use enums::{ExportFormat, ResponseFormat, SourceKind, UnknownSource};
pub use inputs::{ExportReferencesInput, FetchPaperInput, SearchPapersInput};
pub use paper::{
    Paper, PaperId, ParsePaperIdError, RankedPaper, SearchOutcome, SourceStatus,
    strip_arxiv_version,
};
pub use query::SearchQuery;
