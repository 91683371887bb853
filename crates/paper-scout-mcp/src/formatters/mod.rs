//! Output formatting for tool responses.
//!
//! Markdown for human-oriented reading, compact JSON when the caller
//! wants structure. Both keep token usage down: list views truncate
//! abstracts, JSON omits absent fields.

mod json;
mod markdown;

pub use json::{compact_paper, compact_ranked, outcome_json};
pub use markdown::{format_outcome_markdown, format_paper_markdown};
