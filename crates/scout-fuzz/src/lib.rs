//! Fuzzing library for paper-scout-mcp.
//!
//! This crate provides fuzzing targets for testing JSON deserialization
//! and identity parsing of the paper models.
//!
//! # Usage
//!
//! ```bash
//! cd crates/scout-fuzz
//! cargo +nightly fuzz run fuzz_paper_parse -- -max_total_time=60
//! ```

pub use paper_scout_mcp::models;
