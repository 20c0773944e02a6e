//! Fuzzing library for dora-mcp.
//!
//! Targets cover argument deserialization, Solr query construction and
//! extraction from publication pages.
//!
//! # Usage
//!
//! ```bash
//! cd crates/dora-fuzz
//! cargo +nightly fuzz run fuzz_page_extract -- -max_total_time=60
//! ```

pub use dora_mcp::{client::html, models, query};
