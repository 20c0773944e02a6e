//! Text envelopes for MCP tool results.

use serde::Serialize;

/// Prefix of error text returned by the search tools.
pub const SEARCH_ERROR_PREFIX: &str = "Error searching DORA";

/// Prefix of error text returned by the publication tools.
pub const PUBLICATION_ERROR_PREFIX: &str = "Error fetching publication";

/// Wrap a keyword search response.
pub fn format_search_results(term: &str, results: &serde_json::Value) -> serde_json::Result<String> {
    Ok(format!(
        "Search results for '{term}':\n\nRaw JSON response:\n{}",
        serde_json::to_string_pretty(results)?
    ))
}

/// Wrap a filtered search response under a heading.
pub fn format_listing(heading: &str, results: &serde_json::Value) -> serde_json::Result<String> {
    Ok(format!("{heading}:\n{}", serde_json::to_string_pretty(results)?))
}

/// Render a publication lookup as pretty JSON.
pub fn format_lookup<T: Serialize>(lookup: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(lookup)
}

/// Error text shown to the caller when the upstream call failed.
#[must_use]
pub fn format_error(prefix: &str, message: &str) -> String {
    format!("{prefix}: {message}")
}
