//! Publication identifiers and lookup results.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::api;
use crate::error::{ToolError, ToolResult};

/// Namespaced Fedora PID, e.g. `empa:12345`.
static PID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*:[A-Za-z0-9_.-]+$").expect("valid PID regex")
});

/// A DORA publication identifier (Islandora PID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PublicationId(String);

impl PublicationId {
    /// Parse an identifier given as a PID, a bare number or an object URL.
    ///
    /// Bare numbers are placed in the `empa` namespace. URLs must contain an
    /// `/islandora/object/{pid}` path; the PID may be percent-encoded.
    pub fn parse(raw: &str) -> ToolResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ToolError::validation("publication_id", "publication_id is required"));
        }

        let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
            pid_from_url(raw).ok_or_else(|| {
                ToolError::validation("publication_id", format!("'{raw}' is not a DORA object URL"))
            })?
        } else {
            decode(raw)
        };

        if !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(format!("{}:{candidate}", api::PID_NAMESPACE)));
        }

        if PID_PATTERN.is_match(&candidate) {
            Ok(Self(candidate))
        } else {
            Err(ToolError::validation(
                "publication_id",
                format!("'{raw}' is not a DORA publication identifier"),
            ))
        }
    }

    /// The PID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map(|v| v.into_owned()).unwrap_or_else(|_| value.to_string())
}

fn pid_from_url(raw: &str) -> Option<String> {
    let url = url::Url::parse(raw).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "object")?;
    segments.next().filter(|pid| !pid.is_empty()).map(decode)
}

/// Abstract of a publication, taken from its object page.
#[derive(Debug, Clone, Serialize)]
pub struct AbstractResult {
    /// Normalized PID.
    pub publication_id: PublicationId,
    /// Object page the abstract was read from.
    pub url: String,
    /// Abstract text.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// A downloaded full-text PDF.
#[derive(Debug, Clone, Serialize)]
pub struct FulltextResult {
    /// Normalized PID.
    pub publication_id: PublicationId,
    /// Object page the link was found on.
    pub page_url: String,
    /// Resolved PDF URL.
    pub pdf_url: String,
    /// Content type reported by DORA.
    pub content_type: Option<String>,
    /// Body size, from `Content-Length` when the body is not embedded.
    pub size_bytes: u64,
    /// Base64 body, present only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_base64: Option<String>,
}

/// Expected markup or content was absent.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationNotFound {
    /// Always `false`.
    pub found: bool,
    /// Normalized PID.
    pub publication_id: PublicationId,
    /// Page that was inspected.
    pub url: String,
    /// What was missing.
    pub reason: String,
}

impl PublicationNotFound {
    #[must_use]
    pub fn new(publication_id: PublicationId, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { found: false, publication_id, url: url.into(), reason: reason.into() }
    }
}

/// Outcome of a page lookup that can legitimately come up empty.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Lookup<T> {
    /// The requested content.
    Found(T),
    /// The page carried no such content.
    NotFound(PublicationNotFound),
}

impl<T> Lookup<T> {
    /// Returns true if the content was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
