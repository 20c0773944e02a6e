//! Configuration for the DORA MCP server.

use std::time::Duration;

/// DORA endpoint constants.
pub mod api {
    use std::time::Duration;

    /// Base URL of the Empa DORA instance.
    pub const BASE_URL: &str = "https://www.dora.lib4ri.ch/empa";

    /// Path of the JSON citation search endpoint, relative to the base URL.
    pub const SEARCH_PATH: &str = "/islandora/search/json_cit_a";

    /// Path of publication object pages, relative to the base URL.
    pub const OBJECT_PATH: &str = "/islandora/object";

    /// Namespace prefix of DORA Empa PIDs.
    pub const PID_NAMESPACE: &str = "empa";

    /// Timeout for search and page requests.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for full-text PDF downloads.
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

    /// Largest full-text body downloaded (50 MiB).
    pub const MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// User agent sent with every upstream request.
    pub const USER_AGENT: &str = concat!("dora-mcp/", env!("CARGO_PKG_VERSION"));
}

/// Server defaults.
pub mod server {
    /// Default HTTP bind host.
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 8000;

    /// Service name reported by health checks and `initialize`.
    pub const SERVICE_NAME: &str = "dora-mcp";

    /// Human-readable service title.
    pub const SERVICE_TITLE: &str = "DORA MCP Server";

    /// MCP protocol version assumed when the client does not send one.
    pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
}

/// Upstream client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// DORA base URL (override for mock servers or other DORA instances).
    pub base_url: String,

    /// Timeout for search and page requests.
    pub request_timeout: Duration,

    /// Timeout for PDF downloads.
    pub download_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Largest full-text body accepted, in bytes.
    pub max_download_bytes: u64,
}

impl Config {
    /// Create a configuration for the given DORA base URL.
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| api::BASE_URL.to_string());

        Self {
            base_url,
            request_timeout: api::REQUEST_TIMEOUT,
            download_timeout: api::DOWNLOAD_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_download_bytes: api::MAX_DOWNLOAD_BYTES,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            download_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_download_bytes: api::MAX_DOWNLOAD_BYTES,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("DORA_BASE_URL").ok();
        Ok(Self::new(base_url))
    }

    /// Full URL of the search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, api::SEARCH_PATH)
    }

    /// Full URL of the object page for a PID.
    #[must_use]
    pub fn object_url(&self, pid: &str) -> String {
        format!("{}{}/{}", self.base_url, api::OBJECT_PATH, pid)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
