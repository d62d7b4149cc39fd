//! Configuration for the Crossref bibliography service.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Crossref REST API.
    pub const CROSSREF_API: &str = "https://api.crossref.org";

    /// Base URL for the Zotero Web API (v3).
    pub const ZOTERO_API: &str = "https://api.zotero.org";

    /// Zotero Web API version sent with every request.
    pub const ZOTERO_API_VERSION: &str = "3";

    /// Zotero accepts at most this many items per write request.
    pub const ZOTERO_WRITE_BATCH: usize = 50;

    /// Default number of search hits requested from Crossref.
    pub const DEFAULT_ROWS: u32 = 3;

    /// BibTeX transform requests in flight per lookup.
    pub const TRANSFORM_CONCURRENCY: usize = 8;

    /// Crossref rejects `rows` above this.
    pub const MAX_ROWS: u32 = 1000;

    /// Request timeout for every outbound call.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Retries for transient Crossref failures.
    pub const MAX_RETRIES: u32 = 2;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Product token used in the `User-Agent` header.
    pub const PRODUCT: &str = "Bibliography Generator/1.0";

    /// Operator contact address sent to Crossref.
    pub const CONTACT_EMAIL: &str = "bibliography_generator@proton.me";

    /// Usage policy page sent to Crossref.
    pub const POLICY_URL: &str = "https://bibliography-1-f6795465.deta.app/static/legal.html";

    /// Public URL the service is reachable at.
    pub const PUBLIC_URL: &str = "https://bibliography-1-f6795465.deta.app";

    /// Where `/` redirects to.
    pub const PROJECT_URL: &str =
        "https://github.com/bibliographygenerator/chatgpt_plugin_bibliography_crossref";
}

/// Crossref work fields requested by the search call.
pub mod fields {
    /// Fields passed as `select=` on `/works` searches.
    pub const SEARCH: &[&str] = &[
        "title",
        "subtitle",
        "author",
        "publisher",
        "type",
        "DOI",
        "ISBN",
        "URL",
        "ISSN",
        "short-container-title",
        "created",
        "score",
        "prefix",
    ];
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the Crossref API (overridable for mock servers).
    pub crossref_api_url: String,

    /// Base URL for the Zotero API (overridable for mock servers).
    pub zotero_api_url: String,

    /// Maximum number of records returned by a lookup.
    pub rows: u32,

    /// Operator e-mail announced in the `User-Agent`.
    pub contact_email: String,

    /// Usage policy URL announced in the `User-Agent`.
    pub policy_url: String,

    /// Public URL of this service (plugin manifest, OpenAPI servers).
    pub public_url: String,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient Crossref failures.
    pub max_retries: u32,
}

impl Config {
    /// Create a configuration with the given lookup cap and defaults elsewhere.
    ///
    /// `rows` is clamped to what Crossref accepts.
    #[must_use]
    pub fn new(rows: u32) -> Self {
        Self {
            crossref_api_url: api::CROSSREF_API.to_string(),
            zotero_api_url: api::ZOTERO_API.to_string(),
            rows: clamp_rows(rows),
            contact_email: api::CONTACT_EMAIL.to_string(),
            policy_url: api::POLICY_URL.to_string(),
            public_url: api::PUBLIC_URL.to_string(),
            static_dir: PathBuf::from("static"),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: api::MAX_RETRIES,
        }
    }

    /// Create a test configuration pointing both upstreams at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            crossref_api_url: base_url.trim_end_matches('/').to_string(),
            zotero_api_url: base_url.trim_end_matches('/').to_string(),
            rows: api::DEFAULT_ROWS,
            contact_email: "test@example.com".to_string(),
            policy_url: "https://example.com/legal.html".to_string(),
            public_url: "http://localhost:5003".to_string(),
            static_dir: PathBuf::from("static"),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_retries: 0, // No retries in tests
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a URL or number in the environment is invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let rows = match std::env::var("CROSSREF_ROWS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("CROSSREF_ROWS must be a number: {e}"))?,
            Err(_) => api::DEFAULT_ROWS,
        };

        let mut config = Self::new(rows);

        if let Ok(url) = std::env::var("CROSSREF_API_URL") {
            config.crossref_api_url = validated_url("CROSSREF_API_URL", &url)?;
        }
        if let Ok(url) = std::env::var("ZOTERO_API_URL") {
            config.zotero_api_url = validated_url("ZOTERO_API_URL", &url)?;
        }
        if let Ok(url) = std::env::var("PUBLIC_URL") {
            config.public_url = validated_url("PUBLIC_URL", &url)?;
        }
        if let Ok(url) = std::env::var("POLICY_URL") {
            config.policy_url = validated_url("POLICY_URL", &url)?;
        }
        if let Ok(email) = std::env::var("CONTACT_EMAIL") {
            config.contact_email = email;
        }
        if let Ok(dir) = std::env::var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Override the lookup cap.
    #[must_use]
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = clamp_rows(rows);
        self
    }

    /// Contact-bearing client identifier required by Crossref's access policy.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{} (+{}; mailto:{})", api::PRODUCT, self.policy_url, self.contact_email)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(api::DEFAULT_ROWS)
    }
}

fn clamp_rows(rows: u32) -> u32 {
    rows.clamp(1, api::MAX_ROWS)
}

fn validated_url(var: &str, raw: &str) -> anyhow::Result<String> {
    let url = url::Url::parse(raw).map_err(|e| anyhow::anyhow!("{var} is not a valid URL: {e}"))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
