//! Error types for the Crossref bibliography service.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! None of these escape an HTTP handler: every operation turns them into an
//! in-band diagnostic or message.

use std::time::Duration;

/// Errors from the outbound HTTP client layer (Crossref and Zotero).
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Successful response whose body is not what the API documents
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from the BibTeX codec.
#[derive(thiserror::Error, Debug)]
pub enum BibtexError {
    /// The text is not valid BibTeX
    #[error("{0}")]
    ParseFailed(String),

    /// The text parsed but held no entries
    #[error("no BibTeX entries found")]
    NoEntries,
}

/// Errors from forwarding citations into a Zotero library.
#[derive(thiserror::Error, Debug)]
pub enum ForwardError {
    /// A required request field is absent or not a string
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The BibTeX blob could not be parsed
    #[error("BibTeX error: {0}")]
    Bibtex(#[from] BibtexError),

    /// Zotero accepted the request but rejected some items
    #[error("Zotero rejected {count} item(s): {reasons}")]
    Rejected {
        /// Number of rejected items
        count: usize,
        /// Rejection messages joined together
        reasons: String,
    },

    /// Transport or status failure talking to Zotero
    #[error("{0}")]
    Client(#[from] ClientError),
}

impl ForwardError {
    /// Convert to the message returned to the caller.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::MissingParameter(field) => {
                format!("Please add the missing required parameter: {field}")
            }
            Self::Bibtex(err) => format!("Error parsing BibTeX data: {err}"),
            Self::Rejected { .. } | Self::Client(_) => {
                format!("Error adding items to Zotero: {self}")
            }
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for forwarding operations.
pub type ForwardResult<T> = Result<T, ForwardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());

        assert!(!ClientError::not_found("10.1000/xyz").is_retryable());
        assert!(!ClientError::bad_request("invalid query").is_retryable());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("work");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_forward_error_user_message() {
        let msg = ForwardError::MissingParameter("api_key").to_user_message();
        assert_eq!(msg, "Please add the missing required parameter: api_key");

        let msg = ForwardError::from(BibtexError::NoEntries).to_user_message();
        assert!(msg.starts_with("Error parsing BibTeX data"));

        let msg = ForwardError::from(ClientError::server(503, "down")).to_user_message();
        assert!(msg.starts_with("Error adding items to Zotero"));
        assert!(msg.contains("503"));
    }
}
