//! Outbound API clients.
//!
//! - [`CrossrefClient`]: works search and per-DOI BibTeX transform, behind
//!   the [`WorksApi`] trait, with retry middleware for transient failures
//! - [`ZoteroClient`]: item creation in a user or group library
//!
//! Both share one status-code mapping and carry request/connect timeouts.

mod crossref;
mod zotero;

use std::time::Duration;

pub use crossref::CrossrefClient;
pub use zotero::{WriteReport, ZoteroClient};

use crate::error::{ClientError, ClientResult};

/// The Crossref operations the pipeline depends on.
#[async_trait::async_trait]
pub trait WorksApi: Send + Sync {
    /// Relevance-sorted `works` search; returns the raw `message.items`.
    async fn search_works(&self, query: &str, rows: u32) -> ClientResult<Vec<serde_json::Value>>;

    /// Ready-made BibTeX for one DOI.
    async fn transform_bibtex(&self, doi: &str) -> ClientResult<String>;
}

/// Map a non-success status to a [`ClientError`].
pub(crate) async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

/// Report reqwest timeouts as [`ClientError::Timeout`].
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() { ClientError::Timeout(timeout) } else { ClientError::Http(err) }
}
