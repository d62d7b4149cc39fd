//! Zotero Web API (v3) write client.
//!
//! Item creation is not idempotent, so unlike the Crossref client there is
//! no retry middleware here.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{handle_response, transport_error};
use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::LibraryType;

/// Outcome of one Zotero write request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Number of items created.
    pub successful: usize,
    /// Number of items Zotero reported as unchanged.
    pub unchanged: usize,
    /// `"<index>: <message>"` for every rejected item.
    pub failed: Vec<String>,
}

impl WriteReport {
    /// Parse Zotero's multi-object write response.
    #[must_use]
    pub fn from_response(body: &Value) -> Self {
        let count = |key: &str| body.get(key).and_then(Value::as_object).map_or(0, |m| m.len());

        let failed = body
            .get("failed")
            .and_then(Value::as_object)
            .map(|failed| {
                failed
                    .iter()
                    .map(|(index, detail)| {
                        let message = detail
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown error");
                        format!("{index}: {message}")
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { successful: count("successful"), unchanged: count("unchanged"), failed }
    }

    /// Fold another batch's report into this one.
    pub fn merge(&mut self, other: Self) {
        self.successful += other.successful;
        self.unchanged += other.unchanged;
        self.failed.extend(other.failed);
    }
}

/// Zotero API client.
#[derive(Clone)]
pub struct ZoteroClient {
    client: Client,
    base_url: Url,
    request_timeout: Duration,
}

impl ZoteroClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.zotero_api_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Zotero API URL cannot be a base: {base_url}");
        }

        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { client, base_url, request_timeout: config.request_timeout })
    }

    fn items_url(&self, library_type: LibraryType, library_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend([library_type.path_segment(), library_id, "items"]);
        }
        url
    }

    /// Create items, at most [`api::ZOTERO_WRITE_BATCH`] per request.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status. Items
    /// Zotero rejects individually are reported in [`WriteReport::failed`].
    pub async fn add_items(
        &self,
        library_type: LibraryType,
        library_id: &str,
        api_key: &str,
        items: &[Value],
    ) -> ClientResult<WriteReport> {
        let url = self.items_url(library_type, library_id);
        let mut report = WriteReport::default();

        for batch in items.chunks(api::ZOTERO_WRITE_BATCH) {
            let response = self
                .client
                .post(url.clone())
                .header("Zotero-API-Key", api_key)
                .header("Zotero-API-Version", api::ZOTERO_API_VERSION)
                .json(batch)
                .send()
                .await
                .map_err(|e| transport_error(e, self.request_timeout))?;

            let response = handle_response(response).await?;
            let text =
                response.text().await.map_err(|e| transport_error(e, self.request_timeout))?;
            let body: Value = serde_json::from_str(&text)?;

            if !body.is_object() {
                return Err(ClientError::Malformed(format!("unexpected write response: {body}")));
            }
            report.merge(WriteReport::from_response(&body));
        }

        Ok(report)
    }
}

impl std::fmt::Debug for ZoteroClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoteroClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_report_parsing() {
        let report = WriteReport::from_response(&json!({
            "successful": {"0": {"key": "ABC"}},
            "success": {"0": "ABC"},
            "unchanged": {},
            "failed": {"1": {"code": 400, "message": "Invalid field"}}
        }));
        assert_eq!(report.successful, 1);
        assert_eq!(report.unchanged, 0);
        assert_eq!(report.failed, vec!["1: Invalid field".to_string()]);
    }

    #[test]
    fn test_items_url() {
        let client = ZoteroClient::new(&Config::for_testing("http://localhost:9")).unwrap();
        assert_eq!(
            client.items_url(LibraryType::Group, "42").as_str(),
            "http://localhost:9/groups/42/items"
        );
    }
}
