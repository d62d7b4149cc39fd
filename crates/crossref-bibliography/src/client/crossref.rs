//! Crossref REST API client.

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use url::Url;

use super::{WorksApi, handle_response, transport_error};
use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};

/// Crossref API client.
#[derive(Clone)]
pub struct CrossrefClient {
    /// HTTP client with retry middleware.
    client: ClientWithMiddleware,

    /// API base URL.
    base_url: Url,

    /// Request timeout, reported on timeouts.
    request_timeout: Duration,
}

impl CrossrefClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.crossref_api_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Crossref API URL cannot be a base: {base_url}");
        }

        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(10))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, base_url, request_timeout: config.request_timeout })
    }

    /// Build an endpoint URL from path segments; `/` inside a segment is kept
    /// as a separator so DOIs map onto Crossref's path layout.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/'));
            }
        }
        url
    }

    /// Make a GET request.
    async fn get(&self, url: Url, params: &[(&str, String)]) -> ClientResult<reqwest::Response> {
        let response = self.client.get(url).query(params).send().await.map_err(|e| match e {
            reqwest_middleware::Error::Reqwest(e) => transport_error(e, self.request_timeout),
            other => ClientError::Middleware(other),
        })?;

        handle_response(response).await
    }
}

#[async_trait::async_trait]
impl WorksApi for CrossrefClient {
    async fn search_works(&self, query: &str, rows: u32) -> ClientResult<Vec<serde_json::Value>> {
        let url = self.endpoint(["works"]);
        let params = [
            ("rows", rows.to_string()),
            ("sort", "relevance".to_string()),
            ("query", query.to_string()),
            ("select", fields::SEARCH.join(",")),
        ];

        let response = self.get(url, &params).await?;
        let text = response.text().await.map_err(|e| transport_error(e, self.request_timeout))?;
        let body: serde_json::Value = serde_json::from_str(&text)?;

        match body.pointer("/message/items") {
            Some(serde_json::Value::Array(items)) => Ok(items.clone()),
            _ => Err(ClientError::Malformed(format!("no message.items in response: {body}"))),
        }
    }

    async fn transform_bibtex(&self, doi: &str) -> ClientResult<String> {
        let url = self.endpoint(["works", doi, "transform/application/x-bibtex"]);

        let response = self.get(url, &[]).await?;
        let text = response.text().await.map_err(|e| transport_error(e, self.request_timeout))?;

        if text.trim().is_empty() {
            return Err(ClientError::Malformed(format!("empty BibTeX for {doi}")));
        }
        Ok(text)
    }
}

impl std::fmt::Debug for CrossrefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_doi_slashes() {
        let client = CrossrefClient::new(&Config::for_testing("http://localhost:9")).unwrap();
        let url = client.endpoint(["works", "10.1000/a b#c", "transform/application/x-bibtex"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:9/works/10.1000/a%20b%23c/transform/application/x-bibtex"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = Config::for_testing("http://localhost:9");
        config.crossref_api_url = "not a url".to_string();
        assert!(CrossrefClient::new(&config).is_err());
    }
}
