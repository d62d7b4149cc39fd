//! Free-text query to Crossref metadata records.

use crate::client::WorksApi;
use crate::error::ClientError;
use crate::models::{MetadataRecord, Outcome};
use crate::sanitize::sanitize_str;

/// Diagnostic for a query with no hits.
#[must_use]
pub fn no_results_message(query: &str) -> String {
    format!("No results found for '{query}'")
}

/// Search Crossref and decode up to `rows` records, best first.
///
/// Never fails: an unreachable or failing upstream, or an empty hit list,
/// yields a single diagnostic; an item that is not a JSON object yields a
/// diagnostic in its own position.
pub async fn lookup(api: &dyn WorksApi, query: &str, rows: u32) -> Vec<Outcome<MetadataRecord>> {
    let query = query.trim();
    if query.is_empty() {
        return vec![Outcome::diagnostic(no_results_message(query))];
    }

    let items = match api.search_works(query, rows).await {
        Ok(items) => items,
        Err(err) => {
            let message = failure_message(&err);
            tracing::warn!(
                query = %sanitize_str(query),
                error = %sanitize_str(&message),
                retryable = err.is_retryable(),
                retry_after = ?err.retry_after(),
                "Crossref lookup failed"
            );
            return vec![Outcome::Diagnostic(message)];
        }
    };

    if items.is_empty() {
        tracing::info!(query = %sanitize_str(query), "Crossref returned no items");
        return vec![Outcome::diagnostic(no_results_message(query))];
    }

    let outcomes: Vec<_> = items
        .into_iter()
        .take(rows as usize)
        .map(|item| match serde_json::from_value::<MetadataRecord>(item.clone()) {
            Ok(record) => Outcome::Item(record),
            Err(err) => {
                tracing::debug!(error = %sanitize_str(&err.to_string()), "Undecodable Crossref item");
                Outcome::Diagnostic(format!("Failed to convert item={item}: {err}"))
            }
        })
        .collect();

    tracing::info!(
        query = %sanitize_str(query),
        records = outcomes.iter().filter(|o| o.is_item()).count(),
        "Crossref lookup complete"
    );
    outcomes
}

fn failure_message(err: &ClientError) -> String {
    if let Some(wait) = err.retry_after() {
        return format!(
            "Warning: Crossref rate limit reached, retry after {} seconds",
            wait.as_secs()
        );
    }
    match err {
        ClientError::Http(_) | ClientError::Middleware(_) | ClientError::Timeout(_) => {
            format!("Error contacting Crossref: {err}")
        }
        _ => format!("Warning: Fetching content failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let msg = failure_message(&ClientError::Timeout(std::time::Duration::from_secs(1)));
        assert!(msg.starts_with("Error contacting Crossref"));

        let msg = failure_message(&ClientError::rate_limited(7));
        assert_eq!(msg, "Warning: Crossref rate limit reached, retry after 7 seconds");

        let msg = failure_message(&ClientError::server(503, "maintenance"));
        assert!(msg.starts_with("Warning: Fetching content failed"));
        assert!(msg.contains("maintenance"));
    }

    #[test]
    fn test_no_results_message() {
        assert_eq!(no_results_message("xyz"), "No results found for 'xyz'");
    }
}
