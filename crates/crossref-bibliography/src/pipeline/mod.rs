//! Request pipeline: lookup, citation normalization and Zotero forwarding.
//!
//! Every operation here is total. Failures come back as
//! [`Outcome::Diagnostic`] elements or as a message string.

pub mod forward;
pub mod lookup;
pub mod normalize;

use std::sync::Arc;

use crate::client::{WorksApi, ZoteroClient};
use crate::models::{Citation, MetadataRecord, Outcome};

/// Shared per-process handles for request handlers.
#[derive(Clone)]
pub struct PipelineContext {
    /// Crossref operations.
    pub works: Arc<dyn WorksApi>,

    /// Zotero writer.
    pub zotero: ZoteroClient,

    /// Lookup cap.
    pub rows: u32,
}

impl PipelineContext {
    /// Create a new pipeline context.
    #[must_use]
    pub fn new(works: Arc<dyn WorksApi>, zotero: ZoteroClient, rows: u32) -> Self {
        Self { works, zotero, rows }
    }

    /// Free-text query to metadata records.
    pub async fn records(&self, query: &str) -> Vec<Outcome<MetadataRecord>> {
        lookup::lookup(self.works.as_ref(), query, self.rows).await
    }

    /// Free-text query to DOIs.
    pub async fn dois(&self, query: &str) -> Vec<Outcome<String>> {
        normalize::dois(self.records(query).await)
    }

    /// Free-text query to citations.
    pub async fn citations(&self, query: &str) -> Vec<Outcome<Citation>> {
        let records = self.records(query).await;
        normalize::normalize(self.works.as_ref(), records).await
    }

    /// Forward a BibTeX blob into Zotero; returns the status message.
    pub async fn forward(&self, body: &serde_json::Value) -> String {
        forward::forward(&self.zotero, body).await
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext").field("rows", &self.rows).finish()
    }
}
