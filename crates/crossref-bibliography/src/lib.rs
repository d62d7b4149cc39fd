//! Crossref Bibliography
//!
//! An HTTP service that turns a free-text description of a scholarly work
//! into Crossref metadata, DOIs, or BibTeX citations, and adds BibTeX to a
//! Zotero collection.
//!
//! # Pipeline
//!
//! - **Lookup**: free text to up to `rows` Crossref metadata records
//! - **Normalize**: records to citations, via Crossref's BibTeX transform
//!   with a field-mapping fallback
//! - **Forward**: a BibTeX blob to Zotero items in one collection
//!
//! Operations never fail outright: per-item problems come back as
//! [`Outcome::Diagnostic`] entries in the result list.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use crossref_bibliography::{Config, CrossrefClient, PipelineContext, ZoteroClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let crossref = CrossrefClient::new(&config)?;
//!     let zotero = ZoteroClient::new(&config)?;
//!     let ctx = PipelineContext::new(Arc::new(crossref), zotero, config.rows);
//!
//!     for citation in ctx.citations("quantum supremacy sycamore").await {
//!         println!("{citation:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod bibtex;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sanitize;
pub mod server;

pub use client::{CrossrefClient, WorksApi, ZoteroClient};
pub use config::Config;
pub use error::{BibtexError, ClientError, ForwardError};
pub use models::{Citation, MetadataRecord, Outcome};
pub use pipeline::PipelineContext;
