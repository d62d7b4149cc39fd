//! Data models for Crossref records, citations and request payloads.
//!
//! Upstream models use `#[serde(default)]` plus a lenient per-field decoder so
//! partial or odd Crossref metadata never fails a whole record.

mod citation;
mod inputs;
mod outcome;
mod record;

pub use citation::{Citation, CitationEntry, CitationSource, bibtex_entry_type};
pub use inputs::{ForwardRequest, LibraryType, SearchQuery};
pub use outcome::Outcome;
pub use record::{Contributor, CrossrefDate, MetadataRecord, OneOrMany};
