//! Inbound request payloads.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ForwardError, ForwardResult};

/// Query string of the search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Free-text search term.
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Which kind of Zotero library a forward targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryType {
    User,
    Group,
}

impl LibraryType {
    /// Parse the `user` request field; anything but `group(s)` is a user library.
    #[must_use]
    pub fn from_field(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "group" | "groups" => Self::Group,
            _ => Self::User,
        }
    }

    /// Zotero API path prefix.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Group => "groups",
        }
    }
}

/// Body of a forward-to-Zotero request.
#[derive(Clone)]
pub struct ForwardRequest {
    pub api_key: String,
    pub library_id: String,
    pub collection_id: String,
    pub bibtex: String,
    pub library_type: LibraryType,
}

impl ForwardRequest {
    /// Required fields, checked in this order.
    pub const REQUIRED: [&'static str; 5] = ["api_key", "library_id", "collection_id", "bibtex", "user"];

    /// Extract the request from an arbitrary JSON body.
    ///
    /// Reports the first required field that is absent, null, or not a
    /// string (numeric ids are accepted).
    pub fn from_json(body: &Value) -> ForwardResult<Self> {
        let field = |name: &'static str| -> ForwardResult<String> {
            match body.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(Value::Number(n)) => Ok(n.to_string()),
                _ => Err(ForwardError::MissingParameter(name)),
            }
        };

        let [api_key, library_id, collection_id, bibtex, user] = Self::REQUIRED;

        Ok(Self {
            api_key: field(api_key)?,
            library_id: field(library_id)?,
            collection_id: field(collection_id)?,
            bibtex: field(bibtex)?,
            library_type: LibraryType::from_field(&field(user)?),
        })
    }
}

impl std::fmt::Debug for ForwardRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardRequest")
            .field("library_id", &self.library_id)
            .field("collection_id", &self.collection_id)
            .field("library_type", &self.library_type)
            .field("bibtex_len", &self.bibtex.len())
            .finish()
    }
}
