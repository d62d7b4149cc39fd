//! Crossref `works` item, decoded leniently.
//!
//! Crossref metadata varies a lot between record types and deposit vintages.
//! Every named field goes through [`lenient`]: when its upstream shape does
//! not match, the field becomes `None` and the rest of the record survives.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decode an optional field, turning any shape mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// A value Crossref sends either bare or wrapped in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// First value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s.as_str()),
            Self::Many(v) => v.first().map(String::as_str),
        }
    }
}

/// One author (or editor) of a work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Organisational authors only carry a name.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contributor {
    /// `"given family"`, trimmed; falls back to the organisational name.
    #[must_use]
    pub fn display_name(&self) -> String {
        let personal = format!(
            "{} {}",
            self.given.as_deref().unwrap_or(""),
            self.family.as_deref().unwrap_or("")
        );
        let personal = personal.trim();
        if personal.is_empty() {
            self.name.as_deref().unwrap_or("").trim().to_string()
        } else {
            personal.to_string()
        }
    }
}

/// Crossref date: `{"date-parts": [[year, month, day]], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossrefDate {
    #[serde(
        rename = "date-parts",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_parts: Option<Vec<Vec<Option<i64>>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CrossrefDate {
    /// Year component of the first date, if present.
    #[must_use]
    pub fn year(&self) -> Option<i64> {
        self.date_parts.as_ref()?.first()?.first().copied().flatten()
    }
}

/// One Crossref search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(rename = "DOI", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<OneOrMany>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<OneOrMany>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(
        rename = "short-container-title",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub short_container_title: Option<OneOrMany>,

    #[serde(
        rename = "container-title",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub container_title: Option<OneOrMany>,

    #[serde(rename = "ISBN", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<OneOrMany>,

    #[serde(rename = "ISSN", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub issn: Option<OneOrMany>,

    #[serde(rename = "URL", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created: Option<CrossrefDate>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Contributor>>,

    /// Relevance score reported by Crossref.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Fields this service does not interpret, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataRecord {
    /// The DOI, if present and non-blank.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// First title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_ref()?.first()
    }

    /// First short container (journal) title.
    #[must_use]
    pub fn journal(&self) -> Option<&str> {
        self.short_container_title.as_ref()?.first()
    }

    /// Creation year.
    #[must_use]
    pub fn year(&self) -> Option<i64> {
        self.created.as_ref()?.year()
    }

    /// Authors joined as `"given family and given family"`.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.author
            .iter()
            .flatten()
            .map(Contributor::display_name)
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(" and ")
    }
}
