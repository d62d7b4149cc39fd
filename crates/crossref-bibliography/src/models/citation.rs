//! Citation entries in the fixed BibTeX field shape.

use serde::{Deserialize, Serialize};

use super::MetadataRecord;

/// Normalized citation, serialized with the conventional `ENTRYTYPE`/`ID` keys.
///
/// No field is guaranteed non-empty; missing upstream data is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationEntry {
    /// BibTeX entry type (`article`, `book`, ...).
    #[serde(rename = "ENTRYTYPE")]
    pub entry_type: String,

    /// Citation key; the DOI when one is known.
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(default)]
    pub publisher: String,

    /// Four-digit year, or empty.
    #[serde(default)]
    pub year: String,

    #[serde(default)]
    pub doi: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub journal: String,

    /// Authors joined with `" and "`.
    #[serde(default)]
    pub author: String,
}

impl CitationEntry {
    /// Map a metadata record field by field. Never fails.
    #[must_use]
    pub fn from_record(record: &MetadataRecord) -> Self {
        let doi = record.doi().unwrap_or_default().to_string();
        Self {
            entry_type: bibtex_entry_type(record.work_type.as_deref().unwrap_or_default())
                .to_string(),
            id: doi.clone(),
            publisher: record.publisher.clone().unwrap_or_default(),
            year: record.year().map(|y| y.to_string()).unwrap_or_default(),
            doi,
            title: record.title().unwrap_or_default().to_string(),
            journal: record.journal().unwrap_or_default().to_string(),
            author: record.author_names(),
        }
    }

    /// The non-empty fields in BibTeX output order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("author", self.author.as_str()),
            ("title", self.title.as_str()),
            ("journal", self.journal.as_str()),
            ("publisher", self.publisher.as_str()),
            ("year", self.year.as_str()),
            ("doi", self.doi.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

/// Map a Crossref work type onto a BibTeX entry type.
#[must_use]
pub fn bibtex_entry_type(crossref_type: &str) -> &'static str {
    match crossref_type {
        "journal-article" | "journal-issue" => "article",
        "book" | "monograph" | "edited-book" | "reference-book" | "book-set" => "book",
        "book-chapter" | "book-section" | "book-part" | "reference-entry" => "incollection",
        "proceedings-article" => "inproceedings",
        "proceedings" => "proceedings",
        "dissertation" => "phdthesis",
        "report" | "report-series" => "techreport",
        _ => "misc",
    }
}

/// Where a citation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationSource {
    /// Crossref's own BibTeX transform.
    CrossrefTransform,
    /// Manual mapping from the search record.
    FieldMapping,
}

/// A citation entry together with its BibTeX serialization.
///
/// The `bibtex` text is what gets forwarded to a reference manager; the
/// forwarding step parses it again rather than reusing `entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(flatten)]
    pub entry: CitationEntry,

    pub bibtex: String,

    pub source: CitationSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> MetadataRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_record_full() {
        let entry = CitationEntry::from_record(&record(json!({
            "DOI": "10.1000/abc",
            "type": "journal-article",
            "title": ["On Things"],
            "publisher": "Elsevier",
            "short-container-title": ["J. Things"],
            "created": {"date-parts": [[2021, 3]]},
            "author": [{"given": "A", "family": "B"}, {"given": "C", "family": "D"}]
        })));

        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.id, "10.1000/abc");
        assert_eq!(entry.doi, "10.1000/abc");
        assert_eq!(entry.year, "2021");
        assert_eq!(entry.title, "On Things");
        assert_eq!(entry.journal, "J. Things");
        assert_eq!(entry.publisher, "Elsevier");
        assert_eq!(entry.author, "A B and C D");
    }

    #[test]
    fn test_from_record_missing_doi_and_date() {
        let entry = CitationEntry::from_record(&record(json!({"title": ["Orphan"]})));
        assert_eq!(entry.id, "");
        assert_eq!(entry.doi, "");
        assert_eq!(entry.year, "");
        assert_eq!(entry.entry_type, "misc");
        assert_eq!(entry.title, "Orphan");
    }

    #[test]
    fn test_serialized_keys() {
        let value = serde_json::to_value(CitationEntry::default()).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["ENTRYTYPE", "ID", "publisher", "year", "doi", "title", "journal", "author"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_fields_skip_empty() {
        let entry = CitationEntry { title: "T".into(), year: "2000".into(), ..Default::default() };
        assert_eq!(entry.fields(), vec![("title", "T"), ("year", "2000")]);
    }

    #[test]
    fn test_entry_type_mapping() {
        assert_eq!(bibtex_entry_type("book-chapter"), "incollection");
        assert_eq!(bibtex_entry_type("proceedings-article"), "inproceedings");
        assert_eq!(bibtex_entry_type("posted-content"), "misc");
        assert_eq!(bibtex_entry_type(""), "misc");
    }
}
