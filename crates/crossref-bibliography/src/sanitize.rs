//! Lossy Latin-1 text sanitization.
//!
//! Text leaving the pipeline (responses, BibTeX, logs) is restricted to the
//! characters ISO-8859-1 can represent, U+0000 through U+00FF. Anything else
//! is dropped, not transliterated: "Schrödinger" survives, "量子" vanishes.
//! This loss is the accepted degradation for downstream reference managers
//! and transports that cannot carry arbitrary text.
//!
//! Sanitizing is idempotent.

use std::borrow::Cow;

use serde_json::Value;

use crate::models::{
    Citation, CitationEntry, Contributor, CrossrefDate, MetadataRecord, OneOrMany, Outcome,
};

/// Highest code point kept.
const LATIN1_MAX: char = '\u{FF}';

/// Whether `c` survives sanitization.
#[must_use]
pub const fn is_representable(c: char) -> bool {
    c <= LATIN1_MAX
}

/// Drop every character outside Latin-1. Borrows when nothing is dropped.
#[must_use]
pub fn sanitize_str(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_representable) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| is_representable(c)).collect())
    }
}

/// Recursively sanitize strings in a JSON value.
///
/// Object values and array elements are visited; object keys and non-string
/// scalars are left alone.
#[must_use]
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.sanitize()),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, sanitize_value(v))).collect())
        }
        other => other,
    }
}

/// Types whose text content can be sanitized.
pub trait Sanitize {
    /// Return `self` with all text restricted to Latin-1.
    #[must_use]
    fn sanitize(self) -> Self;
}

impl Sanitize for String {
    fn sanitize(self) -> Self {
        match sanitize_str(&self) {
            Cow::Borrowed(_) => self,
            Cow::Owned(clean) => clean,
        }
    }
}

impl Sanitize for Value {
    fn sanitize(self) -> Self {
        sanitize_value(self)
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(self) -> Self {
        self.map(Sanitize::sanitize)
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(self) -> Self {
        self.into_iter().map(Sanitize::sanitize).collect()
    }
}

impl Sanitize for serde_json::Map<String, Value> {
    fn sanitize(self) -> Self {
        self.into_iter().map(|(k, v)| (k, sanitize_value(v))).collect()
    }
}

impl<T: Sanitize> Sanitize for Outcome<T> {
    fn sanitize(self) -> Self {
        match self {
            Self::Item(item) => Self::Item(item.sanitize()),
            Self::Diagnostic(message) => Self::Diagnostic(message.sanitize()),
        }
    }
}

impl Sanitize for OneOrMany {
    fn sanitize(self) -> Self {
        match self {
            Self::One(s) => Self::One(s.sanitize()),
            Self::Many(v) => Self::Many(v.sanitize()),
        }
    }
}

impl Sanitize for Contributor {
    fn sanitize(self) -> Self {
        Self {
            given: self.given.sanitize(),
            family: self.family.sanitize(),
            name: self.name.sanitize(),
            extra: self.extra.sanitize(),
        }
    }
}

impl Sanitize for CrossrefDate {
    fn sanitize(self) -> Self {
        Self { date_parts: self.date_parts, extra: self.extra.sanitize() }
    }
}

impl Sanitize for MetadataRecord {
    fn sanitize(self) -> Self {
        Self {
            doi: self.doi.sanitize(),
            work_type: self.work_type.sanitize(),
            title: self.title.sanitize(),
            subtitle: self.subtitle.sanitize(),
            publisher: self.publisher.sanitize(),
            short_container_title: self.short_container_title.sanitize(),
            container_title: self.container_title.sanitize(),
            isbn: self.isbn.sanitize(),
            issn: self.issn.sanitize(),
            url: self.url.sanitize(),
            created: self.created.sanitize(),
            author: self.author.sanitize(),
            score: self.score,
            extra: self.extra.sanitize(),
        }
    }
}

impl Sanitize for CitationEntry {
    fn sanitize(self) -> Self {
        Self {
            entry_type: self.entry_type.sanitize(),
            id: self.id.sanitize(),
            publisher: self.publisher.sanitize(),
            year: self.year.sanitize(),
            doi: self.doi.sanitize(),
            title: self.title.sanitize(),
            journal: self.journal.sanitize(),
            author: self.author.sanitize(),
        }
    }
}

impl Sanitize for Citation {
    fn sanitize(self) -> Self {
        Self { entry: self.entry.sanitize(), bibtex: self.bibtex.sanitize(), source: self.source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latin1_kept() {
        assert_eq!(sanitize_str("Schrödinger's café"), "Schrödinger's café");
        assert!(matches!(sanitize_str("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_non_latin1_dropped() {
        assert_eq!(sanitize_str("量子 computing – now"), " computing  now");
        assert_eq!(sanitize_str("α-helix 🧬"), "-helix ");
    }

    #[test]
    fn test_value_recursive() {
        let value = json!({
            "title": ["Über ∑ sums"],
            "score": 1.5,
            "nested": {"name": "Łukasz"},
            "flag": true,
            "none": null
        });
        assert_eq!(
            sanitize_value(value),
            json!({
                "title": ["Über  sums"],
                "score": 1.5,
                "nested": {"name": "ukasz"},
                "flag": true,
                "none": null
            })
        );
    }

    #[test]
    fn test_keys_untouched() {
        let value = json!({"ключ": "значение"});
        assert_eq!(sanitize_value(value), json!({"ключ": ""}));
    }

    #[test]
    fn test_outcome_and_entry() {
        let entry = CitationEntry { title: "Ωmega".into(), ..Default::default() };
        let out = Outcome::Item(entry).sanitize();
        assert_eq!(out.as_item().unwrap().title, "mega");

        let diag: Outcome<CitationEntry> = Outcome::diagnostic("fail → here");
        assert_eq!(diag.sanitize().as_diagnostic(), Some("fail  here"));
    }
}
