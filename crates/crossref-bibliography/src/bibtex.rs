//! BibTeX text codec.
//!
//! Writing is hand-formatted, one field per line; reading goes through
//! `biblatex`, so whatever a caller sends back for forwarding is parsed by a
//! real BibTeX grammar instead of being trusted.

use std::collections::BTreeMap;

use biblatex::{Bibliography, Chunk, Entry, Spanned};

use crate::error::BibtexError;
use crate::models::CitationEntry;

/// One parsed BibTeX entry with plain-text field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibEntry {
    /// Citation key.
    pub key: String,
    /// Lower-case entry type.
    pub entry_type: String,
    /// Lower-case field name to flattened value.
    pub fields: BTreeMap<String, String>,
    /// `(given, family)` pairs from the author field.
    pub authors: Vec<(String, String)>,
}

impl BibEntry {
    /// Field value, if present and non-blank.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Publication year from `year`, else the leading digits of `date`.
    #[must_use]
    pub fn year(&self) -> Option<&str> {
        self.field("year").or_else(|| {
            let date = self.field("date")?;
            date.get(..4).filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        })
    }

    /// Authors as `"given family and given family"`.
    #[must_use]
    pub fn author_names(&self) -> String {
        if self.authors.is_empty() {
            return self.field("author").unwrap_or_default().to_string();
        }
        self.authors
            .iter()
            .map(|(given, family)| format!("{given} {family}").trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// Project onto the fixed citation entry shape.
    #[must_use]
    pub fn to_citation_entry(&self) -> CitationEntry {
        let text = |name: &str| self.field(name).unwrap_or_default().to_string();
        CitationEntry {
            entry_type: self.entry_type.clone(),
            id: self.key.clone(),
            publisher: text("publisher"),
            year: self.year().unwrap_or_default().to_string(),
            doi: text("doi"),
            title: text("title"),
            journal: self
                .field("journal")
                .or_else(|| self.field("journaltitle"))
                .unwrap_or_default()
                .to_string(),
            author: self.author_names(),
        }
    }
}

/// Parse BibTeX text into its entries, in source order.
pub fn parse(text: &str) -> Result<Vec<BibEntry>, BibtexError> {
    let bibliography =
        Bibliography::parse(text).map_err(|e| BibtexError::ParseFailed(e.to_string()))?;

    let entries: Vec<BibEntry> = bibliography.iter().map(bib_entry).collect();
    if entries.is_empty() {
        return Err(BibtexError::NoEntries);
    }
    Ok(entries)
}

/// Parse BibTeX text into entries keyed by citation key.
///
/// A repeated key keeps the last entry.
pub fn parse_keyed(text: &str) -> Result<BTreeMap<String, BibEntry>, BibtexError> {
    Ok(parse(text)?.into_iter().map(|e| (e.key.clone(), e)).collect())
}

fn bib_entry(entry: &Entry) -> BibEntry {
    let fields = entry
        .fields
        .iter()
        .map(|(name, chunks)| (name.to_lowercase(), flatten_chunks(chunks)))
        .collect();

    let authors = entry
        .author()
        .map(|people| {
            people
                .into_iter()
                .map(|p| {
                    let family = if p.prefix.is_empty() {
                        p.name
                    } else {
                        format!("{} {}", p.prefix, p.name)
                    };
                    (p.given_name, family)
                })
                .collect()
        })
        .unwrap_or_default();

    BibEntry {
        key: entry.key.clone(),
        entry_type: entry.entry_type.to_string().to_lowercase(),
        fields,
        authors,
    }
}

fn flatten_chunks(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|spanned| match &spanned.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) | Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

/// Serialize a citation entry as a BibTeX record.
#[must_use]
pub fn write_entry(entry: &CitationEntry) -> String {
    let entry_type = if entry.entry_type.is_empty() { "misc" } else { entry.entry_type.as_str() };

    let mut output = format!("@{entry_type}{{{},\n", citation_key(entry));
    let fields = entry.fields();
    for (i, (name, value)) in fields.iter().enumerate() {
        let sep = if i + 1 == fields.len() { "" } else { "," };
        output.push_str(&format!(" {name} = {{{}}}{sep}\n", balanced(value)));
    }
    output.push_str("}\n");
    output
}

/// Citation key for the text form: the ID with characters BibTeX keys cannot
/// hold replaced, or a key derived from author and year when there is no ID.
#[must_use]
pub fn citation_key(entry: &CitationEntry) -> String {
    let raw = if entry.id.trim().is_empty() {
        let surname = entry
            .author
            .split(" and ")
            .next()
            .and_then(|first| first.split_whitespace().last())
            .unwrap_or("anonymous");
        format!("{surname}{}", entry.year)
    } else {
        entry.id.trim().to_string()
    };

    raw.chars()
        .map(|c| {
            if c.is_whitespace()
                || matches!(c, ',' | '{' | '}' | '(' | ')' | '"' | '\'' | '#' | '%' | '=' | '\\' | '~')
            {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Drop braces from values whose braces do not balance.
fn balanced(value: &str) -> String {
    let mut depth: i64 = 0;
    for c in value.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        value.to_string()
    } else {
        value.chars().filter(|c| !matches!(c, '{' | '}')).collect()
    }
}
