//! Forward BibTeX into a Zotero collection.
//!
//! The BibTeX blob is parsed again here even when it came out of this
//! service: the text is the contract with the reference manager.

use serde_json::{Map, Value, json};

use crate::bibtex::{self, BibEntry};
use crate::client::{WriteReport, ZoteroClient};
use crate::error::{ForwardError, ForwardResult};
use crate::models::ForwardRequest;
use crate::sanitize::sanitize_str;

/// Message returned when every item was added.
pub const SUCCESS_MESSAGE: &str = "BibTex added to Zotero collection successfully!";

/// Run a forward request and describe the result. Never fails.
pub async fn forward(zotero: &ZoteroClient, body: &Value) -> String {
    match try_forward(zotero, body).await {
        Ok(report) => {
            tracing::info!(
                added = report.successful,
                unchanged = report.unchanged,
                "Forwarded to Zotero"
            );
            SUCCESS_MESSAGE.to_string()
        }
        Err(err) => {
            tracing::warn!(error = %sanitize_str(&err.to_string()), "Forward to Zotero failed");
            err.to_user_message()
        }
    }
}

/// Validate, parse, map and submit.
pub async fn try_forward(zotero: &ZoteroClient, body: &Value) -> ForwardResult<WriteReport> {
    let request = ForwardRequest::from_json(body)?;
    tracing::debug!(?request, "Forward request");

    let entries = bibtex::parse_keyed(&request.bibtex)?;
    let items: Vec<Value> =
        entries.values().map(|entry| zotero_item(entry, &request.collection_id)).collect();

    let report = zotero
        .add_items(request.library_type, &request.library_id, &request.api_key, &items)
        .await?;

    if report.failed.is_empty() {
        Ok(report)
    } else {
        let reasons = report.failed.join("; ");
        Err(ForwardError::Rejected { count: report.failed.len(), reasons })
    }
}

type Renames = &'static [(&'static str, &'static str)];

const JOURNAL_ARTICLE: Renames = &[
    ("journal", "publicationTitle"),
    ("journaltitle", "publicationTitle"),
    ("volume", "volume"),
    ("number", "issue"),
    ("pages", "pages"),
    ("doi", "DOI"),
    ("issn", "ISSN"),
];

const BOOK: Renames = &[
    ("publisher", "publisher"),
    ("address", "place"),
    ("edition", "edition"),
    ("volume", "volume"),
    ("isbn", "ISBN"),
];

const BOOK_SECTION: Renames = &[
    ("booktitle", "bookTitle"),
    ("publisher", "publisher"),
    ("pages", "pages"),
    ("isbn", "ISBN"),
];

const CONFERENCE_PAPER: Renames = &[
    ("booktitle", "proceedingsTitle"),
    ("publisher", "publisher"),
    ("pages", "pages"),
    ("doi", "DOI"),
    ("isbn", "ISBN"),
];

const THESIS: Renames = &[("school", "university"), ("institution", "university")];

const REPORT: Renames = &[("institution", "institution"), ("number", "reportNumber")];

const DOCUMENT: Renames = &[("publisher", "publisher")];

/// Zotero item type and the BibTeX to Zotero field renames valid for it.
fn item_schema(entry_type: &str) -> (&'static str, Renames) {
    match entry_type {
        "article" => ("journalArticle", JOURNAL_ARTICLE),
        "book" | "proceedings" | "mvbook" => ("book", BOOK),
        "incollection" | "inbook" => ("bookSection", BOOK_SECTION),
        "inproceedings" | "conference" => ("conferencePaper", CONFERENCE_PAPER),
        "phdthesis" | "mastersthesis" | "thesis" => ("thesis", THESIS),
        "techreport" | "report" => ("report", REPORT),
        _ => ("document", DOCUMENT),
    }
}

/// Map one parsed entry onto a Zotero item in `collection_id`.
#[must_use]
pub fn zotero_item(entry: &BibEntry, collection_id: &str) -> Value {
    let (item_type, renames) = item_schema(&entry.entry_type);

    let mut item = Map::new();
    item.insert("itemType".into(), json!(item_type));
    item.insert("title".into(), json!(entry.field("title").unwrap_or_default()));
    item.insert("creators".into(), Value::Array(creators(entry)));

    if let Some(year) = entry.year() {
        item.insert("date".into(), json!(year));
    }
    if let Some(url) = entry.field("url") {
        item.insert("url".into(), json!(url));
    }

    for (bib_field, zotero_field) in renames {
        if let Some(value) = entry.field(bib_field) {
            item.entry(*zotero_field).or_insert_with(|| json!(value));
        }
    }

    match entry.entry_type.as_str() {
        "phdthesis" => {
            item.insert("thesisType".into(), json!("PhD thesis"));
        }
        "mastersthesis" => {
            item.insert("thesisType".into(), json!("Master's thesis"));
        }
        _ => {}
    }

    let mut extra = vec![format!("Citation Key: {}", entry.key)];
    if !item.contains_key("DOI") {
        if let Some(doi) = entry.field("doi") {
            extra.push(format!("DOI: {doi}"));
        }
    }
    item.insert("extra".into(), json!(extra.join("\n")));

    item.insert("collections".into(), json!([collection_id]));
    item.insert("tags".into(), json!([]));
    item.insert("relations".into(), json!({}));

    Value::Object(item)
}

fn creators(entry: &BibEntry) -> Vec<Value> {
    entry
        .authors
        .iter()
        .filter(|(given, family)| !given.is_empty() || !family.is_empty())
        .map(|(given, family)| {
            if given.is_empty() {
                json!({"creatorType": "author", "name": family})
            } else {
                json!({"creatorType": "author", "firstName": given, "lastName": family})
            }
        })
        .collect()
}
