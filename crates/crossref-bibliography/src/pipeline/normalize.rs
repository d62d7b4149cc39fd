//! Metadata records to BibTeX citations.
//!
//! Each record first tries Crossref's own BibTeX transform for its DOI. Any
//! failure there (no DOI, malformed DOI, network, status, unparsable text)
//! drops to [`fallback`], a field-by-field mapping that cannot fail.

use std::sync::LazyLock;

use futures::stream::{self, StreamExt};
use regex::Regex;

use crate::bibtex;
use crate::client::WorksApi;
use crate::config::api;
use crate::models::{Citation, CitationEntry, CitationSource, MetadataRecord, Outcome};
use crate::sanitize::sanitize_str;

/// `10.<registrant>/<suffix>`, per the DOI handbook.
static DOI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}(\.\d+)*/\S+$").expect("valid DOI regex"));

/// Whether `doi` is shaped like a DOI.
#[must_use]
pub fn is_valid_doi(doi: &str) -> bool {
    DOI_PATTERN.is_match(doi)
}

/// Convert every record; diagnostics pass through in place.
///
/// The output has one element per input element, in the same order. At most
/// [`api::TRANSFORM_CONCURRENCY`] transform requests run at once.
pub async fn normalize(
    works: &dyn WorksApi,
    records: Vec<Outcome<MetadataRecord>>,
) -> Vec<Outcome<Citation>> {
    stream::iter(records)
        .map(|outcome| async move {
            match outcome {
                Outcome::Item(record) => Outcome::Item(convert(works, &record).await),
                Outcome::Diagnostic(message) => Outcome::Diagnostic(message),
            }
        })
        .buffered(api::TRANSFORM_CONCURRENCY)
        .collect()
        .await
}

/// Convert one record: transform first, mapping on any failure.
pub async fn convert(api: &dyn WorksApi, record: &MetadataRecord) -> Citation {
    let Some(doi) = record.doi() else {
        tracing::debug!("Record has no DOI, using field mapping");
        return fallback(record);
    };

    if !is_valid_doi(doi) {
        tracing::debug!(doi = %sanitize_str(doi), "Malformed DOI, using field mapping");
        return fallback(record);
    }

    match primary(api, doi).await {
        Ok(citation) => citation,
        Err(reason) => {
            tracing::warn!(
                doi = %sanitize_str(doi),
                reason = %sanitize_str(&reason),
                "BibTeX transform failed, using field mapping"
            );
            fallback(record)
        }
    }
}

async fn primary(api: &dyn WorksApi, doi: &str) -> Result<Citation, String> {
    let text = api.transform_bibtex(doi).await.map_err(|e| e.to_string())?;
    let parsed = bibtex::parse(&text).map_err(|e| e.to_string())?;
    let first = parsed.first().ok_or("transform returned no entries")?;

    Ok(Citation {
        entry: first.to_citation_entry(),
        bibtex: text.trim().to_string(),
        source: CitationSource::CrossrefTransform,
    })
}

/// Field-by-field mapping of a record into a citation.
#[must_use]
pub fn fallback(record: &MetadataRecord) -> Citation {
    let entry = CitationEntry::from_record(record);
    let bibtex = bibtex::write_entry(&entry);
    Citation { entry, bibtex, source: CitationSource::FieldMapping }
}

/// The DOI of every record; records without one become diagnostics.
#[must_use]
pub fn dois(records: Vec<Outcome<MetadataRecord>>) -> Vec<Outcome<String>> {
    records
        .into_iter()
        .map(|outcome| match outcome {
            Outcome::Item(record) => match record.doi() {
                Some(doi) => Outcome::Item(doi.to_string()),
                None => Outcome::diagnostic(format!(
                    "Warning: record has no DOI (title: {})",
                    record.title().unwrap_or("unknown")
                )),
            },
            Outcome::Diagnostic(message) => Outcome::Diagnostic(message),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::{ClientError, ClientResult};
    use serde_json::json;

    #[test]
    fn test_doi_validation() {
        assert!(is_valid_doi("10.1038/s41586-019-1666-5"));
        assert!(is_valid_doi("10.1002/(SICI)1097-4636(199706)35:4<455::AID-JBM5>3.0.CO;2-F"));
        assert!(is_valid_doi("10.1000.10/abc"));
        assert!(!is_valid_doi("doi:10.1038/x"));
        assert!(!is_valid_doi("10.12/too-short-prefix"));
        assert!(!is_valid_doi("10.1038/"));
        assert!(!is_valid_doi("10.1038/has space"));
    }

    #[test]
    fn test_fallback_shape() {
        let record: MetadataRecord = serde_json::from_value(json!({
            "DOI": "10.1000/xyz",
            "type": "book",
            "title": ["A Book"],
            "created": {"date-parts": [[1999]]}
        }))
        .unwrap();

        let citation = fallback(&record);
        assert_eq!(citation.source, CitationSource::FieldMapping);
        assert_eq!(citation.entry.entry_type, "book");
        assert_eq!(citation.entry.year, "1999");
        assert!(citation.bibtex.starts_with("@book{10.1000/xyz,"));
    }

    #[test]
    fn test_dois_marks_missing() {
        let with: MetadataRecord = serde_json::from_value(json!({"DOI": "10.1000/a"})).unwrap();
        let without: MetadataRecord = serde_json::from_value(json!({"title": "T"})).unwrap();
        let out = dois(vec![
            Outcome::Item(with),
            Outcome::Item(without),
            Outcome::diagnostic("upstream"),
        ]);
        assert_eq!(out[0], Outcome::Item("10.1000/a".to_string()));
        assert!(out[1].as_diagnostic().unwrap().contains("title: T"));
        assert_eq!(out[2], Outcome::diagnostic("upstream"));
    }

    /// Counts transform calls in flight and always fails, so every record
    /// takes the field-mapping path.
    #[derive(Default)]
    struct SlowWorks {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl WorksApi for SlowWorks {
        async fn search_works(&self, _query: &str, _rows: u32) -> ClientResult<Vec<serde_json::Value>> {
            Ok(Vec::new())
        }

        async fn transform_bibtex(&self, doi: &str) -> ClientResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Err(ClientError::not_found(doi))
        }
    }

    #[tokio::test]
    async fn test_normalize_caps_transforms_in_flight() {
        let works = SlowWorks::default();
        let total = api::TRANSFORM_CONCURRENCY * 3;
        let records: Vec<_> = (0..total)
            .map(|i| {
                let record: MetadataRecord =
                    serde_json::from_value(json!({"DOI": format!("10.1000/r{i}")})).unwrap();
                Outcome::Item(record)
            })
            .collect();

        let out = normalize(&works, records).await;

        assert_eq!(out.len(), total);
        for (i, outcome) in out.iter().enumerate() {
            let Outcome::Item(citation) = outcome else {
                panic!("expected citation at {i}: {outcome:?}");
            };
            assert_eq!(citation.entry.id, format!("10.1000/r{i}"));
        }
        let peak = works.peak.load(Ordering::SeqCst);
        assert!(peak <= api::TRANSFORM_CONCURRENCY, "peak {peak}");
        assert!(peak > 1, "transforms never overlapped");
    }
}
