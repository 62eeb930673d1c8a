//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

use refm::Record;

/// The record used by the end-to-end scenarios.
pub fn simple_record() -> Record {
    Record {
        author: "A B".to_string(),
        title: "T".to_string(),
        year: "2020".to_string(),
        journal: "J".to_string(),
        publisher: "P".to_string(),
    }
}

/// Build a Crossref works response with a single author and the given fields.
///
/// The year is sent as a JSON number, as Crossref does.
pub fn crossref_body(title: &str, given: &str, family: &str, year: i64) -> String {
    format!(
        r#"{{"status": "ok", "message-type": "work", "message": {{"title": ["{}"], "author": [{{"given": "{}", "family": "{}", "sequence": "first"}}], "issued": {{"date-parts": [[{}, 1, 1]]}}, "container-title": ["J"], "publisher": "P"}}}}"#,
        title, given, family, year
    )
}
