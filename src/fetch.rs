//! Crossref metadata lookup.
//!
//! Resolves a DOI to a [`Record`] through the Crossref works API.
//! See: https://api.crossref.org/

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::{value_to_display, Record};

/// Public Crossref endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

const USER_AGENT: &str = concat!("refm/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when fetching metadata.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("DOI not found")]
    NotFound(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(reqwest::Error),
}

/// A source of bibliographic metadata addressed by DOI.
pub trait MetadataProvider {
    /// Looks up a DOI and returns the normalized record.
    fn fetch(&self, doi: &str) -> Result<Record, FetchError>;
}

/// Blocking client for the Crossref works API.
pub struct CrossrefClient {
    client: Client,
    base_url: String,
}

impl CrossrefClient {
    /// Create a client for the public Crossref endpoint
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client for an alternative endpoint (mirror or test server)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        // One blocking call per lookup: no request timeout, no retry
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn work_url(&self, doi: &str) -> String {
        format!("{}/works/{}", self.base_url.trim_end_matches('/'), doi)
    }
}

impl MetadataProvider for CrossrefClient {
    fn fetch(&self, doi: &str) -> Result<Record, FetchError> {
        let url = self.work_url(doi);
        debug!("Crossref lookup: {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!("Crossref lookup for {} returned {}", doi, status);
            return Err(FetchError::NotFound(doi.to_string()));
        }

        let body: Value = response.json().map_err(FetchError::Decode)?;
        let record = record_from_work(&body);
        debug!("Crossref lookup for {} resolved to '{}'", doi, record.title);
        Ok(record)
    }
}

/// Normalizes a Crossref work document into a [`Record`].
///
/// Accepts either the full API response (`{"message": {...}}`) or the bare
/// work object. Absent or malformed fields become empty strings.
pub fn record_from_work(document: &Value) -> Record {
    let work = match document.get("message") {
        Some(message) if message.is_object() => message,
        _ => document,
    };

    Record {
        title: first_entry(work.get("title")),
        author: join_authors(work.get("author")),
        year: work
            .pointer("/issued/date-parts/0/0")
            .map(value_to_display)
            .unwrap_or_default(),
        journal: first_entry(work.get("container-title")),
        publisher: work
            .get("publisher")
            .map(value_to_display)
            .unwrap_or_default(),
    }
}

// Crossref wraps most text fields in single-element lists.
fn first_entry(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items.first().map(value_to_display).unwrap_or_default(),
        Some(other) => value_to_display(other),
        None => String::new(),
    }
}

fn join_authors(value: Option<&Value>) -> String {
    let Some(authors) = value.and_then(Value::as_array) else {
        return String::new();
    };

    authors
        .iter()
        .map(|author| {
            let part = |key: &str| author.get(key).map(value_to_display).unwrap_or_default();
            format!("{} {}", part("given"), part("family"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ===========================================
    // Tests for record_from_work
    // ===========================================

    #[test]
    fn test_record_from_full_response() {
        // Given: A typical Crossref response envelope
        let document = json!({
            "status": "ok",
            "message": {
                "title": ["Deep Learning"],
                "author": [
                    {"given": "Yann", "family": "LeCun"},
                    {"given": "Yoshua", "family": "Bengio"}
                ],
                "issued": {"date-parts": [[2015, 5, 27]]},
                "container-title": ["Nature"],
                "publisher": "Springer Science and Business Media LLC"
            }
        });

        // When: We normalize it
        let record = record_from_work(&document);

        // Then: Every field is extracted and the year becomes a string
        assert_eq!(record.title, "Deep Learning");
        assert_eq!(record.author, "Yann LeCun, Yoshua Bengio");
        assert_eq!(record.year, "2015");
        assert_eq!(record.journal, "Nature");
        assert_eq!(record.publisher, "Springer Science and Business Media LLC");
    }

    #[test]
    fn test_record_from_bare_work() {
        let document = json!({"title": ["Bare"], "publisher": "P"});

        let record = record_from_work(&document);

        assert_eq!(record.title, "Bare");
        assert_eq!(record.publisher, "P");
    }

    #[test]
    fn test_record_missing_fields_are_empty() {
        // Given: A work with none of the expected fields
        let document = json!({"message": {"type": "journal-article"}});

        // When: We normalize it
        let record = record_from_work(&document);

        // Then: Every field is the empty string
        assert_eq!(record, Record::default());
    }

    #[test]
    fn test_record_empty_lists_are_empty() {
        let document = json!({
            "message": {
                "title": [],
                "author": [],
                "issued": {"date-parts": [[]]},
                "container-title": []
            }
        });

        let record = record_from_work(&document);

        assert_eq!(record, Record::default());
    }

    #[test]
    fn test_record_partial_author_names() {
        // Organizations and mononyms lack a given or family name
        let document = json!({
            "message": {
                "author": [
                    {"family": "Consortium"},
                    {"given": "Plato"}
                ]
            }
        });

        let record = record_from_work(&document);

        assert_eq!(record.author, " Consortium, Plato ");
    }

    #[test]
    fn test_record_null_date_part() {
        let document = json!({"message": {"issued": {"date-parts": [[null]]}}});

        let record = record_from_work(&document);

        assert_eq!(record.year, "");
    }

    // ===========================================
    // Tests for CrossrefClient against a local server
    // ===========================================

    #[test]
    fn test_fetch_success() {
        // Given: A server answering the works endpoint
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/works/10.1000/xyz123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "message": {
                        "title": ["T"],
                        "author": [{"given": "A", "family": "B"}],
                        "issued": {"date-parts": [[2020]]},
                        "container-title": ["J"],
                        "publisher": "P"
                    }
                })
                .to_string(),
            )
            .create();
        let client = CrossrefClient::with_base_url(server.url()).unwrap();

        // When: We fetch the DOI
        let record = client.fetch("10.1000/xyz123").unwrap();

        // Then: The record is normalized
        mock.assert();
        assert_eq!(
            record,
            Record {
                title: "T".to_string(),
                author: "A B".to_string(),
                year: "2020".to_string(),
                journal: "J".to_string(),
                publisher: "P".to_string(),
            }
        );
    }

    #[test]
    fn test_fetch_not_found() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/works/10.1000/missing")
            .with_status(404)
            .with_body("Resource not found.")
            .create();
        let client = CrossrefClient::with_base_url(server.url()).unwrap();

        let result = client.fetch("10.1000/missing");

        mock.assert();
        match result {
            Err(FetchError::NotFound(doi)) => assert_eq!(doi, "10.1000/missing"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_server_error_is_not_found() {
        // Any non-200 status fails the lookup, there is no retry
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/works/10.1000/flaky")
            .with_status(503)
            .expect(1)
            .create();
        let client = CrossrefClient::with_base_url(server.url()).unwrap();

        let result = client.fetch("10.1000/flaky");

        mock.assert();
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[test]
    fn test_fetch_invalid_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/works/10.1000/garbled")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create();
        let client = CrossrefClient::with_base_url(server.url()).unwrap();

        let result = client.fetch("10.1000/garbled");

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_work_url_trims_trailing_slash() {
        let client = CrossrefClient::with_base_url("http://localhost:1234/").unwrap();
        assert_eq!(
            client.work_url("10.1/abc"),
            "http://localhost:1234/works/10.1/abc"
        );
    }
}
