//! refm: a personal reference manager.
//!
//! This library provides functionality to:
//! - Store bibliographic records in named repositories backed by one JSON file
//! - Populate records from a DOI through the Crossref API
//! - Export repositories as reference lists or short in-text citations

pub mod export;
pub mod fetch;
pub mod record;
pub mod store;
pub mod style;
pub mod template;

pub use export::{export, render_repository, ExportError, ExportSummary};
pub use fetch::{record_from_work, CrossrefClient, FetchError, MetadataProvider};
pub use record::Record;
pub use store::{default_store_path, Store, StoreError};
pub use style::{builtin_style_names, CitationKind, Style, StyleError};
pub use template::{render, RenderError};
