//! Export of repositories as formatted citation lists.
//!
//! Both reference lists and short in-text citations go through [`export`];
//! they differ only in the template table consulted.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::record::Record;
use crate::store::Store;
use crate::style::{CitationKind, Style, StyleError};
use crate::template::{render, RenderError};

/// Errors that can occur during export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Repository '{0}' does not exist.")]
    RepositoryNotFound(String),

    #[error("{}", unsupported_message(.style, .kind))]
    UnsupportedStyle { style: String, kind: CitationKind },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("'{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

fn unsupported_message(style: &str, kind: &CitationKind) -> String {
    match kind {
        CitationKind::Reference => format!("Style '{}' not supported.", style),
        CitationKind::InText => {
            format!("Style '{}' not supported for in-text citation.", style)
        }
    }
}

impl ExportError {
    /// Whether the error comes from user input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ExportError::RepositoryNotFound(_) | ExportError::UnsupportedStyle { .. }
        )
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub repository: String,
    pub path: PathBuf,
    pub style: Style,
    pub kind: CitationKind,
    /// Number of lines written
    pub count: usize,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CitationKind::Reference => write!(
                f,
                "Exported '{}' to '{}' in {} style.",
                self.repository,
                self.path.display(),
                self.style
            ),
            CitationKind::InText => write!(
                f,
                "Exported short citations for '{}' to '{}' in {} style.",
                self.repository,
                self.path.display(),
                self.style
            ),
        }
    }
}

/// Renders every record with a style, preserving record order.
pub fn render_repository(
    records: &[Record],
    style: Style,
    kind: CitationKind,
) -> Result<Vec<String>, RenderError> {
    let template = style.template(kind);
    records.iter().map(|record| render(template, record)).collect()
}

/// Exports a repository to a file, one rendered line per record.
///
/// # Arguments
///
/// * `store` - The loaded store
/// * `repository` - Name of the repository to export
/// * `style` - Style name as given by the user
/// * `kind` - Full references or short in-text citations
/// * `out` - Output file, overwritten if it exists
///
/// # Errors
///
/// Unknown repositories and styles are reported before any file is touched.
/// A failure to write `out` is returned as [`ExportError::Io`].
pub fn export(
    store: &Store,
    repository: &str,
    style: &str,
    kind: CitationKind,
    out: &Path,
) -> Result<ExportSummary, ExportError> {
    let records = store
        .repository(repository)
        .ok_or_else(|| ExportError::RepositoryNotFound(repository.to_string()))?;

    let style = style.parse::<Style>().map_err(|e| match e {
        StyleError::Unsupported(name) => ExportError::UnsupportedStyle { style: name, kind },
    })?;

    let lines = render_repository(records, style, kind)?;
    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in &lines {
        content.push_str(line);
        content.push('\n');
    }

    fs::write(out, content).map_err(|source| ExportError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    debug!(
        "wrote {} {:?} lines for '{}' to {}",
        lines.len(),
        kind,
        repository,
        out.display()
    );

    Ok(ExportSummary {
        repository: repository.to_string(),
        path: out.to_path_buf(),
        style,
        kind,
        count: lines.len(),
    })
}
