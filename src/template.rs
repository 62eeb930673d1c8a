//! Named-placeholder template rendering.
//!
//! Templates contain `{field}` placeholders that are substituted with the
//! matching [`Record`] field. A placeholder naming a field the record does not
//! provide is an error, never left in the output.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::record::Record;

/// Errors that can occur during rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template references unknown field '{{{0}}}'")]
    UnknownPlaceholder(String),
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches {name}; braces cannot nest inside a placeholder
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"))
}

/// Returns the placeholder names used by a template, in order of appearance.
///
/// Repeated placeholders are listed once per occurrence.
pub fn placeholders(template: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}

/// Renders a template with the fields of a record.
///
/// # Arguments
///
/// * `template` - Template text with `{field}` placeholders
/// * `record` - The record providing field values
///
/// # Returns
///
/// The rendered text with every placeholder replaced verbatim.
///
/// # Errors
///
/// Returns [`RenderError::UnknownPlaceholder`] for the first placeholder that
/// does not name a record field.
pub fn render(template: &str, record: &Record) -> Result<String, RenderError> {
    // Validate every placeholder before producing any output
    if let Some(unknown) = placeholders(template)
        .into_iter()
        .find(|name| record.field(name).is_none())
    {
        return Err(RenderError::UnknownPlaceholder(unknown.to_string()));
    }

    let rendered = placeholder_regex().replace_all(template, |caps: &Captures| {
        record.field(&caps[1]).unwrap_or_default().to_string()
    });

    Ok(rendered.into_owned())
}
