//! Bibliographic records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A bibliographic record with five text fields.
///
/// Missing values are empty strings. `author` holds the comma-joined list of
/// `"given family"` names and `year` is always in display form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "display_string")]
    pub year: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub publisher: String,
}

/// Field names a template may reference.
pub const FIELD_NAMES: [&str; 5] = ["author", "year", "title", "journal", "publisher"];

impl Record {
    /// Looks up a field by its placeholder name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "author" => Some(&self.author),
            "year" => Some(&self.year),
            "title" => Some(&self.title),
            "journal" => Some(&self.journal),
            "publisher" => Some(&self.publisher),
            _ => None,
        }
    }
}

/// Renders a scalar JSON value the way it should appear in citation text.
///
/// Strings are kept verbatim. Numbers use their decimal form and booleans
/// become `true` or `false`. Null, arrays and objects become the empty string.
pub(crate) fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// Stores written by earlier tools keep the year as a JSON number.
fn display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_display(&value))
}
