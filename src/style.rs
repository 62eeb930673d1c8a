//! Citation styles.
//!
//! A single [`Style`] enumeration covers the supported styles. Each style maps
//! to two templates: a full reference and a short in-text citation.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when resolving a style.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("Style '{0}' not supported.")]
    Unsupported(String),
}

/// Which of the two template tables to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationKind {
    /// Full formatted reference, as in a reference list.
    Reference,
    /// Short in-text citation such as `(Doe, 2021)`.
    InText,
}

/// A supported citation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Harvard,
    Apa,
    Mla,
    Chicago,
    Vancouver,
    Ieee,
}

/// Single source of truth for builtin styles: (style, name, reference, in-text).
const BUILTIN_STYLES: &[(Style, &str, &str, &str)] = &[
    (
        Style::Harvard,
        "harvard",
        "{author} ({year}). {title}. {journal}, {publisher}.",
        "({author}, {year})",
    ),
    (
        Style::Apa,
        "apa",
        "{author} ({year}). {title}. {journal}. {publisher}.",
        "({author}, {year})",
    ),
    (
        Style::Mla,
        "mla",
        "{author}. \"{title}.\" {journal}, {year}, {publisher}.",
        "({author} {year})",
    ),
    (
        Style::Chicago,
        "chicago",
        "{author}. {title}. {journal}. {publisher}, {year}.",
        "({author} {year})",
    ),
    (
        Style::Vancouver,
        "vancouver",
        "{author}. {title}. {journal}. {year}; {publisher}.",
        "[{author} {year}]",
    ),
    (
        Style::Ieee,
        "ieee",
        "{author}, \"{title},\" {journal}, {publisher}, {year}.",
        "[{author}, {year}]",
    ),
];

impl Style {
    /// Every supported style, in listing order.
    pub const ALL: [Style; 6] = [
        Style::Harvard,
        Style::Apa,
        Style::Mla,
        Style::Chicago,
        Style::Vancouver,
        Style::Ieee,
    ];

    // BUILTIN_STYLES is laid out in declaration order of the variants.
    fn entry(self) -> &'static (Style, &'static str, &'static str, &'static str) {
        &BUILTIN_STYLES[self as usize]
    }

    /// The lowercase name used on the command line.
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Returns the template for this style in the requested table.
    pub fn template(self, kind: CitationKind) -> &'static str {
        let &(_, _, reference, in_text) = self.entry();
        match kind {
            CitationKind::Reference => reference,
            CitationKind::InText => in_text,
        }
    }
}

impl FromStr for Style {
    type Err = StyleError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        BUILTIN_STYLES
            .iter()
            .find(|(_, n, ..)| *n == name)
            .map(|(style, ..)| *style)
            .ok_or_else(|| StyleError::Unsupported(name.to_string()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the list of available builtin style names.
pub fn builtin_style_names() -> Vec<&'static str> {
    BUILTIN_STYLES.iter().map(|(_, n, ..)| *n).collect()
}
