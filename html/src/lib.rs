//! Parsing of HTML into a read-only node tree

mod dom;
pub mod entities;
mod error;
mod parsing;
mod serialize;
#[cfg(test)]
mod tests;

pub use dom::*;
pub use error::{Error, Result};
pub use parsing::parse;

/// Options controlling how markup is turned into a [`Document`].
///
/// ```
/// let options = html::ParseOptions {
///     trim_text: false,
///     ..html::ParseOptions::default()
/// };
/// let doc = html::parse("<p> hi </p>", &options).unwrap();
/// assert_eq!(doc.content().text_content(), " hi ");
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Trim whitespace around every text run, dropping runs that end up empty.
    ///
    /// Default: `true`
    pub trim_text: bool,

    /// Deepest element nesting accepted before giving up with
    /// [`Error::NestingTooDeep`].
    ///
    /// Default: `512`
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trim_text: true,
            max_depth: 512,
        }
    }
}

/// Parse a complete HTML string with the default [`ParseOptions`]
pub fn document(input: &str) -> Result<Document> {
    parse(input, &ParseOptions::default())
}
