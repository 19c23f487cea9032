//! Error type for parsing and querying.

/// Anything that can go wrong between raw markup and a match set.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The markup could not be turned into a tree.
    #[error("HTML parsing failed: {0}")]
    Html(#[from] html::Error),

    /// The selector string did not compile.
    #[error("selector compilation failed: {0}")]
    Selector(#[from] css::SelectorError),
}

/// Result type alias for parsing and querying.
pub type Result<T> = std::result::Result<T, Error>;
