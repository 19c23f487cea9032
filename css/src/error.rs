/// Reasons a selector string fails to compile
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("unsupported selector: \"{0}\"")]
    Unsupported(String),

    #[error("invalid nth formula: \"{0}\"")]
    InvalidNth(String),
}

pub type Result<T> = std::result::Result<T, SelectorError>;
