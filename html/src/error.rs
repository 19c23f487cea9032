/// Errors produced while turning markup into a [`Document`](crate::Document).
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A named character reference was accepted by the entity trie but has no
    /// entry in the entity table.
    #[error("couldn't decode &{0};")]
    Decode(String),

    /// The input string was empty.
    #[error("cannot parse empty input")]
    EmptyInput,

    /// Elements were nested deeper than [`ParseOptions::max_depth`](crate::ParseOptions).
    #[error("elements nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
