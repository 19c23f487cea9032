//! Parse HTML into a read-only tree and query it with CSS selectors.
//!
//! ```
//! let doc = htmlsoup::parse(r#"<ul><li>a</li><li class="x">b</li></ul>"#).unwrap();
//! assert_eq!(htmlsoup::select_text_content(&doc, "li.x").unwrap(), "b");
//! ```

mod error;
pub mod query;
pub mod select;
#[cfg(test)]
mod tests;

pub use css::{
    AttributeSelector, Combinator, CompoundSelector, NthFormula, PseudoClass, Selector,
    SelectorError, SelectorList,
};
pub use error::{Error, Result};
pub use html::{
    AttributeValue, Content, DOMAttributes, DOMElement, DOMNode, DOMNodeType, Document, NodeId,
    NodeList, NodeRef, ParseOptions,
};
pub use query::{
    compile, inner_html, outer_html, select, select_attribute_value, select_first,
    select_text_content, text_content, Select,
};

/// Parse a complete HTML string with the default [`ParseOptions`]
pub fn parse(input: &str) -> Result<Document> {
    Ok(html::document(input)?)
}

/// Parse a complete HTML string
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Document> {
    Ok(html::parse(input, options)?)
}
