//! Convenience queries over a parsed [`Document`](html::Document).
//!
//! Every function takes a scope that is anything convertible into a
//! [`Content`]: a whole document, a single node or a list of nodes.

use std::ops::ControlFlow;

use css::SelectorList;
use html::{Content, NodeId, NodeRef};
use tracing::{debug, span, Level};

use crate::error::Result;
use crate::select::{FindMatches, Sink};

/// Compile a selector string once for repeated use with [`Select`]
pub fn compile(selector: &str) -> Result<SelectorList> {
    Ok(css::selector_list(selector)?)
}

/// Run a compiled selector over a scope, recursing into every subtree
fn for_each_match(selector: &SelectorList, scope: Content<'_>, sink: &mut Sink<'_>) {
    let single;
    let ids: &[NodeId] = match scope {
        Content::Node(node) => {
            single = [node.id()];
            &single
        }
        Content::List(list) => list.ids(),
    };
    // Stopping early is the only reason to break, so there is nothing to report
    let _ = selector.find_matches(scope.document(), ids, true, sink);
}

/// Queries available on a compiled [`SelectorList`]
pub trait Select {
    /// Every match in the scope
    fn select<'a>(&self, scope: impl Into<Content<'a>>) -> Vec<NodeRef<'a>>;

    /// The first match, without looking any further
    fn select_first<'a>(&self, scope: impl Into<Content<'a>>) -> Option<NodeRef<'a>>;

    /// Text of the first match, or an empty string
    fn select_text_content<'a>(&self, scope: impl Into<Content<'a>>) -> String {
        self.select_first(scope)
            .map(|node| node.text_content())
            .unwrap_or_default()
    }

    /// Attribute `name` of the first match. A bare boolean attribute reads as
    /// `"true"`; a missing attribute or match reads as an empty string.
    fn select_attribute_value<'a>(&self, scope: impl Into<Content<'a>>, name: &str) -> String {
        self.select_first(scope)
            .and_then(|node| node.attr(name))
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

impl Select for SelectorList {
    fn select<'a>(&self, scope: impl Into<Content<'a>>) -> Vec<NodeRef<'a>> {
        let scope = scope.into();
        let doc = scope.document();
        let span = span!(Level::DEBUG, "select", alternatives = self.0.len());
        let _enter = span.enter();
        let mut matches = Vec::new();
        for_each_match(self, scope, &mut |id: NodeId| {
            matches.push(doc.node(id));
            ControlFlow::Continue(())
        });
        debug!(matches = matches.len(), "selected");
        matches
    }

    fn select_first<'a>(&self, scope: impl Into<Content<'a>>) -> Option<NodeRef<'a>> {
        let scope = scope.into();
        let doc = scope.document();
        let span = span!(Level::DEBUG, "select_first", alternatives = self.0.len());
        let _enter = span.enter();
        let mut first = None;
        for_each_match(self, scope, &mut |id: NodeId| {
            first = Some(doc.node(id));
            ControlFlow::Break(())
        });
        debug!(found = first.is_some(), "selected first");
        first
    }
}

/// Every element in `scope` matching `selector`.
///
/// A scope's own matches come before any matches inside it, and each
/// element's subtree is exhausted before the next sibling's:
///
/// ```
/// let doc = htmlsoup::parse("<div id=a><div id=b></div></div><div id=c></div>").unwrap();
/// let ids: Vec<_> = htmlsoup::select(&doc, "div")
///     .unwrap()
///     .iter()
///     .map(|div| div.attr("id").unwrap().to_string())
///     .collect();
/// assert_eq!(ids, ["a", "c", "b"]);
/// ```
pub fn select<'a>(scope: impl Into<Content<'a>>, selector: &str) -> Result<Vec<NodeRef<'a>>> {
    Ok(compile(selector)?.select(scope))
}

pub fn select_first<'a>(
    scope: impl Into<Content<'a>>,
    selector: &str,
) -> Result<Option<NodeRef<'a>>> {
    Ok(compile(selector)?.select_first(scope))
}

/// All text in `scope`, depth first
pub fn text_content<'a>(scope: impl Into<Content<'a>>) -> String {
    scope.into().text_content()
}

pub fn select_text_content<'a>(scope: impl Into<Content<'a>>, selector: &str) -> Result<String> {
    Ok(compile(selector)?.select_text_content(scope))
}

pub fn select_attribute_value<'a>(
    scope: impl Into<Content<'a>>,
    selector: &str,
    name: &str,
) -> Result<String> {
    Ok(compile(selector)?.select_attribute_value(scope, name))
}

pub fn inner_html<'a>(scope: impl Into<Content<'a>>) -> String {
    scope.into().inner_html()
}

pub fn outer_html<'a>(scope: impl Into<Content<'a>>) -> String {
    scope.into().outer_html()
}
