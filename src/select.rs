//! Evaluation of compiled selectors against a [`Document`].
//!
//! Matches are produced level by level: a list's own matches come first, then
//! each element's subtree is searched completely before its next sibling's.
//! This is not CSS document order, and callers rely on it.

use std::ops::ControlFlow;

use css::{AttributeSelector, Combinator, CompoundSelector, PseudoClass, Selector, SelectorList};
use html::{AttributeValue, DOMElement, Document, NodeId, NodeRef};
use tracing::trace;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

/// Receives matches in order; returning `Break` stops the search
pub type Sink<'s> = dyn FnMut(NodeId) -> ControlFlow<()> + 's;

pub trait FindMatches {
    /// Feed every match found in `scope` to `sink`. Without `recursive` only the
    /// entries of `scope` themselves are tested.
    fn find_matches(
        &self,
        doc: &Document,
        scope: &[NodeId],
        recursive: bool,
        sink: &mut Sink<'_>,
    ) -> ControlFlow<()>;
}

impl FindMatches for SelectorList {
    fn find_matches(
        &self,
        doc: &Document,
        scope: &[NodeId],
        recursive: bool,
        sink: &mut Sink<'_>,
    ) -> ControlFlow<()> {
        for alternative in &self.0 {
            alternative.find_matches(doc, scope, recursive, sink)?;
        }
        ControlFlow::Continue(())
    }
}

impl FindMatches for Selector {
    fn find_matches(
        &self,
        doc: &Document,
        scope: &[NodeId],
        recursive: bool,
        sink: &mut Sink<'_>,
    ) -> ControlFlow<()> {
        match self {
            Selector::Compound(compound) => compound.find_matches(doc, scope, recursive, sink),
            Selector::Combinator(left, combinator, right) => {
                left.find_matches(doc, scope, recursive, &mut |matched: NodeId| {
                    trace!(%matched, ?combinator, "left side matched");
                    match combinator {
                        Combinator::Descendant => {
                            right.find_matches(doc, doc.children_of(matched), true, &mut *sink)
                        }
                        Combinator::Child => {
                            right.find_matches(doc, doc.children_of(matched), false, &mut *sink)
                        }
                        Combinator::NextSibling => {
                            let after = following_siblings(doc, matched);
                            let next = &after[..after.len().min(1)];
                            right.find_matches(doc, next, false, &mut *sink)
                        }
                        Combinator::SubsequentSibling => {
                            let after = following_siblings(doc, matched);
                            right.find_matches(doc, after, false, &mut *sink)
                        }
                    }
                })
            }
        }
    }
}

impl FindMatches for CompoundSelector {
    fn find_matches(
        &self,
        doc: &Document,
        scope: &[NodeId],
        recursive: bool,
        sink: &mut Sink<'_>,
    ) -> ControlFlow<()> {
        if recursive {
            self.find_matches(doc, scope, false, sink)?;
            for &id in scope {
                self.find_matches(doc, doc.children_of(id), true, sink)?;
            }
            return ControlFlow::Continue(());
        }
        for &id in scope {
            if matches_compound(self, doc, scope, id, &[]) {
                sink(id)?;
            }
        }
        ControlFlow::Continue(())
    }
}

/// Nodes after `id` in its parent's children, text included
fn following_siblings(doc: &Document, id: NodeId) -> &[NodeId] {
    let siblings = match doc.parent_id(id) {
        Some(parent) => doc.children_of(parent),
        None => return &[],
    };
    match siblings.iter().position(|&sibling| sibling == id) {
        Some(index) => &siblings[index + 1..],
        None => &[],
    }
}

/// Test one node of `scope` against a compound, ignoring the pseudo-classes at
/// the positions in `skip`
fn matches_compound(
    compound: &CompoundSelector,
    doc: &Document,
    scope: &[NodeId],
    id: NodeId,
    skip: &[usize],
) -> bool {
    let node = doc.node(id);
    let element = match node.as_element() {
        Some(element) => element,
        None => return false,
    };
    if let Some(tag) = &compound.tag {
        if !element.tag_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let classes = node.classes();
        if !compound.classes.iter().all(|class| classes.contains(class.as_str())) {
            return false;
        }
    }
    if let Some(expected) = &compound.id {
        if text_attr(node, "id") != Some(expected.as_str()) {
            return false;
        }
    }
    if !compound
        .attributes
        .iter()
        .all(|selector| matches_attribute(selector, element))
    {
        return false;
    }
    compound
        .pseudo_classes
        .iter()
        .enumerate()
        .filter(|(index, _)| !skip.contains(index))
        .all(|(index, pseudo)| {
            matches_pseudo_class(compound, pseudo, index, doc, scope, id, skip)
        })
}

fn text_attr<'a>(node: NodeRef<'a>, name: &str) -> Option<&'a str> {
    node.attr(name).and_then(AttributeValue::as_str)
}

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

/// `word` occurs with a boundary (or the end of `text`) on both sides
fn contains_word(text: &str, word: &str) -> bool {
    text.char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()))
        .any(|index| {
            text[index..].starts_with(word)
                && text[..index].chars().next_back().map_or(true, is_word_boundary)
                && text[index + word.len()..]
                    .chars()
                    .next()
                    .map_or(true, is_word_boundary)
        })
}

#[cfg(test)]
#[test]
fn test_word_matching() {
    assert!(contains_word("a wide card", "wide"));
    assert!(contains_word("en-US", "US"));
    assert!(contains_word("wide", "wide"));
    assert!(!contains_word("widescreen", "wide"));
    assert!(!contains_word("a wider b", "wide"));
    assert!(begins_with_word("en-US", "en"));
    assert!(begins_with_word("en", "en"));
    assert!(!begins_with_word("english", "en"));
}

fn begins_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .map_or(false, |rest| rest.chars().next().map_or(true, is_word_boundary))
}

fn matches_attribute(selector: &AttributeSelector, element: &DOMElement) -> bool {
    let value = element.attributes.get(selector.name());
    // Bare boolean attributes only satisfy an existence test
    let text = value.and_then(AttributeValue::as_str);
    match selector {
        AttributeSelector::Has(_) => value.is_some(),
        AttributeSelector::Equals(_, expected) => text == Some(expected.as_str()),
        AttributeSelector::ContainsWord(_, word) => {
            text.map_or(false, |text| contains_word(text, word))
        }
        AttributeSelector::Begins(_, word) => {
            text.map_or(false, |text| begins_with_word(text, word))
        }
        AttributeSelector::StartsWith(_, prefix) => {
            text.map_or(false, |text| text.starts_with(prefix.as_str()))
        }
        AttributeSelector::EndsWith(_, suffix) => {
            text.map_or(false, |text| text.ends_with(suffix.as_str()))
        }
        AttributeSelector::Contains(_, needle) => {
            text.map_or(false, |text| text.contains(needle.as_str()))
        }
    }
}

fn matches_pseudo_class(
    compound: &CompoundSelector,
    pseudo: &PseudoClass,
    index: usize,
    doc: &Document,
    scope: &[NodeId],
    id: NodeId,
    skip: &[usize],
) -> bool {
    let node = doc.node(id);
    let has = |name: &str| node.attr(name).is_some();
    match pseudo {
        PseudoClass::Checked => has("checked"),
        PseudoClass::Disabled => has("disabled"),
        PseudoClass::Required => has("required"),
        PseudoClass::Optional => !has("required"),
        PseudoClass::Indeterminate => is_indeterminate(doc, node),
        PseudoClass::Empty => doc
            .children_of(id)
            .iter()
            .all(|&child| doc.node(child).as_text().map_or(false, is_blank)),
        PseudoClass::Root => doc
            .parent_id(id)
            .map_or(true, |parent| doc.parent_id(parent).is_none()),
        PseudoClass::FirstChild
        | PseudoClass::LastChild
        | PseudoClass::OnlyChild
        | PseudoClass::NthChild(_)
        | PseudoClass::NthLastChild(_) => {
            let parent = match doc.parent_id(id) {
                Some(parent) => parent,
                None => return false,
            };
            let siblings: Vec<NodeId> = doc
                .children_of(parent)
                .iter()
                .copied()
                .filter(|&sibling| doc.element(sibling).is_some())
                .collect();
            matches_position(pseudo, &siblings, id)
        }
        PseudoClass::FirstOfType
        | PseudoClass::LastOfType
        | PseudoClass::OnlyOfType
        | PseudoClass::NthOfType(_)
        | PseudoClass::NthLastOfType(_) => {
            // "Of type" means among the other matches of this same compound
            let mut without = skip.to_vec();
            without.push(index);
            let peers: Vec<NodeId> = scope
                .iter()
                .copied()
                .filter(|&peer| matches_compound(compound, doc, scope, peer, &without))
                .collect();
            matches_position(pseudo, &peers, id)
        }
    }
}

/// Check where `id` sits in `list` for a positional pseudo-class
fn matches_position(pseudo: &PseudoClass, list: &[NodeId], id: NodeId) -> bool {
    let count = list.len();
    let position = list.iter().position(|&n| n == id).map(|index| index + 1);
    match pseudo {
        PseudoClass::FirstChild | PseudoClass::FirstOfType => list.first() == Some(&id),
        PseudoClass::LastChild | PseudoClass::LastOfType => list.last() == Some(&id),
        PseudoClass::OnlyChild => count == 1,
        PseudoClass::OnlyOfType => count == 1 && list.first() == Some(&id),
        PseudoClass::NthChild(formula) | PseudoClass::NthOfType(formula) => {
            position.map_or(false, |p| formula.matches(p, count))
        }
        PseudoClass::NthLastChild(formula) | PseudoClass::NthLastOfType(formula) => {
            position.map_or(false, |p| formula.matches(count - p + 1, count))
        }
        _ => unreachable!("{:?} is not a positional pseudo-class", pseudo),
    }
}

/// Nothing but whitespace and complete HTML comments
fn is_blank(mut text: &str) -> bool {
    loop {
        text = text.trim_start();
        if text.is_empty() {
            return true;
        }
        let after_comment = text.strip_prefix(HTML_COMMENT_START).and_then(|rest| {
            rest.find(HTML_COMMENT_END)
                .map(|end| &rest[end + HTML_COMMENT_END.len()..])
        });
        match after_comment {
            Some(rest) => text = rest,
            None => return false,
        }
    }
}

#[cfg(test)]
#[test]
fn test_is_blank() {
    assert!(is_blank(""));
    assert!(is_blank(" \n\t"));
    assert!(is_blank("<!-- a --> <!--b-->"));
    assert!(!is_blank("<!-- open"));
    assert!(!is_blank("<!-->"));
    assert!(!is_blank(" x "));
}

fn is_indeterminate(doc: &Document, node: NodeRef<'_>) -> bool {
    match node.tag_name() {
        Some("input") => match text_attr(node, "type") {
            Some("checkbox") => node.attr("indeterminate").is_some(),
            Some("radio") => {
                let name = match text_attr(node, "name") {
                    Some(name) => name,
                    None => return false,
                };
                let parent = match doc.parent_id(node.id()) {
                    Some(parent) => parent,
                    None => return false,
                };
                // Indeterminate until some radio of the same group is checked
                !doc.children_of(parent).iter().any(|&sibling| {
                    let sibling = doc.node(sibling);
                    sibling.tag_name() == Some("input")
                        && text_attr(sibling, "type") == Some("radio")
                        && text_attr(sibling, "name") == Some(name)
                        && sibling.attr("checked").is_some()
                })
            }
            _ => false,
        },
        Some("progress") => !(is_set(node.attr("value")) && is_set(node.attr("max"))),
        _ => false,
    }
}

fn is_set(value: Option<&AttributeValue>) -> bool {
    match value {
        Some(AttributeValue::Text(text)) => !text.is_empty(),
        Some(AttributeValue::Present) => true,
        None => false,
    }
}
