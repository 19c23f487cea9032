use tracing::{debug, span, trace, Level};

use super::dom::*;
use super::entities::{decode, is_escape_char, is_escape_start};
use super::error::{Error, Result};
use super::ParseOptions;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const SCRIPT_END: &str = "</script>";

/// Elements that never have children, whether or not they are written `<x/>`
static VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "link", "meta",
    "param", "source",
];

fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name.to_lowercase().as_str())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Text,
    Escape,
    InTag,
    AttrName,
    AttrValueStart,
    AttrValue,
    AttrEscape,
}

impl State {
    fn ignores_whitespace(self) -> bool {
        matches!(self, State::AttrName | State::AttrValueStart)
    }
}

/// The tag currently being read, up to its `>`
#[derive(Default)]
struct PendingTag {
    name: String,
    attributes: DOMAttributes,
    closing: bool,
    self_closing: bool,
    attribute_name: String,
    value: String,
    quote: Option<char>,
}

impl PendingTag {
    fn finish_attribute(&mut self, value: AttributeValue) {
        let name = std::mem::take(&mut self.attribute_name).to_lowercase();
        if !name.is_empty() {
            self.attributes.insert(name, value);
        }
    }

    fn finish_value(&mut self) {
        let value = std::mem::take(&mut self.value);
        self.finish_attribute(AttributeValue::Text(value));
    }
}

struct Tokenizer<'a> {
    input: &'a str,
    options: &'a ParseOptions,
    document: Document,
}

impl<'a> Tokenizer<'a> {
    /// Read nodes starting at byte `start` until the input ends or a closing tag
    /// ends this level, returning the nodes read and the number of bytes consumed.
    /// Each opened element recurses with itself as `parent`.
    fn read_children(
        &mut self,
        start: usize,
        parent: NodeId,
        depth: usize,
    ) -> Result<(Vec<NodeId>, usize)> {
        let in_script = self
            .document
            .element(parent)
            .map_or(false, |e| e.tag_name.eq_ignore_ascii_case("script"));
        let mut children = Vec::new();
        let mut state = State::Text;
        let mut in_comment = false;
        let mut text = String::new();
        let mut escape = String::new();
        let mut tag = PendingTag::default();

        let input = self.input;
        let mut index = start;
        while let Some(c) = input[index..].chars().next() {
            let rest = &input[index..];
            let mut next = index + c.len_utf8();
            let whitespace = c.is_whitespace();
            if state.ignores_whitespace() && whitespace {
                index = next;
                continue;
            }
            match state {
                State::Text => {
                    if c == '<' && !in_comment && (!in_script || rest.starts_with(SCRIPT_END)) {
                        if rest.starts_with(COMMENT_START) {
                            text.push_str(COMMENT_START);
                            in_comment = true;
                            next = index + COMMENT_START.len();
                        } else {
                            self.flush_text(&mut text, parent, &mut children);
                            tag = PendingTag::default();
                            state = State::InTag;
                        }
                    } else if in_comment {
                        if rest.starts_with(COMMENT_END) {
                            text.push_str(COMMENT_END);
                            in_comment = false;
                            next = index + COMMENT_END.len();
                        } else {
                            text.push(c);
                        }
                    } else if c == '&' && !in_script && is_escape_start(input, next) {
                        escape.clear();
                        state = State::Escape;
                    } else {
                        text.push(c);
                    }
                }
                State::Escape | State::AttrEscape => {
                    let (target, resume) = if state == State::Escape {
                        (&mut text, State::Text)
                    } else {
                        (&mut tag.value, State::AttrValue)
                    };
                    if c == ';' {
                        target.push(decode(&escape)?);
                        state = resume;
                    } else if is_escape_char(c) {
                        escape.push(c);
                    } else {
                        // Not a reference after all; keep it as written and
                        // read this character again
                        target.push('&');
                        target.push_str(&escape);
                        state = resume;
                        next = index;
                    }
                }
                State::InTag => {
                    if whitespace {
                        if !tag.name.is_empty() {
                            tag.attribute_name.clear();
                            state = State::AttrName;
                        }
                    } else if c == '/' {
                        if tag.name.is_empty() {
                            tag.closing = true;
                        } else {
                            tag.self_closing = true;
                        }
                    } else if c == '>' {
                        if tag.closing {
                            trace!(depth, "closing tag ends level");
                            return Ok((children, next - start));
                        }
                        let pending = std::mem::take(&mut tag);
                        let childless = pending.self_closing
                            || is_void_element(&pending.name)
                            // `<!DOCTYPE ...>` has no closing tag, so it must not swallow the document
                            || pending.name.starts_with('!');
                        let id = self.document.push(DOMNode {
                            parent: Some(parent),
                            node_type: DOMNodeType::Element(DOMElement {
                                tag_name: pending.name,
                                attributes: pending.attributes,
                                children: None,
                            }),
                        });
                        if !childless {
                            if depth >= self.options.max_depth {
                                return Err(Error::NestingTooDeep {
                                    limit: self.options.max_depth,
                                });
                            }
                            let (grandchildren, length) =
                                self.read_children(next, id, depth + 1)?;
                            self.document.set_children(id, grandchildren);
                            next += length;
                        }
                        children.push(id);
                        state = State::Text;
                    } else if !tag.closing {
                        tag.name.push(c);
                    }
                }
                State::AttrName => {
                    if c == '=' {
                        state = State::AttrValueStart;
                    } else if c == '/' || c == '>' {
                        if !tag.attribute_name.is_empty() {
                            tag.finish_attribute(AttributeValue::Present);
                        }
                        state = State::InTag;
                        next = index;
                    } else {
                        let after_whitespace = input[..index]
                            .chars()
                            .next_back()
                            .map_or(false, char::is_whitespace);
                        if after_whitespace && !tag.attribute_name.is_empty() {
                            tag.finish_attribute(AttributeValue::Present);
                        }
                        tag.attribute_name.push(c);
                    }
                }
                State::AttrValueStart => {
                    if c == '\'' || c == '"' {
                        tag.quote = Some(c);
                    } else {
                        tag.quote = None;
                        next = index;
                    }
                    tag.value.clear();
                    state = State::AttrValue;
                }
                State::AttrValue => match tag.quote {
                    Some(quote) if c == quote => {
                        tag.finish_value();
                        state = State::AttrName;
                    }
                    None if whitespace => {
                        tag.finish_value();
                        state = State::AttrName;
                    }
                    None if c == '/' || c == '>' => {
                        tag.finish_value();
                        state = State::InTag;
                        next = index;
                    }
                    _ if c == '&' && is_escape_start(input, next) => {
                        escape.clear();
                        state = State::AttrEscape;
                    }
                    _ => tag.value.push(c),
                },
            }
            index = next;
        }

        if state == State::Escape {
            text.push('&');
            text.push_str(&escape);
            state = State::Text;
        }
        if state == State::Text {
            self.flush_text(&mut text, parent, &mut children);
        }
        Ok((children, index - start))
    }

    fn flush_text(&mut self, text: &mut String, parent: NodeId, children: &mut Vec<NodeId>) {
        let content = if self.options.trim_text {
            text.trim()
        } else {
            text.as_str()
        };
        if !content.is_empty() {
            let id = self.document.push(DOMNode {
                parent: Some(parent),
                node_type: DOMNodeType::Text(content.to_string()),
            });
            children.push(id);
        }
        text.clear();
    }
}

/// Parse a complete HTML string into a [`Document`].
///
/// Malformed markup is consumed on a best-effort basis; the only failures are
/// empty input, an undecodable named reference and nesting deeper than
/// [`ParseOptions::max_depth`].
pub fn parse(input: &str, options: &ParseOptions) -> Result<Document> {
    let span = span!(Level::DEBUG, "parse_html", bytes = input.len());
    let _enter = span.enter();
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    let mut tokenizer = Tokenizer {
        input,
        options,
        document: Document::new(),
    };
    let wrapper = tokenizer.document.wrapper();
    let (children, consumed) = tokenizer.read_children(0, wrapper, 0)?;
    if consumed < input.len() {
        debug!(consumed, "stray closing tag ended the document early");
    }
    tokenizer.document.set_children(wrapper, children);
    debug!(nodes = tokenizer.document.len(), "parsed document");
    Ok(tokenizer.document)
}

#[cfg(test)]
fn tags(doc: &Document) -> Vec<&str> {
    doc.top_level().iter().filter_map(|n| n.tag_name()).collect()
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    let doc = parse(r#"<div>"#, &ParseOptions::default()).unwrap();
    let div = doc.content().as_node().unwrap();
    assert_eq!(div.tag_name(), Some("div"));
    assert_eq!(div.attributes(), Some(&DOMAttributes::empty()));

    let doc = parse(r#"<div class=nothing>"#, &ParseOptions::default()).unwrap();
    let div = doc.content().as_node().unwrap();
    assert_eq!(div.attributes(), Some(&crate::attributes!("class" => "nothing")));

    let data = r#"<div attr1 attr2=two attr3='three' attr4="number four" ATTR5>"#;
    let doc = parse(data, &ParseOptions::default()).unwrap();
    let attrs = doc.content().as_node().unwrap().attributes().unwrap();
    let expected: DOMAttributes = [
        ("attr1", AttributeValue::Present),
        ("attr2", AttributeValue::Text("two".into())),
        ("attr3", AttributeValue::Text("three".into())),
        ("attr4", AttributeValue::Text("number four".into())),
        ("attr5", AttributeValue::Present),
    ]
    .into_iter()
    .collect();
    assert_eq!(attrs, &expected);
}

#[cfg(test)]
#[test]
fn test_attribute_whitespace_and_escapes() {
    let data = r#"<a href = "/x?a=1&amp;b=2" title=R&amp;D data-x='&lt;'>"#;
    let doc = parse(data, &ParseOptions::default()).unwrap();
    let a = doc.content().as_node().unwrap();
    assert_eq!(a.attr("href").and_then(|v| v.as_str()), Some("/x?a=1&b=2"));
    assert_eq!(a.attr("title").and_then(|v| v.as_str()), Some("R&D"));
    assert_eq!(a.attr("data-x").and_then(|v| v.as_str()), Some("<"));
}

#[cfg(test)]
#[test]
fn test_void_elements() {
    let doc = parse("<p>a<br>b<br/>c<img src=x.png></p>", &ParseOptions::default()).unwrap();
    let p = doc.content().as_node().unwrap();
    let children: Vec<_> = p.children().collect();
    assert_eq!(children.len(), 6);
    assert_eq!(children[1].as_element(), children[3].as_element());
    assert!(children[1].child_list().is_none());
    assert!(children[5].child_list().is_none());
    assert_eq!(children[4].as_text(), Some("c"));

    let doc = parse("<span></span>", &ParseOptions::default()).unwrap();
    let span = doc.content().as_node().unwrap();
    assert!(span.child_list().unwrap().is_empty());
}

#[cfg(test)]
#[test]
fn test_closing_tags_are_not_validated() {
    let doc = parse("<div><p>one</div><p>two</p>", &ParseOptions::default()).unwrap();
    // `</div>` closes the `<p>`, leaving the second `<p>` inside the `<div>`
    let div = doc.content().as_node().unwrap();
    let inner: Vec<_> = div.children().filter_map(|n| n.tag_name()).collect();
    assert_eq!(inner, ["p", "p"]);
}

#[cfg(test)]
#[test]
fn test_trim_text() {
    let doc = parse("<p>  padded  </p>", &ParseOptions::default()).unwrap();
    assert_eq!(doc.content().as_node().unwrap().text_content(), "padded");

    let options = ParseOptions {
        trim_text: false,
        ..ParseOptions::default()
    };
    let doc = parse("<p>  padded  </p>\n", &options).unwrap();
    assert_eq!(tags(&doc), ["p"]);
    assert_eq!(doc.top_level().len(), 2);
    assert_eq!(doc.top_level().get(0).unwrap().text_content(), "  padded  ");

    let doc = parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>", &ParseOptions::default()).unwrap();
    assert_eq!(doc.content().as_node().unwrap().children().count(), 2);
}

#[cfg(test)]
#[test]
fn test_comments_and_doctype() {
    let doc = parse("<!DOCTYPE html><div><!-- <div> &amp; --></div>", &ParseOptions::default())
        .unwrap();
    assert_eq!(tags(&doc), ["!DOCTYPE", "div"]);
    let doctype = doc.top_level().get(0).unwrap();
    assert!(doctype.child_list().is_none());
    let div = doc.top_level().get(1).unwrap();
    assert_eq!(div.children().count(), 1);
    assert_eq!(div.child().unwrap().as_text(), Some("<!-- <div> &amp; -->"));
}

#[cfg(test)]
#[test]
fn test_script_body_is_raw() {
    let data = "<script>if (a < b && c) { x = '<p>'; }</script><p>after</p>";
    let doc = parse(data, &ParseOptions::default()).unwrap();
    assert_eq!(tags(&doc), ["script", "p"]);
    let script = doc.top_level().get(0).unwrap();
    assert_eq!(script.children().count(), 1);
    assert_eq!(
        script.child().unwrap().as_text(),
        Some("if (a < b && c) { x = '<p>'; }")
    );
}

#[cfg(test)]
#[test]
fn test_text_escapes() {
    let doc = parse("<p>&amp; &#65; &bogus; &amp fish &#66</p>", &ParseOptions::default()).unwrap();
    assert_eq!(
        doc.content().as_node().unwrap().text_content(),
        "& A &bogus; &amp fish &#66"
    );
}

#[cfg(test)]
#[test]
fn test_parse_errors() {
    assert_eq!(parse("", &ParseOptions::default()).unwrap_err(), Error::EmptyInput);

    let options = ParseOptions {
        max_depth: 3,
        ..ParseOptions::default()
    };
    assert!(parse("<a><b><c></c></b></a>", &options).is_ok());
    assert_eq!(
        parse("<a><b><c><d></d></c></b></a>", &options).unwrap_err(),
        Error::NestingTooDeep { limit: 3 }
    );
}

#[cfg(test)]
#[test]
fn test_parent_links() {
    let doc = parse("<ul><li>a</li><li>b</li></ul>", &ParseOptions::default()).unwrap();
    let ul = doc.content().as_node().unwrap();
    assert!(ul.parent().is_none());
    assert!(doc.is_wrapper(doc.parent_id(ul.id()).unwrap()));
    for li in ul.children() {
        assert_eq!(li.parent(), Some(ul));
        for text in li.children() {
            assert_eq!(text.parent(), Some(li));
        }
    }
}
