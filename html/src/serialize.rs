use super::dom::*;

/// Write a node back out as markup. Text is emitted as stored (entities are not
/// re-encoded); attribute values are always double-quoted.
fn write_node(doc: &Document, id: NodeId, with_attributes: bool, out: &mut String) {
    match &doc.get(id).node_type {
        DOMNodeType::Text(text) => out.push_str(text),
        DOMNodeType::Element(element) => {
            out.push('<');
            out.push_str(&element.tag_name);
            if with_attributes {
                for (name, value) in element.attributes.iter() {
                    out.push(' ');
                    out.push_str(name);
                    if let AttributeValue::Text(value) = value {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
            }
            match &element.children {
                Some(children) => {
                    out.push('>');
                    write_children(doc, children, with_attributes, out);
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                }
                None => out.push_str("/>"),
            }
        }
    }
}

fn write_children(doc: &Document, children: &[NodeId], with_attributes: bool, out: &mut String) {
    for &child in children {
        write_node(doc, child, with_attributes, out);
    }
}

impl<'a> NodeRef<'a> {
    /// The node and everything inside it as markup
    pub fn outer_html(&self) -> String {
        self.serialize(true, true)
    }

    pub fn outer_html_without_attributes(&self) -> String {
        self.serialize(true, false)
    }

    /// Markup of the node's children; a text node yields its text
    pub fn inner_html(&self) -> String {
        self.serialize(false, true)
    }

    pub fn inner_html_without_attributes(&self) -> String {
        self.serialize(false, false)
    }

    fn serialize(&self, outer: bool, with_attributes: bool) -> String {
        let doc = self.document();
        let mut out = String::new();
        if outer || !self.is_element() {
            write_node(doc, self.id(), with_attributes, &mut out);
        } else {
            write_children(doc, doc.children_of(self.id()), with_attributes, &mut out);
        }
        out
    }
}

impl<'a> Content<'a> {
    pub fn outer_html(&self) -> String {
        match self {
            Content::Node(node) => node.outer_html(),
            Content::List(list) => list.outer_html(),
        }
    }

    /// For a list this is the same as [`Content::outer_html`]: the markup the
    /// list would have inside an enclosing element
    pub fn inner_html(&self) -> String {
        match self {
            Content::Node(node) => node.inner_html(),
            Content::List(list) => list.outer_html(),
        }
    }
}

impl<'a> NodeList<'a> {
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_children(self.document(), self.ids(), true, &mut out);
        out
    }
}

#[cfg(test)]
fn reparse(data: &str) -> String {
    crate::document(data).unwrap().content().outer_html()
}

#[cfg(test)]
#[test]
fn test_round_trip() {
    let data = r#"<html lang="en"><head><title>T</title></head><body><p class="a b"><b>Hello</b>world</p><div></div></body></html>"#;
    assert_eq!(reparse(data), data);

    let data = r#"<ul><li>one</li><li>two</li></ul><p>three</p>"#;
    assert_eq!(reparse(data), data);
}

#[cfg(test)]
#[test]
fn test_serialize_normalizes() {
    assert_eq!(reparse("<br>"), "<br/>");
    assert_eq!(reparse("<br/>"), "<br/>");
    assert_eq!(reparse("<input type=checkbox checked>"), r#"<input type="checkbox" checked/>"#);
    assert_eq!(reparse("<a title='say \"hi\"'>x</a>"), r#"<a title="say &quot;hi&quot;">x</a>"#);
    // Decoded text is not re-encoded
    assert_eq!(reparse("<p>a &lt; b</p>"), "<p>a < b</p>");
}

#[cfg(test)]
#[test]
fn test_inner_html() {
    let doc = crate::document(r#"<div id="x"><p class="c">a</p>b<br></div>"#).unwrap();
    let div = doc.content().as_node().unwrap();
    assert_eq!(div.inner_html(), r#"<p class="c">a</p>b<br/>"#);
    assert_eq!(div.inner_html_without_attributes(), "<p>a</p>b<br/>");
    assert_eq!(div.outer_html_without_attributes(), "<div><p>a</p>b<br/></div>");
    let text = div.children().nth(1).unwrap();
    assert_eq!(text.inner_html(), "b");
    let br = div.children().nth(2).unwrap();
    assert_eq!(br.inner_html(), "");
}
