use std::collections::{HashMap, HashSet};
use std::fmt;

const DATASET_PREFIX: &str = "data-";

/// Index of a node inside the [`Document`] that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// `name="value"`, `name='value'` or `name=value`
    Text(String),
    /// A bare `name` with no value
    Present,
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Present => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Present => f.write_str("true"),
        }
    }
}

/// Attributes of an element in the order they were written.
/// Setting an existing name replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMAttributes(Vec<(String, AttributeValue)>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, AttributeValue)> for DOMAttributes {
    fn from_iter<I: IntoIterator<Item = (N, AttributeValue)>>(iter: I) -> Self {
        let mut attributes = Self::empty();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// Build [`DOMAttributes`] from `name => value` pairs
#[macro_export]
macro_rules! attributes {
    ($($name:expr => $value:expr),* $(,)?) => {
        $crate::DOMAttributes::from_iter([
            $(($name, $crate::AttributeValue::Text($value.to_string()))),*
        ])
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DOMElement {
    pub tag_name: String,
    pub attributes: DOMAttributes,
    /// `None` for void and self-closing elements, which can never hold children
    pub children: Option<Vec<NodeId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DOMNodeType {
    Element(DOMElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DOMNode {
    pub parent: Option<NodeId>,
    pub node_type: DOMNodeType,
}

/// A parsed tree. Every node lives in one arena; parent links are plain indices.
///
/// Node 0 is an unnamed wrapper element holding the top-level nodes. It is not
/// part of the parse result, but top-level nodes keep it as their raw parent so
/// they can be treated as siblings of one another.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<DOMNode>,
}

impl Document {
    const WRAPPER: NodeId = NodeId(0);

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![DOMNode {
                parent: None,
                node_type: DOMNodeType::Element(DOMElement {
                    tag_name: String::new(),
                    attributes: DOMAttributes::empty(),
                    children: Some(Vec::new()),
                }),
            }],
        }
    }

    pub(crate) fn wrapper(&self) -> NodeId {
        Self::WRAPPER
    }

    pub(crate) fn push(&mut self, node: DOMNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        if let DOMNodeType::Element(element) = &mut self.nodes[id.0].node_type {
            element.children = Some(children);
        }
    }

    /// # Panics
    /// If `id` was not produced by this document
    pub fn get(&self, id: NodeId) -> &DOMNode {
        &self.nodes[id.0]
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    pub fn element(&self, id: NodeId) -> Option<&DOMElement> {
        match &self.get(id).node_type {
            DOMNodeType::Element(element) => Some(element),
            DOMNodeType::Text(_) => None,
        }
    }

    /// The raw parent link, which is the wrapper node for top-level nodes
    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn is_wrapper(&self, id: NodeId) -> bool {
        id == Self::WRAPPER
    }

    /// Children of an element; empty for text nodes and void elements
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.element(id)
            .and_then(|e| e.children.as_deref())
            .unwrap_or(&[])
    }

    pub fn top_level(&self) -> NodeList<'_> {
        NodeList {
            doc: self,
            ids: self.children_of(Self::WRAPPER),
        }
    }

    /// The parse result: the single top-level node, or every top-level node
    /// when there are none or several
    pub fn content(&self) -> Content<'_> {
        let top = self.top_level();
        match top.ids {
            [only] => Content::Node(self.node(*only)),
            _ => Content::List(top),
        }
    }

    /// Number of nodes in the tree, excluding the wrapper
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A borrowed handle to one node of a [`Document`]
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_type() {
            DOMNodeType::Element(e) => write!(f, "<{}>{}", e.tag_name, self.id),
            DOMNodeType::Text(t) => write!(f, "{:?}{}", t, self.id),
        }
    }
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn node_type(&self) -> &'a DOMNodeType {
        &self.doc.get(self.id).node_type
    }

    pub fn as_element(&self) -> Option<&'a DOMElement> {
        self.doc.element(self.id)
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self.node_type() {
            DOMNodeType::Text(text) => Some(text),
            DOMNodeType::Element(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    pub fn tag_name(&self) -> Option<&'a str> {
        self.as_element().map(|e| e.tag_name.as_str())
    }

    pub fn attributes(&self) -> Option<&'a DOMAttributes> {
        self.as_element().map(|e| &e.attributes)
    }

    pub fn attr(&self, name: &str) -> Option<&'a AttributeValue> {
        self.attributes().and_then(|a| a.get(name))
    }

    /// The enclosing element, or `None` at the top level
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc
            .parent_id(self.id)
            .filter(|&p| !self.doc.is_wrapper(p))
            .map(|p| self.doc.node(p))
    }

    /// The children list; `None` for text nodes and void elements
    pub fn child_list(&self) -> Option<NodeList<'a>> {
        self.as_element()
            .and_then(|e| e.children.as_deref())
            .map(|ids| NodeList { doc: self.doc, ids })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.children_of(self.id).iter().map(move |&id| doc.node(id))
    }

    /// First child, for nodes known to hold a single child
    pub fn child(&self) -> Option<NodeRef<'a>> {
        self.children().next()
    }

    /// The `class` attribute split on single spaces
    pub fn classes(&self) -> HashSet<&'a str> {
        match self.attr("class") {
            Some(AttributeValue::Text(classes)) => classes.split(' ').collect(),
            _ => HashSet::new(),
        }
    }

    /// `data-*` attributes keyed by their camel-cased suffix (`data-user-id` → `userId`)
    pub fn dataset(&self) -> HashMap<String, String> {
        self.attributes()
            .into_iter()
            .flat_map(|attrs| attrs.iter())
            .filter_map(|(name, value)| {
                let key = name.strip_prefix(DATASET_PREFIX)?;
                Some((camel_case(key), value.as_str().unwrap_or("").to_string()))
            })
            .collect()
    }

    /// Every descendant text run concatenated depth-first
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self.node_type() {
            DOMNodeType::Text(text) => out.push_str(text),
            DOMNodeType::Element(_) => self.children().for_each(|c| c.push_text(out)),
        }
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// An ordered run of sibling nodes
#[derive(Clone, Copy)]
pub struct NodeList<'a> {
    doc: &'a Document,
    ids: &'a [NodeId],
}

impl fmt::Debug for NodeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> NodeList<'a> {
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn ids(&self) -> &'a [NodeId] {
        self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeRef<'a>> {
        self.ids.get(index).map(|&id| self.doc.node(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.ids.iter().map(move |&id| doc.node(id))
    }
}

/// Either one node or a list of nodes; what a parse returns and what queries run over
#[derive(Clone, Copy, Debug)]
pub enum Content<'a> {
    Node(NodeRef<'a>),
    List(NodeList<'a>),
}

impl<'a> Content<'a> {
    pub fn document(&self) -> &'a Document {
        match self {
            Content::Node(node) => node.doc,
            Content::List(list) => list.doc,
        }
    }

    pub fn as_node(&self) -> Option<NodeRef<'a>> {
        match self {
            Content::Node(node) => Some(*node),
            Content::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<NodeList<'a>> {
        match self {
            Content::List(list) => Some(*list),
            Content::Node(_) => None,
        }
    }

    pub fn nodes(&self) -> Vec<NodeRef<'a>> {
        match self {
            Content::Node(node) => vec![*node],
            Content::List(list) => list.iter().collect(),
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            node.push_text(&mut out);
        }
        out
    }
}

impl<'a> From<NodeRef<'a>> for Content<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        Content::Node(node)
    }
}

impl<'a> From<NodeList<'a>> for Content<'a> {
    fn from(list: NodeList<'a>) -> Self {
        Content::List(list)
    }
}

impl<'a> From<&'a Document> for Content<'a> {
    fn from(doc: &'a Document) -> Self {
        doc.content()
    }
}

#[cfg(test)]
#[test]
fn test_attributes_keep_order() {
    let mut attrs = DOMAttributes::empty();
    attrs.insert("b", AttributeValue::Text("1".into()));
    attrs.insert("a", AttributeValue::Present);
    attrs.insert("b", AttributeValue::Text("2".into()));
    let names: Vec<&str> = attrs.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(attrs.get("b"), Some(&AttributeValue::Text("2".into())));
    assert_eq!(
        attributes!("lang" => "en", "class" => "a b"),
        DOMAttributes::from_iter([
            ("lang", AttributeValue::Text("en".into())),
            ("class", AttributeValue::Text("a b".into())),
        ])
    );
}

#[cfg(test)]
#[test]
fn test_camel_case() {
    assert_eq!(camel_case("user-id"), "userId");
    assert_eq!(camel_case("a-b-c"), "aBC");
    assert_eq!(camel_case("plain"), "plain");
    assert_eq!(camel_case("trailing-"), "trailing-");
    assert_eq!(camel_case("x-1"), "x-1");
}
