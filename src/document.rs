//! In-memory vector document tree.
//!
//! Parsing goes through quick-xml; serialization is hand-written so that text,
//! comments and declarations round-trip byte-for-byte while attribute values
//! are re-escaped.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// A graphic element with its attributes in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Any node of the document. Non-element content is kept raw (still escaped).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

/// Index of an element in depth-first pre-order, root = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A parsed vector document: top-level nodes around exactly one root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter, used mostly in tests.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite an attribute in place, or append it when missing.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Element name without a namespace prefix (`svg:rect` -> `rect`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Number of elements in this subtree, including self.
    fn subtree_len(&self) -> usize {
        1 + self.child_elements().map(Element::subtree_len).sum::<usize>()
    }
}

impl Document {
    /// Parse document text. Fails on malformed XML or when the root element is
    /// not `svg`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut roots = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| parse_error(&reader, e))?;
            let node = match event {
                Event::Start(e) => {
                    stack.push(start_element(&reader, &e)?);
                    continue;
                }
                Event::End(_) => match stack.pop() {
                    Some(done) => Node::Element(done),
                    None => return Err(Error::Parse("unbalanced end tag".into())),
                },
                Event::Empty(e) => Node::Element(start_element(&reader, &e)?),
                Event::Text(e) => Node::Text(String::from_utf8_lossy(&e).into_owned()),
                Event::GeneralRef(e) => {
                    Node::Text(format!("&{};", String::from_utf8_lossy(&e)))
                }
                Event::CData(e) => Node::CData(String::from_utf8_lossy(&e).into_owned()),
                Event::Comment(e) => Node::Comment(String::from_utf8_lossy(&e).into_owned()),
                Event::PI(e) => {
                    Node::ProcessingInstruction(String::from_utf8_lossy(&e).into_owned())
                }
                Event::Decl(e) => Node::Declaration(String::from_utf8_lossy(&e).into_owned()),
                Event::DocType(e) => Node::DocType(String::from_utf8_lossy(&e).into_owned()),
                Event::Eof => break,
            };
            match stack.last_mut() {
                Some(parent) => push_merging_text(&mut parent.children, node),
                None => {
                    if matches!(node, Node::Element(_)) {
                        roots += 1;
                    }
                    push_merging_text(&mut nodes, node);
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::Parse("unexpected end of input inside element".into()));
        }
        if roots != 1 {
            return Err(Error::Parse(format!("expected one root element, found {roots}")));
        }
        let doc = Self { nodes };
        if doc.root().local_name() != "svg" {
            return Err(Error::Parse(format!(
                "root element is <{}>, expected <svg>",
                doc.root().name
            )));
        }
        Ok(doc)
    }

    /// Build a document directly from a root element.
    pub fn from_root(root: Element) -> Self {
        Self {
            nodes: vec![Node::Element(root)],
        }
    }

    pub fn root(&self) -> &Element {
        self.nodes
            .iter()
            .find_map(|n| match n {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or(&EMPTY_ROOT)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Depth-first pre-order walk over every element.
    pub fn walk<'a>(&'a self, mut f: impl FnMut(NodeId, &'a Element)) {
        fn go<'a>(el: &'a Element, next: &mut usize, f: &mut impl FnMut(NodeId, &'a Element)) {
            f(NodeId(*next), el);
            *next += 1;
            for child in el.child_elements() {
                go(child, next, f);
            }
        }
        let mut next = 0;
        go(self.root(), &mut next, &mut f);
    }

    /// Mutable pre-order walk, same ordering as [`Document::walk`].
    pub fn walk_mut(&mut self, mut f: impl FnMut(NodeId, &mut Element)) {
        fn go(el: &mut Element, next: &mut usize, f: &mut impl FnMut(NodeId, &mut Element)) {
            f(NodeId(*next), el);
            *next += 1;
            for child in el.child_elements_mut() {
                go(child, next, f);
            }
        }
        let mut next = 0;
        if let Some(root) = self.root_mut() {
            go(root, &mut next, &mut f);
        }
    }

    pub fn element_count(&self) -> usize {
        self.root().subtree_len()
    }

    /// Look up an element and the chain of its ancestors (nearest first).
    pub fn element_with_ancestors(&self, id: NodeId) -> Option<(&Element, Vec<&Element>)> {
        let mut current = self.root();
        let mut base = 0usize;
        let mut ancestors = Vec::new();
        loop {
            if base == id.0 {
                ancestors.reverse();
                return Some((current, ancestors));
            }
            // skip self, then find the child subtree containing the target
            let mut offset = base + 1;
            let mut next = None;
            for child in current.child_elements() {
                let len = child.subtree_len();
                if id.0 < offset + len {
                    next = Some(child);
                    break;
                }
                offset += len;
            }
            ancestors.push(current);
            current = next?;
            base = offset;
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.element_with_ancestors(id).map(|(el, _)| el)
    }

    /// Serialize back to text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node);
        }
        out
    }
}

static EMPTY_ROOT: Element = Element {
    name: String::new(),
    attributes: Vec::new(),
    children: Vec::new(),
};

fn parse_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> Error {
    Error::Parse(format!("at byte {}: {err}", reader.buffer_position()))
}

fn start_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(reader, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| parse_error(reader, e))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Entity references arrive as separate events; glue them back onto the
/// surrounding text so a text run stays one node.
fn push_merging_text(nodes: &mut Vec<Node>, node: Node) {
    if let (Some(Node::Text(prev)), Node::Text(next)) = (nodes.last_mut(), &node) {
        prev.push_str(next);
        return;
    }
    nodes.push(node);
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(raw) => out.push_str(raw),
        Node::CData(raw) => {
            out.push_str("<![CDATA[");
            out.push_str(raw);
            out.push_str("]]>");
        }
        Node::Comment(raw) => {
            out.push_str("<!--");
            out.push_str(raw);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(raw) | Node::Declaration(raw) => {
            out.push_str("<?");
            out.push_str(raw);
            out.push_str("?>");
        }
        Node::DocType(raw) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(raw.trim_start());
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}
