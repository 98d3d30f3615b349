/*!
 * Arena-backed XML tree used as the write-back substrate.
 *
 * The tree is built from `quick-xml` events and keeps every node in its raw
 * textual form: text stays escaped exactly as it appeared in the file, start
 * tags keep their attribute text verbatim. Serializing an untouched tree
 * therefore reproduces the input, and only nodes that were explicitly
 * replaced come out differently.
 *
 * Nodes are never removed from the arena. A `NodeId` obtained before a
 * replacement stays valid afterwards; detached subtrees are simply no longer
 * reachable from the document node.
 */

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{XliffError, XliffResult};

// @const: Byte order mark emitted back when the input carried one
const BOM: char = '\u{feff}';

/// Handle to a node inside a [`Dom`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element node
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written, e.g. `mrk` or `sdl:seg`
    pub name: String,

    /// Namespace URI the name resolves to
    pub namespace: Option<String>,

    /// Everything between the name and the closing `>` (or `/>`), verbatim
    pub raw_attributes: String,

    /// Attribute names with unescaped values, in document order
    pub attributes: Vec<(String, String)>,

    /// Written as `<name/>`
    pub self_closing: bool,
}

impl Element {
    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Unescaped value of the attribute with the given qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Kind and payload of a node; every textual payload is raw markup
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Stack of in-scope namespace declarations
struct NamespaceScopes {
    scopes: Vec<Vec<(Option<String>, String)>>,
}

impl NamespaceScopes {
    fn new(inherited_default: Option<&str>) -> Self {
        let base = inherited_default
            .map(|uri| vec![(None, uri.to_string())])
            .unwrap_or_default();
        Self { scopes: vec![base] }
    }

    fn push(&mut self, attributes: &[(String, String)]) {
        let declared = attributes
            .iter()
            .filter_map(|(key, value)| {
                if key == "xmlns" {
                    Some((None, value.clone()))
                } else {
                    key.strip_prefix("xmlns:")
                        .map(|prefix| (Some(prefix.to_string()), value.clone()))
                }
            })
            .collect();
        self.scopes.push(declared);
    }

    fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn resolve(&self, qualified_name: &str) -> Option<String> {
        let prefix = qualified_name.split_once(':').map(|(prefix, _)| prefix);
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(declared, _)| declared.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }
}

/// Lossless XML tree
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    has_bom: bool,
}

impl Dom {
    // @const: The document node is always the first arena slot
    const DOCUMENT: NodeId = NodeId(0);

    /// Parse a complete document
    pub fn parse(text: &str, origin: &str) -> XliffResult<Self> {
        Self::parse_with(text, origin, None)
    }

    /// Parse a single-element fragment whose unprefixed names inherit
    /// `default_namespace`, as they would once grafted into a document
    pub fn parse_fragment(markup: &str, default_namespace: Option<&str>) -> XliffResult<Self> {
        Self::parse_with(markup, "inline fragment", default_namespace)
    }

    fn parse_with(text: &str, origin: &str, inherited_namespace: Option<&str>) -> XliffResult<Self> {
        let (has_bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut dom = Dom {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            has_bom,
        };

        let mut reader = Reader::from_str(body);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut open = vec![Self::DOCUMENT];
        let mut scopes = NamespaceScopes::new(inherited_namespace);
        let mut root_seen = false;

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| {
                XliffError::not_well_formed(origin, format!("{} (near byte {})", e, position))
            })?;
            let parent = open.last().copied().unwrap_or(Self::DOCUMENT);
            let at_top_level = parent == Self::DOCUMENT;

            match event {
                Event::Start(start) | Event::Empty(start) if at_top_level && root_seen => {
                    let name = utf8(start.name().as_ref(), origin)?;
                    return Err(XliffError::not_well_formed(
                        origin,
                        format!("second root element <{}> near byte {}", name, position),
                    ));
                }
                Event::Start(start) => {
                    root_seen |= at_top_level;
                    let element = build_element(&start, &mut scopes, origin, false)?;
                    let id = dom.push(parent, NodeKind::Element(element));
                    open.push(id);
                }
                Event::Empty(start) => {
                    root_seen |= at_top_level;
                    let element = build_element(&start, &mut scopes, origin, true)?;
                    scopes.pop();
                    dom.push(parent, NodeKind::Element(element));
                }
                Event::End(end) => {
                    if at_top_level {
                        let name = utf8(end.name().as_ref(), origin)?;
                        return Err(XliffError::not_well_formed(
                            origin,
                            format!("unexpected closing tag </{}> near byte {}", name, position),
                        ));
                    }
                    open.pop();
                    scopes.pop();
                }
                Event::Text(text) => {
                    let raw = utf8(&text, origin)?;
                    if at_top_level && !raw.trim().is_empty() {
                        return Err(XliffError::not_well_formed(
                            origin,
                            format!("text outside the root element near byte {}", position),
                        ));
                    }
                    dom.push(parent, NodeKind::Text(raw));
                }
                Event::CData(data) => {
                    let raw = utf8(&data, origin)?;
                    dom.push(parent, NodeKind::CData(raw));
                }
                Event::Comment(comment) => {
                    let raw = utf8(&comment, origin)?;
                    dom.push(parent, NodeKind::Comment(raw));
                }
                Event::Decl(declaration) => {
                    let raw = utf8(&declaration, origin)?;
                    dom.push(parent, NodeKind::Declaration(raw));
                }
                Event::PI(instruction) => {
                    let raw = utf8(&instruction, origin)?;
                    dom.push(parent, NodeKind::ProcessingInstruction(raw));
                }
                Event::DocType(doctype) => {
                    let raw = utf8(&doctype, origin)?;
                    dom.push(parent, NodeKind::DocType(raw));
                }
                Event::Eof => break,
            }
        }

        if let Some(&unclosed) = open.last().filter(|&&id| id != Self::DOCUMENT) {
            let name = dom.element(unclosed).map(|e| e.name.clone()).unwrap_or_default();
            return Err(XliffError::not_well_formed(
                origin,
                format!("element <{}> is never closed", name),
            ));
        }
        if !root_seen {
            return Err(XliffError::not_well_formed(origin, "no root element"));
        }

        Ok(dom)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The top-level element
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(Self::DOCUMENT)
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    /// Whether the document starts with an XML declaration
    pub fn has_declaration(&self) -> bool {
        self.children(Self::DOCUMENT)
            .iter()
            .any(|&id| matches!(self.kind(id), NodeKind::Declaration(_)))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children only
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.element(child).is_some())
    }

    /// All element descendants in document order, excluding `id` itself
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.element(current).is_some() {
                found.push(current);
                stack.extend(self.children(current).iter().rev().copied());
            }
        }
        found
    }

    /// Unescaped attribute value of an element node
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// Raw markup of the text and CDATA nodes directly following the element.
    ///
    /// `<a/> x<![CDATA[y]]>z<b/>` gives ` x<![CDATA[y]]>z` for `a`.
    pub fn tail(&self, id: NodeId) -> Option<String> {
        let (parent, start, run) = self.tail_run(id)?;
        if run == 0 {
            return None;
        }
        let mut out = String::new();
        for &sibling in &self.children(parent)[start..start + run] {
            self.write_node(sibling, &mut out);
        }
        Some(out)
    }

    // Parent, index of the first sibling after `id`, and how many text or
    // CDATA siblings follow in a row
    fn tail_run(&self, id: NodeId) -> Option<(NodeId, usize, usize)> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let start = siblings.iter().position(|&sibling| sibling == id)? + 1;
        let run = siblings[start..]
            .iter()
            .take_while(|&&sibling| matches!(self.kind(sibling), NodeKind::Text(_) | NodeKind::CData(_)))
            .count();
        Some((parent, start, run))
    }

    /// Serialized markup of the element's children
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Replace `target` in place with the root element of `fragment`.
    ///
    /// The target keeps its position and its `NodeId`; its previous children
    /// are detached.
    pub fn replace_element(&mut self, target: NodeId, fragment: &Dom) -> XliffResult<()> {
        let source = fragment
            .root_element()
            .ok_or_else(|| XliffError::not_well_formed("inline fragment", "no root element"))?;
        let replacement = fragment.nodes[source.0].kind.clone();
        if self.element(target).is_none() {
            return Err(XliffError::not_well_formed(
                "inline fragment",
                "replacement target is not an element",
            ));
        }

        for old_child in std::mem::take(&mut self.nodes[target.0].children) {
            self.nodes[old_child.0].parent = None;
        }
        self.nodes[target.0].kind = replacement;
        for &child in fragment.children(source) {
            self.import(fragment, child, target);
        }
        Ok(())
    }

    fn import(&mut self, source: &Dom, source_id: NodeId, parent: NodeId) -> NodeId {
        let id = self.push(parent, source.kind(source_id).clone());
        for &child in source.children(source_id) {
            self.import(source, child, id);
        }
        id
    }

    /// Replace the text and CDATA run following `id` with one raw text node;
    /// an empty tail removes the run
    pub fn set_tail(&mut self, id: NodeId, tail: &str) {
        let Some((parent, start, run)) = self.tail_run(id) else {
            return;
        };
        let removed: Vec<NodeId> = self.nodes[parent.0].children.drain(start..start + run).collect();
        for node in removed {
            self.nodes[node.0].parent = None;
        }

        if !tail.is_empty() {
            let text = NodeId(self.nodes.len());
            self.nodes.push(Node {
                kind: NodeKind::Text(tail.to_string()),
                parent: Some(parent),
                children: Vec::new(),
            });
            self.nodes[parent.0].children.insert(start, text);
        }
    }

    /// Serialize the whole document
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        if self.has_bom {
            out.push(BOM);
        }
        for &child in self.children(Self::DOCUMENT) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                out.push_str(&element.raw_attributes);
                if element.self_closing && self.children(id).is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            NodeKind::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction(raw) | NodeKind::Declaration(raw) => {
                out.push_str("<?");
                out.push_str(raw);
                out.push_str("?>");
            }
            NodeKind::DocType(raw) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(raw);
                out.push('>');
            }
        }
    }
}

fn build_element(
    start: &BytesStart<'_>,
    scopes: &mut NamespaceScopes,
    origin: &str,
    self_closing: bool,
) -> XliffResult<Element> {
    let name_len = start.name().as_ref().len();
    let content: &[u8] = start;
    let name = utf8(&content[..name_len], origin)?;
    let raw_attributes = utf8(&content[name_len..], origin)?;

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| {
            XliffError::not_well_formed(origin, format!("bad attribute in <{}>: {}", name, e))
        })?;
        let key = utf8(attribute.key.as_ref(), origin)?;
        let value = attribute
            .unescape_value()
            .map_err(|e| {
                XliffError::not_well_formed(origin, format!("bad value for {} in <{}>: {}", key, name, e))
            })?
            .into_owned();
        attributes.push((key, value));
    }

    scopes.push(&attributes);
    let namespace = scopes.resolve(&name);

    Ok(Element {
        name,
        namespace,
        raw_attributes,
        attributes,
        self_closing,
    })
}

fn utf8(bytes: &[u8], origin: &str) -> XliffResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XliffError::not_well_formed(origin, format!("invalid UTF-8: {}", e)))
}
