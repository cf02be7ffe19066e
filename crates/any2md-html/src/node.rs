//! Read-only document tree handed to the rule engine.
//!
//! Any HTML parser can build this structure; [`crate::parse_html`] does so
//! with scraper/html5ever. Element names and attribute names are stored in
//! lowercase.

use std::cell::RefCell;

use indexmap::IndexMap;

/// Elements whose text never reaches the output
pub const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript"];

/// Node kinds the renderer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Document,
}

/// A node of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub node_type: NodeType,

    /// Lowercase tag name for elements, `#text` or `#document` otherwise
    pub name: String,

    /// Text content for text nodes
    pub value: Option<String>,

    /// Attributes in source order
    pub attributes: IndexMap<String, String>,

    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            name: tag_name.to_lowercase(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            name: "#text".to_string(),
            value: Some(content.to_string()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an empty document root
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            name: "#document".to_string(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Tag name (lowercase); `#text` / `#document` for other nodes
    pub fn tag_name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name.to_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// All nodes below this one in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Element descendants with the given tag name, in document order
    pub fn find<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.descendants()
            .filter(move |n| n.is_element() && n.name == tag)
    }

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> String {
        if let Some(value) = self.value.as_deref() {
            return value.to_string();
        }
        self.descendants()
            .filter_map(|n| n.value.as_deref())
            .collect()
    }

    /// Like [`Node::text_content`], but skips `script`, `style` and
    /// `noscript` subtrees
    pub fn visible_text(&self) -> String {
        let mut text = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_element() && HIDDEN_TAGS.contains(&node.name.as_str()) {
                continue;
            }
            if let Some(value) = node.value.as_deref() {
                text.push_str(value);
            }
            stack.extend(node.children.iter().rev());
        }
        text
    }

    /// Height of the subtree rooted here; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        max
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Reference link definitions collected while rendering one document
#[derive(Debug, Default)]
pub struct References {
    definitions: RefCell<Vec<String>>,
}

impl References {
    /// Record a definition and return its 1-based number
    pub fn push(&self, definition: String) -> usize {
        let mut definitions = self.definitions.borrow_mut();
        definitions.push(definition);
        definitions.len()
    }

    /// Number of definitions recorded so far
    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.definitions.into_inner()
    }
}

/// A reference to a node with its ancestor chain.
///
/// The chain lives on the renderer's stack, so rules can look upwards
/// without the tree storing parent pointers.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
    /// Position among the parent's element children
    index: usize,
    references: &'a References,
}

impl<'a> NodeRef<'a> {
    /// Create a root NodeRef without parent context
    pub fn new(node: &'a Node, references: &'a References) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
            references,
        }
    }

    /// NodeRef for an element child of this node
    pub fn child<'b>(&'b self, node: &'b Node, index: usize) -> NodeRef<'b> {
        NodeRef {
            node,
            parent: Some(self),
            index,
            references: self.references,
        }
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.map(|p| p.node.tag_name())
    }

    /// Position among the parent's element children
    pub fn index(&self) -> usize {
        self.index
    }

    /// Nearest ancestor (or self) with the given tag
    pub fn closest(&self, tag: &str) -> Option<&NodeRef<'a>> {
        if self.node.tag_name() == tag {
            return Some(self);
        }
        let mut current = self.parent;
        while let Some(node) = current {
            if node.node.tag_name() == tag {
                return Some(node);
            }
            current = node.parent;
        }
        None
    }

    /// Whether any strict ancestor has the given tag
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.parent.is_some_and(|p| p.closest(tag).is_some())
    }

    /// Store a reference link definition for the current document
    pub fn add_reference(&self, definition: String) -> usize {
        self.references.push(definition)
    }

    /// Number of reference definitions recorded so far
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node.has_attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.element_children()
    }

    pub fn visible_text(&self) -> String {
        self.node.visible_text()
    }
}
