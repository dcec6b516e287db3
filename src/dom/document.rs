//! In-memory document.
//!
//! A small stand-in for the browser document the runtime renders into:
//! elements, text nodes, attributes, a live `value` property and a focus
//! slot. [`Document`] is a cheap-to-clone handle; all clones share one
//! tree, so the runtime and tests can hold it side by side.
//!
//! Mutations on missing nodes are logged and skipped rather than panicking;
//! a stale id is a caller bug worth surfacing but never worth crashing a
//! render loop over.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::error::MarkupError;
use crate::markup::{self, COMPONENT_ATTR, MarkupNode};

use super::node::{DomNode, NodeData, NodeId};

// =============================================================================
// Document handle
// =============================================================================

/// Shared handle to one document tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentState>>,
}

struct DocumentState {
    slots: Vec<Option<DomNode>>,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with a `<body>` element at the root.
    pub fn new() -> Self {
        let body = DomNode {
            parent: None,
            data: NodeData::Element {
                tag: "body".to_string(),
                attrs: Vec::new(),
                value: None,
                children: Vec::new(),
            },
        };
        Self {
            inner: Rc::new(RefCell::new(DocumentState {
                slots: vec![Some(body)],
                body: NodeId(0),
                focused: None,
            })),
        }
    }

    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    /// Replace the body's content with parsed markup.
    pub fn set_body_markup(&self, markup_text: &str) -> Result<(), MarkupError> {
        let nodes = markup::parse(markup_text)?;
        let body = self.body();
        self.remove_children(body);
        for node in &nodes {
            let built = self.build(node);
            self.append_child(body, built);
        }
        Ok(())
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Detached element node.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.insert(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: None,
            children: Vec::new(),
        })
    }

    /// Detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.insert(NodeData::Text(text.to_string()))
    }

    /// Detached subtree built from parsed markup.
    pub fn build(&self, node: &MarkupNode) -> NodeId {
        match node {
            MarkupNode::Text(text) => self.create_text(text),
            MarkupNode::Element(element) => {
                let id = self.create_element(&element.tag);
                for (name, value) in &element.attrs {
                    self.set_attr(id, name, value);
                }
                for child in &element.children {
                    let built = self.build(child);
                    self.append_child(id, built);
                }
                id
            }
        }
    }

    fn insert(&self, data: NodeData) -> NodeId {
        let mut state = self.inner.borrow_mut();
        let id = NodeId(state.slots.len());
        state.slots.push(Some(DomNode { parent: None, data }));
        id
    }

    // =========================================================================
    // Tree mutation
    // =========================================================================

    /// Append `child` to `parent`'s children, detaching it first if needed.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut state = self.inner.borrow_mut();
        let parent_is_element = matches!(
            state.node(parent).map(|node| &node.data),
            Some(NodeData::Element { .. })
        );
        if !parent_is_element || state.node(child).is_none() {
            tracing::warn!(%parent, %child, "append_child on missing or non-element node");
            return;
        }
        if let Some(node) = state.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(NodeData::Element { children, .. }) =
            state.node_mut(parent).map(|node| &mut node.data)
        {
            children.push(child);
        }
    }

    /// Put `new` where `old` sits, dropping `old`'s subtree.
    pub fn replace(&self, old: NodeId, new: NodeId) {
        self.detach(new);
        let mut state = self.inner.borrow_mut();
        let Some(parent) = state.node(old).and_then(|node| node.parent) else {
            tracing::warn!(%old, "replace on detached or missing node");
            return;
        };
        if state.node(new).is_none() {
            tracing::warn!(%new, "replace with missing node");
            return;
        }
        if let Some(NodeData::Element { children, .. }) =
            state.node_mut(parent).map(|node| &mut node.data)
        {
            if let Some(slot) = children.iter_mut().find(|id| **id == old) {
                *slot = new;
            }
        }
        if let Some(node) = state.node_mut(new) {
            node.parent = Some(parent);
        }
        if let Some(node) = state.node_mut(old) {
            node.parent = None;
        }
        state.drop_subtree(old);
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&self, node: NodeId) {
        self.detach(node);
        self.inner.borrow_mut().drop_subtree(node);
    }

    /// Drop all children of `node`.
    pub fn remove_children(&self, node: NodeId) {
        let mut state = self.inner.borrow_mut();
        let removed = match state.node_mut(node).map(|n| &mut n.data) {
            Some(NodeData::Element { children, .. }) => std::mem::take(children),
            _ => return,
        };
        for child in removed {
            state.drop_subtree(child);
        }
    }

    /// Take `child` out of its parent's child list without deleting it.
    fn detach(&self, child: NodeId) {
        let mut state = self.inner.borrow_mut();
        let Some(parent) = state.node(child).and_then(|node| node.parent) else {
            return;
        };
        if let Some(NodeData::Element { children, .. }) =
            state.node_mut(parent).map(|node| &mut node.data)
        {
            children.retain(|&id| id != child);
        }
        if let Some(node) = state.node_mut(child) {
            node.parent = None;
        }
    }

    // =========================================================================
    // Node accessors
    // =========================================================================

    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().node(node).is_some()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.inner.borrow().node(node).map(|n| &n.data),
            Some(NodeData::Element { .. })
        )
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(
            self.inner.borrow().node(node).map(|n| &n.data),
            Some(NodeData::Text(_))
        )
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        match self.inner.borrow().node(node).map(|n| &n.data) {
            Some(NodeData::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().children_of(node).to_vec()
    }

    /// Follow child indexes from `root` down to a node.
    pub fn child_at_path(&self, root: NodeId, path: &[usize]) -> Option<NodeId> {
        let state = self.inner.borrow();
        let mut current = root;
        for &index in path {
            current = *state.children_of(current).get(index)?;
        }
        Some(current)
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        match self.inner.borrow().node(node).map(|n| &n.data) {
            Some(NodeData::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        let mut state = self.inner.borrow_mut();
        match state.node_mut(node).map(|n| &mut n.data) {
            Some(NodeData::Text(slot)) => *slot = text.to_string(),
            _ => tracing::warn!(%node, "set_text on non-text node"),
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let state = self.inner.borrow();
        let mut out = String::new();
        state.collect_text(node, &mut out);
        out
    }

    /// Live node count, mostly for leak checks in tests.
    pub fn node_count(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    // =========================================================================
    // Attributes and the value property
    // =========================================================================

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        let state = self.inner.borrow();
        match state.node(node).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// All attributes in source order.
    pub fn attrs(&self, node: NodeId) -> Vec<(String, String)> {
        let state = self.inner.borrow();
        match state.node(node).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs.clone(),
            _ => Vec::new(),
        }
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        let mut state = self.inner.borrow_mut();
        let Some(NodeData::Element { attrs, .. }) = state.node_mut(node).map(|n| &mut n.data)
        else {
            tracing::warn!(%node, name, "set_attr on non-element");
            return;
        };
        let name = name.to_ascii_lowercase();
        match attrs.iter_mut().find(|(attr, _)| *attr == name) {
            Some((_, slot)) => *slot = value.to_string(),
            None => attrs.push((name, value.to_string())),
        }
    }

    pub fn remove_attr(&self, node: NodeId, name: &str) {
        let mut state = self.inner.borrow_mut();
        if let Some(NodeData::Element { attrs, .. }) = state.node_mut(node).map(|n| &mut n.data) {
            attrs.retain(|(attr, _)| attr != name);
        }
    }

    /// The element's live value: the value property if user input set one,
    /// else the `value` attribute, else empty.
    pub fn value(&self, node: NodeId) -> String {
        let state = self.inner.borrow();
        match state.node(node).map(|n| &n.data) {
            Some(NodeData::Element { value, attrs, .. }) => value
                .clone()
                .or_else(|| {
                    attrs
                        .iter()
                        .find(|(name, _)| name == "value")
                        .map(|(_, v)| v.clone())
                })
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Set the live value property, the way user input would.
    pub fn set_value(&self, node: NodeId, new_value: &str) {
        let mut state = self.inner.borrow_mut();
        match state.node_mut(node).map(|n| &mut n.data) {
            Some(NodeData::Element { value, .. }) => *value = Some(new_value.to_string()),
            _ => tracing::warn!(%node, "set_value on non-element"),
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focus(&self, node: NodeId) {
        let mut state = self.inner.borrow_mut();
        if matches!(
            state.node(node).map(|n| &n.data),
            Some(NodeData::Element { .. })
        ) {
            state.focused = Some(node);
        } else {
            tracing::warn!(%node, "focus on non-element");
        }
    }

    pub fn blur(&self) {
        self.inner.borrow_mut().focused = None;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.borrow().focused
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// First element in document order carrying `data-component="name"`.
    pub fn component_node(&self, name: &str) -> Option<NodeId> {
        let state = self.inner.borrow();
        state.find_from(state.body, &|data| {
            matches!(
                data,
                NodeData::Element { attrs, .. }
                    if attrs.iter().any(|(attr, value)| attr == COMPONENT_ATTR && value == name)
            )
        })
    }

    /// First element in document order with the given `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let state = self.inner.borrow();
        state.find_from(state.body, &|data| {
            matches!(
                data,
                NodeData::Element { attrs, .. }
                    if attrs.iter().any(|(attr, value)| attr == "id" && value == id)
            )
        })
    }

    /// First element in document order with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        let wanted = tag.to_ascii_lowercase();
        let state = self.inner.borrow();
        state.find_from(state.body, &|data| {
            matches!(data, NodeData::Element { tag, .. } if *tag == wanted)
        })
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialized markup of a subtree, for tests and logs.
    pub fn outer_html(&self, node: NodeId) -> String {
        let state = self.inner.borrow();
        let mut out = String::new();
        state.write_html(node, &mut out);
        out
    }

    /// Serialized markup of the body's children.
    pub fn body_html(&self) -> String {
        let state = self.inner.borrow();
        let mut out = String::new();
        for &child in state.children_of(state.body) {
            state.write_html(child, &mut out);
        }
        out
    }
}

// =============================================================================
// Shared state
// =============================================================================

impl DocumentState {
    fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Element { children, .. }) => children,
            _ => &[],
        }
    }

    /// Vacate a subtree's slots. Ids are never reissued.
    fn drop_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.focused == Some(id) {
                self.focused = None;
            }
            let Some(slot) = self.slots.get_mut(id.0) else {
                continue;
            };
            if let Some(node) = slot.take() {
                if let NodeData::Element { children, .. } = node.data {
                    stack.extend(children);
                }
            }
        }
    }

    /// Preorder search from `root`, root included.
    fn find_from(&self, root: NodeId, matches: &dyn Fn(&NodeData) -> bool) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if matches(&node.data) {
                return Some(id);
            }
            if let NodeData::Element { children, .. } = &node.data {
                for &child in children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        None
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element { children, .. }) => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element {
                tag,
                attrs,
                children,
                ..
            }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{}\"", value.replace('"', "&quot;"));
                    }
                }
                out.push('>');
                if markup::is_void(tag) {
                    return;
                }
                for &child in children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            None => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
