//! Node identity and storage.

use std::fmt;

/// Stable identity of a document node.
///
/// Ids are handed out monotonically and never reused, so a held id either
/// still points at the node it always did or at nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a stored node.
#[derive(Debug)]
pub(crate) enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        /// Live value property. Set by user input and distinct from the
        /// `value` attribute, like a browser input element.
        value: Option<String>,
        children: Vec<NodeId>,
    },
    Text(String),
}

#[derive(Debug)]
pub(crate) struct DomNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) data: NodeData,
}
