//! Markup - parsed node trees and the directive pass.
//!
//! Views return markup as opaque strings. Before the runtime can reconcile
//! that output against the live document it needs structure, so this module
//! provides:
//! - [`parse`]: a small, forgiving HTML-subset parser producing [`MarkupNode`] trees
//! - [`collect_directives`]: the visitor pass that pulls mount points and
//!   event bindings out of a parsed tree
//!
//! The reconciler consumes plain node trees and stays free of attribute
//! conventions; everything `data-*` flavored is resolved here.

mod directives;
mod parser;

pub use directives::*;
pub use parser::parse;

pub(crate) use parser::is_void;

/// Attribute that marks an element as a component mount point.
pub const COMPONENT_ATTR: &str = "data-component";

// =============================================================================
// Node tree
// =============================================================================

/// One node of a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

impl MarkupNode {
    pub fn as_element(&self) -> Option<&MarkupElement> {
        match self {
            MarkupNode::Element(element) => Some(element),
            MarkupNode::Text(_) => None,
        }
    }
}

/// An element node: lowercased tag, attributes in source order, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl MarkupElement {
    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// The component this element mounts, if it is a mount point.
    pub fn component_name(&self) -> Option<&str> {
        self.attr(COMPONENT_ATTR)
    }
}
