//! Minimal-diff reconciler.
//!
//! Compares a freshly parsed markup tree against the live children of a
//! target node and only touches what differs. Untouched nodes keep their
//! identity, which is what keeps focus and typed-in input values alive
//! across re-renders.
//!
//! # Algorithm
//!
//! Children are matched by position, per pair:
//! 1. Kind or tag differs: replace the whole live subtree
//! 2. Both text: patch the text node in place if it changed
//! 3. Same tag: patch attributes in place, then recurse into children
//! 4. Extra new nodes are appended; extra live nodes are removed
//!
//! Elements carrying `data-component` are opaque boundaries: their
//! attributes are patched like any element's, but their children belong to
//! the mounted component's own render passes and are never entered.
//!
//! The reconciler consumes plain node trees. Event bindings and mount
//! directives were already collected by the time it runs; nothing here
//! inspects attribute conventions beyond the boundary check.

use crate::dom::{Document, NodeId};
use crate::markup::{MarkupElement, MarkupNode};

// =============================================================================
// Patch accounting
// =============================================================================

bitflags::bitflags! {
    /// What a patch pass touched, as a bitfield for cheap comparison.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PatchFlags: u8 {
        const TEXT = 1 << 0;
        const ATTRS = 1 << 1;
        const STRUCTURE = 1 << 2;
    }
}

/// Counters for one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchStats {
    pub flags: PatchFlags,
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_replaced: usize,
    pub texts_updated: usize,
    pub attrs_updated: usize,
}

impl PatchStats {
    /// Whether the pass changed the document at all.
    pub fn changed(&self) -> bool {
        !self.flags.is_empty()
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Patch `target`'s children to match `new_nodes`, touching only what
/// differs. The target node itself is never modified.
pub fn reconcile(doc: &Document, target: NodeId, new_nodes: &[MarkupNode]) -> PatchStats {
    let mut stats = PatchStats::default();
    patch_children(doc, target, new_nodes, &mut stats);
    tracing::trace!(%target, ?stats, "reconciled");
    stats
}

fn patch_children(
    doc: &Document,
    parent: NodeId,
    new_nodes: &[MarkupNode],
    stats: &mut PatchStats,
) {
    let live = doc.children(parent);
    let shared = live.len().min(new_nodes.len());
    for index in 0..shared {
        patch_node(doc, live[index], &new_nodes[index], stats);
    }
    for node in &new_nodes[shared..] {
        let built = doc.build(node);
        doc.append_child(parent, built);
        stats.nodes_added += 1;
        stats.flags |= PatchFlags::STRUCTURE;
    }
    for &stale in &live[shared..] {
        doc.remove(stale);
        stats.nodes_removed += 1;
        stats.flags |= PatchFlags::STRUCTURE;
    }
}

fn patch_node(doc: &Document, live: NodeId, new: &MarkupNode, stats: &mut PatchStats) {
    match new {
        MarkupNode::Text(text) => {
            if doc.is_text(live) {
                if doc.text(live).as_deref() != Some(text) {
                    doc.set_text(live, text);
                    stats.texts_updated += 1;
                    stats.flags |= PatchFlags::TEXT;
                }
            } else {
                replace(doc, live, new, stats);
            }
        }
        MarkupNode::Element(element) => match doc.tag(live) {
            Some(tag) if tag == element.tag => {
                patch_attrs(doc, live, element, stats);
                // Mount boundary: the child component owns everything below.
                if element.component_name().is_none() {
                    patch_children(doc, live, &element.children, stats);
                }
            }
            _ => replace(doc, live, new, stats),
        },
    }
}

fn patch_attrs(doc: &Document, live: NodeId, element: &MarkupElement, stats: &mut PatchStats) {
    let current = doc.attrs(live);
    for (name, value) in &element.attrs {
        let unchanged = current
            .iter()
            .any(|(attr, existing)| attr == name && existing == value);
        if !unchanged {
            doc.set_attr(live, name, value);
            stats.attrs_updated += 1;
            stats.flags |= PatchFlags::ATTRS;
        }
    }
    for (name, _) in &current {
        if element.attr(name).is_none() {
            doc.remove_attr(live, name);
            stats.attrs_updated += 1;
            stats.flags |= PatchFlags::ATTRS;
        }
    }
}

fn replace(doc: &Document, live: NodeId, new: &MarkupNode, stats: &mut PatchStats) {
    let built = doc.build(new);
    doc.replace(live, built);
    stats.nodes_replaced += 1;
    stats.flags |= PatchFlags::STRUCTURE;
}

// =============================================================================
// Tests
// =============================================================================
