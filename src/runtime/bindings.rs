//! Event binding table.
//!
//! Render passes declare which document nodes trigger which actions. The
//! table is keyed by (node, event) for dispatch, and tracks ownership per
//! component so each pass swaps its own set without touching bindings that
//! belong to other components.
//!
//! Stale entries are impossible by construction: node ids are never
//! reused, and every pass replaces its owner's whole set.

use std::collections::HashMap;

use crate::dom::NodeId;
use crate::markup::{ArgExpr, EventKind};

/// A stored invocation: whose action to call, and with what.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    pub(crate) component: String,
    pub(crate) action: String,
    pub(crate) args: Vec<ArgExpr>,
}

#[derive(Debug, Default)]
pub(crate) struct BindingTable {
    by_node: HashMap<(NodeId, EventKind), Invocation>,
    by_owner: HashMap<String, Vec<(NodeId, EventKind)>>,
}

impl BindingTable {
    /// Swap `owner`'s bindings for a fresh set.
    pub fn replace(&mut self, owner: &str, entries: Vec<(NodeId, EventKind, Invocation)>) {
        if let Some(old_keys) = self.by_owner.remove(owner) {
            for key in old_keys {
                // another component may have claimed the key since
                let owned = self
                    .by_node
                    .get(&key)
                    .is_some_and(|invocation| invocation.component == owner);
                if owned {
                    self.by_node.remove(&key);
                }
            }
        }
        let mut keys = Vec::with_capacity(entries.len());
        for (node, event, invocation) in entries {
            keys.push((node, event));
            self.by_node.insert((node, event), invocation);
        }
        self.by_owner.insert(owner.to_string(), keys);
    }

    pub fn get(&self, node: NodeId, event: EventKind) -> Option<Invocation> {
        self.by_node.get(&(node, event)).cloned()
    }

    /// Drop everything `owner` bound.
    pub fn remove_owner(&mut self, owner: &str) {
        self.replace(owner, Vec::new());
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(component: &str, action: &str) -> Invocation {
        Invocation {
            component: component.to_string(),
            action: action.to_string(),
            args: Vec::new(),
        }
    }

    fn node(raw: usize) -> NodeId {
        NodeId(raw)
    }

    #[test]
    fn test_replace_swaps_owner_set() {
        let mut table = BindingTable::default();
        table.replace(
            "mock",
            vec![(node(1), EventKind::Click, invocation("mock", "a"))],
        );
        table.replace(
            "mock",
            vec![(node(2), EventKind::Click, invocation("mock", "b"))],
        );
        assert_eq!(table.get(node(1), EventKind::Click), None);
        assert_eq!(
            table.get(node(2), EventKind::Click),
            Some(invocation("mock", "b"))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_owners_do_not_clobber_each_other() {
        let mut table = BindingTable::default();
        table.replace(
            "mock",
            vec![(node(1), EventKind::Click, invocation("mock", "a"))],
        );
        table.replace(
            "other",
            vec![(node(2), EventKind::Change, invocation("other", "b"))],
        );
        table.replace("mock", Vec::new());
        assert_eq!(table.get(node(1), EventKind::Click), None);
        assert_eq!(
            table.get(node(2), EventKind::Change),
            Some(invocation("other", "b"))
        );
    }

    #[test]
    fn test_reclaimed_key_is_not_dropped_by_old_owner() {
        let mut table = BindingTable::default();
        table.replace(
            "mock",
            vec![(node(1), EventKind::Click, invocation("mock", "a"))],
        );
        // the same node now belongs to another component's binding
        table.replace(
            "other",
            vec![(node(1), EventKind::Click, invocation("other", "b"))],
        );
        table.remove_owner("mock");
        assert_eq!(
            table.get(node(1), EventKind::Click),
            Some(invocation("other", "b"))
        );
    }

    #[test]
    fn test_events_on_one_node_are_distinct() {
        let mut table = BindingTable::default();
        table.replace(
            "mock",
            vec![
                (node(1), EventKind::Click, invocation("mock", "clicked")),
                (node(1), EventKind::Change, invocation("mock", "changed")),
            ],
        );
        assert_eq!(
            table.get(node(1), EventKind::Click).unwrap().action,
            "clicked"
        );
        assert_eq!(
            table.get(node(1), EventKind::Change).unwrap().action,
            "changed"
        );
    }
}
