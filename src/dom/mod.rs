//! DOM - the in-memory document the runtime renders into.
//!
//! The runtime treats the document as an external collaborator reached
//! through a narrow surface:
//! - [`Document`]: shared tree handle (create, append, replace, remove)
//! - [`NodeId`]: stable node identity, never reused
//! - attributes vs the live `value` property, kept apart like a browser does
//! - focus tracking via [`Document::focus`] / [`Document::active_element`]
//!
//! Minimal diffing leans on node identity: a node the reconciler leaves
//! alone keeps its id, so focus and typed-in value survive re-renders.

mod document;
mod node;

pub use document::*;
pub use node::NodeId;
