//! Renderer - turning parsed view output into document patches.
//!
//! One job: given a target node and the markup a view just produced, make
//! the document match while touching as little as possible. See [`diff`]
//! for the algorithm and [`PatchStats`] for what a pass reports.

mod diff;

pub use diff::*;
