//! Engine - the component model.
//!
//! The engine owns what a component IS, away from how it renders:
//! - [`Registry`]: name → live instance, one per runtime context
//! - [`ComponentInstance`]: private model, bound actions, optional view
//! - [`ActionMap`] / [`ActionOutcome`]: named actions and their three
//!   completion shapes (value, future, steps)
//! - [`ViewObject`]: optional init and render members
//!
//! # Architecture
//!
//! Components are looked up by name, never by reference:
//!
//! ```text
//! "mock"  → ComponentInstance { model: {num: 0, ...}, actions, view }
//! "child" → ComponentInstance { model: "child", actions, view }
//! ```
//!
//! A name maps to one live instance; creating the name again swaps the
//! entry while old handles keep their instance alive. Mount points in the
//! document refer to components by the same names, which is what lets a
//! parent's markup declare children it has never seen.

mod actions;
mod instance;
mod registry;

pub use actions::*;
pub use instance::*;
pub use registry::*;
