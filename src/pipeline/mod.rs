//! Pipeline - from action call to patched document.
//!
//! This module connects the component model to the document: it owns the
//! render pass and the action-call flow that triggers it.
//!
//! # Data Flow
//!
//! ```text
//! call ── action(model, args) ── outcome ──┬─ value  → render(model)
//!                                          ├─ steps  → render(step), in order
//!                                          └─ future → tick → render(resolved)
//!
//! render ── parse ── collect directives ── diff ── rebind events ── mount children
//! ```
//!
//! ## Key Design Principles
//!
//! - Exactly one render pass per sync call, per resolved future, per
//!   yielded step. Passes are never batched or skipped.
//! - User code (actions, views, factories) always runs with the runtime's
//!   internal borrows released, so actions can create components and views
//!   can call back into the runtime. The one borrow an action does hold is
//!   its own model; calling back into the same component mid-action is a
//!   typed error.
//! - A component whose mount point is absent renders as a no-op; it is not
//!   an error to exist before your place in the document does.

mod call;
mod mount;

pub(crate) use call::call_action;
pub(crate) use mount::mount_component;
