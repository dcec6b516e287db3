//! # sprig-dom
//!
//! Tiny component runtime with minimal-diff DOM rendering.
//!
//! Components are named bundles of private state and actions. Calling an
//! action mutates the model and triggers a render pass; the pass diffs the
//! view's fresh markup against the live document and only touches what
//! changed, so node identity (focus, typed-in values) survives.
//!
//! ## Architecture
//!
//! Everything hangs off an explicit [`Runtime`] context; there are no
//! globals, so independent runtimes coexist in one process.
//!
//! The render pipeline is one straight line:
//! ```text
//! action(model, args) → outcome → render(value) → parse → directives → diff → patch
//! ```
//!
//! Actions finish in one of three shapes ([`ActionOutcome`]): a sync value
//! (render now), a future (render when it resolves on [`Runtime::tick`]),
//! or a step iterator (one render per step, in order). Every completed
//! shape triggers exactly one render pass.
//!
//! ## Modules
//!
//! - [`runtime`] - context, component creation, event dispatch, ticking
//! - [`engine`] - registry, instances, actions, view objects
//! - [`markup`] - markup parsing and the directive pass
//! - [`renderer`] - the minimal-diff reconciler
//! - [`dom`] - the in-memory document being rendered into
//! - [`template`] - markup wrapper and the tag helper views render with
//! - [`error`] - the full error taxonomy

pub mod dom;
pub mod engine;
pub mod error;
pub mod markup;
mod pipeline;
pub mod renderer;
pub mod runtime;
pub mod template;

// Re-export the everyday surface
pub use dom::{Document, NodeId};

pub use engine::{
    ActionFuture, ActionMap, ActionOutcome, ActionSteps, ComponentInstance, InitFn, Registry,
    RenderFn, ViewObject,
};

pub use error::{
    ActionError, AsyncActionError, CallError, ConfigError, CreateError, MarkupError, RenderError,
};

pub use markup::{
    ArgExpr, ChildMount, Directives, EventBinding, EventKind, MarkupElement, MarkupNode, TreePath,
};

pub use renderer::{PatchFlags, PatchStats};

pub use runtime::{
    ActionsFactory, BoundAction, ComponentDef, Handle, Runtime, RuntimeConfig, ViewFactory,
};

pub use template::{Markup, TemplateTag};
