//! Action types - the per-component action map and the one outcome type
//! every action resolves through.
//!
//! An action is a plain function over the component's live model plus the
//! caller's arguments. It finishes in exactly one of three shapes, made
//! explicit by [`ActionOutcome`]:
//! - [`ActionOutcome::Value`]: done now; one render pass follows, using the model
//! - [`ActionOutcome::Future`]: done later; one render pass with the resolved value
//! - [`ActionOutcome::Steps`]: done in stages; one render pass per step, in order
//!
//! # Example
//!
//! ```ignore
//! let actions = ActionMap::new()
//!     .action("double", |model, args| {
//!         let n = args.first().and_then(Value::as_i64).unwrap_or(0);
//!         model["num"] = Value::from(n * 2);
//!         Ok(ActionOutcome::done())
//!     })
//!     .action("load", |_model, _args| {
//!         Ok(ActionOutcome::future(async { Ok(Value::from("pass")) }))
//!     })
//!     .action("countdown", |_model, _args| {
//!         Ok(ActionOutcome::yielding([3, 2, 1]))
//!     });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::error::ActionError;

// =============================================================================
// Outcome
// =============================================================================

/// Future shape of a deferred action.
pub type ActionFuture = LocalBoxFuture<'static, Result<Value, ActionError>>;

/// Iterator shape of a step-yielding action.
pub type ActionSteps = Box<dyn Iterator<Item = Result<Value, ActionError>>>;

pub(crate) type StoredAction =
    Rc<dyn Fn(&mut Value, &[Value]) -> Result<ActionOutcome, ActionError>>;

/// What an action chose to return.
pub enum ActionOutcome {
    /// Synchronous completion. The render pass that follows reads the
    /// mutated model; the payload itself is for the caller's benefit.
    Value(Value),
    /// Deferred completion: one render pass with the resolved value, on a
    /// later [`Runtime::tick`](crate::runtime::Runtime::tick).
    Future(ActionFuture),
    /// Step-yielding completion: one render pass per produced value, in
    /// production order, driven to exhaustion before the call returns.
    Steps(ActionSteps),
}

impl ActionOutcome {
    /// Synchronous completion with nothing to report.
    pub fn done() -> Self {
        ActionOutcome::Value(Value::Null)
    }

    /// Synchronous completion carrying a value.
    pub fn value(value: impl Into<Value>) -> Self {
        ActionOutcome::Value(value.into())
    }

    /// Deferred completion.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ActionError>> + 'static,
    {
        ActionOutcome::Future(future.boxed_local())
    }

    /// Step-yielding completion from fallible steps.
    pub fn steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Result<Value, ActionError>>,
        I::IntoIter: 'static,
    {
        ActionOutcome::Steps(Box::new(steps.into_iter()))
    }

    /// Step-yielding completion from plain values.
    pub fn yielding<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: Into<Value>,
    {
        ActionOutcome::Steps(Box::new(values.into_iter().map(|value| Ok(value.into()))))
    }
}

impl From<Value> for ActionOutcome {
    fn from(value: Value) -> Self {
        ActionOutcome::Value(value)
    }
}

impl fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ActionOutcome::Future(_) => f.write_str("Future(..)"),
            ActionOutcome::Steps(_) => f.write_str("Steps(..)"),
        }
    }
}

// =============================================================================
// Action map
// =============================================================================

/// Named map of a component's actions, built once by its actions factory.
#[derive(Default)]
pub struct ActionMap {
    actions: HashMap<String, StoredAction>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action under `name`. Chainable; a later entry under the same
    /// name wins.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Value, &[Value]) -> Result<ActionOutcome, ActionError> + 'static,
    {
        self.actions.insert(name.into(), Rc::new(action));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action names, sorted for stable introspection.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn get(&self, name: &str) -> Option<StoredAction> {
        self.actions.get(name).cloned()
    }
}

impl fmt::Debug for ActionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMap")
            .field("actions", &self.names())
            .finish()
    }
}
