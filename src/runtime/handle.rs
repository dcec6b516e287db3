//! Component handles - the caller-facing surface returned by `create`.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::engine::ComponentInstance;
use crate::error::CallError;
use crate::pipeline;

use super::Runtime;

/// Handle to one live component.
///
/// Cheap to clone, and pinned to its instance: if another definition later
/// claims the same name in the registry, this handle keeps addressing the
/// instance it was created with. Actions are addressed by name because the
/// action map is data.
#[derive(Clone)]
pub struct Handle {
    pub(crate) runtime: Runtime,
    pub(crate) instance: Rc<ComponentInstance>,
}

impl Handle {
    pub fn name(&self) -> &str {
        self.instance.name()
    }

    /// Dotted-path read into the component's private model. Empty path
    /// reads the whole model; absent paths read as `None`.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.instance.get(path)
    }

    /// Snapshot of the whole model.
    pub fn model(&self) -> Value {
        self.instance.model()
    }

    pub fn action_names(&self) -> Vec<String> {
        self.instance.action_names()
    }

    /// Call a named action. Sync work finishes before this returns, render
    /// passes included; deferred work resolves on [`Runtime::tick`].
    pub fn call(&self, action: &str, args: &[Value]) -> Result<(), CallError> {
        pipeline::call_action(&self.runtime, &self.instance, action, args)
    }

    /// Resolve an action by name once, for repeated dispatch.
    pub fn action(&self, action: &str) -> Result<BoundAction, CallError> {
        if !self.instance.actions().contains(action) {
            return Err(CallError::UnknownAction {
                component: self.name().to_string(),
                action: action.to_string(),
            });
        }
        Ok(BoundAction {
            handle: self.clone(),
            action: action.to_string(),
        })
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("component", &self.name())
            .finish_non_exhaustive()
    }
}

/// One action of one component, resolved once and callable many times.
#[derive(Clone)]
pub struct BoundAction {
    handle: Handle,
    action: String,
}

impl BoundAction {
    pub fn name(&self) -> &str {
        &self.action
    }

    pub fn component(&self) -> &str {
        self.handle.name()
    }

    pub fn call(&self, args: &[Value]) -> Result<(), CallError> {
        self.handle.call(&self.action, args)
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAction")
            .field("component", &self.component())
            .field("action", &self.action)
            .finish()
    }
}
