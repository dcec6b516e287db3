//! Runtime context - registry, document, scheduler and dispatch behind one
//! cloneable handle.
//!
//! Everything a group of components shares lives here, explicitly: there
//! are no globals, so two runtimes in one process stay fully independent
//! and tests never bleed into each other.
//!
//! # Example
//!
//! ```ignore
//! use sprig_dom::{ActionMap, ActionOutcome, ComponentDef, Document, Runtime, ViewObject};
//! use serde_json::json;
//!
//! let doc = Document::new();
//! doc.set_body_markup(r#"<div data-component="hello"></div>"#)?;
//! let rt = Runtime::new(doc);
//!
//! let hello = rt.create(
//!     ComponentDef::named("hello")
//!         .model(json!({ "who": "world" }))
//!         .actions(|_| {
//!             ActionMap::new().action("greet", |model, args| {
//!                 model["who"] = args.first().cloned().unwrap_or_default();
//!                 Ok(ActionOutcome::done())
//!             })
//!         })
//!         .view(|| {
//!             ViewObject::new().with_render(|model, html| {
//!                 html.markup(format!(
//!                     "<h1>Hello {}</h1>",
//!                     html.escape(model["who"].as_str().unwrap_or(""))
//!                 ))
//!             })
//!         }),
//! )?;
//!
//! hello.call("greet", &[json!("sprig")])?;
//! rt.tick(); // drive any deferred actions
//! ```

mod bindings;
mod handle;
mod scheduler;

pub use handle::{BoundAction, Handle};

pub(crate) use bindings::Invocation;

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use serde_json::Value;

use crate::dom::{Document, NodeId};
use crate::engine::{ActionMap, ComponentInstance, Registry, ViewObject};
use crate::error::{AsyncActionError, CallError, ConfigError, CreateError};
use crate::markup::{ArgExpr, EventKind};
use crate::pipeline;

use bindings::BindingTable;
use scheduler::Scheduler;

// =============================================================================
// Definitions
// =============================================================================

/// Factory producing a component's action map. Runs once per create, with
/// the runtime in hand so actions can close over it.
pub type ActionsFactory = Box<dyn FnOnce(&Runtime) -> ActionMap>;

/// Factory producing a component's view object. Runs once per create.
pub type ViewFactory = Box<dyn FnOnce() -> ViewObject>;

/// Tunables for a runtime context.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How deep declarative child mounting may recurse in one render pass.
    /// The limit exists to turn self-mounting view cycles into an error.
    pub max_mount_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_mount_depth: 32,
        }
    }
}

/// Everything needed to create a component.
///
/// Name and actions are required; view and model are optional.
#[derive(Default)]
pub struct ComponentDef {
    name: String,
    actions: Option<ActionsFactory>,
    view: Option<ViewFactory>,
    model: Option<Value>,
}

impl ComponentDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Actions factory. Required.
    pub fn actions(mut self, factory: impl FnOnce(&Runtime) -> ActionMap + 'static) -> Self {
        self.actions = Some(Box::new(factory));
        self
    }

    /// View factory. Optional; a component without one only holds state.
    pub fn view(mut self, factory: impl FnOnce() -> ViewObject + 'static) -> Self {
        self.view = Some(Box::new(factory));
        self
    }

    /// Initial model. Optional; defaults to an empty object. Pass a clone
    /// if the original should stay untouched by the component.
    pub fn model(mut self, model: impl Into<Value>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("name", &self.name)
            .field("actions", &self.actions.is_some())
            .field("view", &self.view.is_some())
            .field("model", &self.model)
            .finish()
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// Shared runtime context. Clones are handles to the same context.
///
/// Not `Send`: a runtime, its components and its document live on one
/// thread, the way a document naturally does.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

struct RuntimeInner {
    config: RuntimeConfig,
    document: Document,
    registry: RefCell<Registry>,
    bindings: RefCell<BindingTable>,
    scheduler: Scheduler,
    failures: RefCell<Vec<AsyncActionError>>,
}

impl Runtime {
    /// Runtime over a document, with default configuration.
    pub fn new(document: Document) -> Self {
        Self::with_config(document, RuntimeConfig::default())
    }

    pub fn with_config(document: Document, config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                document,
                registry: RefCell::new(Registry::new()),
                bindings: RefCell::new(BindingTable::default()),
                scheduler: Scheduler::new(),
                failures: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a component: validate the definition, build its actions and
    /// view, register it under its name, then mount it if the document
    /// already has a place for it.
    ///
    /// Creating a name that is already registered replaces the registry
    /// entry; handles to the old instance keep working against it.
    pub fn create(&self, def: ComponentDef) -> Result<Handle, CreateError> {
        let ComponentDef {
            name,
            actions,
            view,
            model,
        } = def;
        if name.is_empty() {
            return Err(ConfigError::MissingName.into());
        }
        let Some(actions_factory) = actions else {
            return Err(ConfigError::MissingActions { name }.into());
        };

        let model = model.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let action_map = actions_factory(self);
        let view_object = view.map(|factory| factory()).unwrap_or_default();
        let instance = Rc::new(ComponentInstance::new(
            name.clone(),
            model,
            action_map,
            view_object,
        ));

        let replaced = self.inner.registry.borrow_mut().insert(Rc::clone(&instance));
        if replaced.is_some() {
            tracing::debug!(component = %name, "replacing registered component");
            self.inner.bindings.borrow_mut().remove_owner(&name);
        }
        tracing::debug!(component = %name, "created component");

        pipeline::mount_component(self, &instance)
            .map_err(|source| CreateError::Render { name, source })?;

        Ok(Handle {
            runtime: self.clone(),
            instance,
        })
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Handle to a registered component.
    pub fn component(&self, name: &str) -> Option<Handle> {
        let instance = self.inner.registry.borrow().get(name)?;
        Some(Handle {
            runtime: self.clone(),
            instance,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.registry.borrow().contains(name)
    }

    /// Registered component names, sorted.
    pub fn component_names(&self) -> Vec<String> {
        self.inner.registry.borrow().names()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Deliver a DOM event to whatever action the last render bound there.
    ///
    /// Returns `Ok(true)` if a binding fired, `Ok(false)` if the node has
    /// no binding for this event.
    pub fn dispatch(&self, node: NodeId, event: EventKind) -> Result<bool, CallError> {
        let Some(invocation) = self.inner.bindings.borrow().get(node, event) else {
            return Ok(false);
        };
        let args = self.materialize_args(node, &invocation);
        let Some(instance) = self.instance(&invocation.component) else {
            tracing::warn!(
                component = %invocation.component,
                "binding for unregistered component"
            );
            return Ok(false);
        };
        pipeline::call_action(self, &instance, &invocation.action, &args)?;
        Ok(true)
    }

    fn materialize_args(&self, node: NodeId, invocation: &Invocation) -> Vec<Value> {
        invocation
            .args
            .iter()
            .map(|arg| match arg {
                ArgExpr::Literal(value) => value.clone(),
                ArgExpr::NodeValue => Value::String(self.inner.document.value(node)),
            })
            .collect()
    }

    // =========================================================================
    // Deferred work
    // =========================================================================

    /// Drive queued deferred actions until all are finished or suspended.
    /// Render passes they trigger happen inside this call.
    ///
    /// Must not be called from inside a deferred action.
    pub fn tick(&self) {
        self.inner.scheduler.tick();
    }

    /// Deferred actions spawned but not yet finished.
    pub fn pending_actions(&self) -> usize {
        self.inner.scheduler.in_flight()
    }

    /// Drain the async failure sink.
    ///
    /// Failures inside deferred steps have no caller to return to; they
    /// are logged when they happen and collected here for inspection.
    pub fn take_failed_actions(&self) -> Vec<AsyncActionError> {
        std::mem::take(&mut *self.inner.failures.borrow_mut())
    }

    // =========================================================================
    // Crate internals
    // =========================================================================

    pub(crate) fn instance(&self, name: &str) -> Option<Rc<ComponentInstance>> {
        self.inner.registry.borrow().get(name)
    }

    pub(crate) fn replace_bindings(
        &self,
        owner: &str,
        entries: Vec<(NodeId, EventKind, Invocation)>,
    ) {
        self.inner.bindings.borrow_mut().replace(owner, entries);
    }

    pub(crate) fn record_failure(&self, failure: AsyncActionError) {
        self.inner.failures.borrow_mut().push(failure);
    }

    pub(crate) fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        self.inner.scheduler.spawn(task);
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("components", &self.component_names())
            .field("pending_actions", &self.pending_actions())
            .finish_non_exhaustive()
    }
}
