//! Component instances - name, private model, actions, view.

use std::cell::{Cell, RefCell, RefMut};
use std::fmt;

use serde_json::Value;

use crate::template::{Markup, TemplateTag};

use super::actions::ActionMap;

// =============================================================================
// View
// =============================================================================

pub type InitFn = Box<dyn Fn(&Value)>;
pub type RenderFn = Box<dyn Fn(&Value, &TemplateTag) -> Markup>;

/// A component's view. Both members are independently optional: state-only
/// components render nothing, and a view can skip init.
#[derive(Default)]
pub struct ViewObject {
    init: Option<InitFn>,
    render: Option<RenderFn>,
}

impl ViewObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run once, right before the component's first render pass.
    pub fn with_init(mut self, init: impl Fn(&Value) + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    /// Produce markup from a model snapshot. Called on every render pass.
    pub fn with_render(
        mut self,
        render: impl Fn(&Value, &TemplateTag) -> Markup + 'static,
    ) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub(crate) fn init(&self) -> Option<&InitFn> {
        self.init.as_ref()
    }

    pub(crate) fn render(&self) -> Option<&RenderFn> {
        self.render.as_ref()
    }
}

impl fmt::Debug for ViewObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewObject")
            .field("init", &self.init.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

// =============================================================================
// Instance
// =============================================================================

/// One live component: private model, bound actions, optional view.
///
/// Instances are shared as `Rc`. A handle taken before another definition
/// claimed the name in the registry keeps working against this instance.
pub struct ComponentInstance {
    name: String,
    model: RefCell<Value>,
    actions: ActionMap,
    view: ViewObject,
    mounted: Cell<bool>,
    init_ran: Cell<bool>,
}

impl ComponentInstance {
    pub(crate) fn new(name: String, model: Value, actions: ActionMap, view: ViewObject) -> Self {
        Self {
            name,
            model: RefCell::new(model),
            actions,
            view,
            mounted: Cell::new(false),
            init_ran: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the whole model.
    pub fn model(&self) -> Value {
        self.model.borrow().clone()
    }

    /// Dotted-path read into the model. An empty path reads the whole
    /// model; an absent path reads as `None`.
    pub fn get(&self, path: &str) -> Option<Value> {
        let model = self.model.borrow();
        lookup_path(&model, path).cloned()
    }

    pub fn action_names(&self) -> Vec<String> {
        self.actions.names()
    }

    pub(crate) fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub(crate) fn view(&self) -> &ViewObject {
        &self.view
    }

    /// Mutable model borrow for one action body. `None` while another
    /// action of this instance already holds it.
    pub(crate) fn try_model_mut(&self) -> Option<RefMut<'_, Value>> {
        self.model.try_borrow_mut().ok()
    }

    /// Run the view's init the first time this is reached, then never
    /// again. A failed render pass after the first run does not re-arm it.
    pub(crate) fn run_init_once(&self, model: &Value) {
        if self.init_ran.replace(true) {
            return;
        }
        if let Some(init) = self.view.init() {
            init(model);
        }
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub(crate) fn set_mounted(&self) {
        self.mounted.set(true);
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("name", &self.name)
            .field("actions", &self.actions.names())
            .field("view", &self.view)
            .field("mounted", &self.mounted.get())
            .finish_non_exhaustive()
    }
}

fn lookup_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
