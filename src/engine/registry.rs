//! Component registry - name to live instance.
//!
//! One entry per name; registering a name again replaces the entry. The
//! registry is owned by a runtime context, never shared globally, so two
//! runtimes in one process (or one test binary) cannot see each other's
//! components.

use std::collections::HashMap;
use std::rc::Rc;

use super::instance::ComponentInstance;

/// Name → live instance map.
#[derive(Debug, Default)]
pub struct Registry {
    components: HashMap<String, Rc<ComponentInstance>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under its name, returning the instance it
    /// replaced, if any. Handles to a replaced instance keep working;
    /// only the name lookup moves on.
    pub fn insert(&mut self, instance: Rc<ComponentInstance>) -> Option<Rc<ComponentInstance>> {
        self.components
            .insert(instance.name().to_string(), instance)
    }

    pub fn get(&self, name: &str) -> Option<Rc<ComponentInstance>> {
        self.components.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Rc<ComponentInstance>> {
        self.components.remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
