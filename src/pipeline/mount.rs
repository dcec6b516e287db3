//! Render passes and recursive child mounting.
//!
//! # Flow
//!
//! 1. Locate the target node (`data-component="<name>"`); no target, no pass
//! 2. First pass for this instance: run the view's init (at most once, ever,
//!    even when the pass itself then fails)
//! 3. Run render; parse the produced markup
//! 4. First pass: wholesale fill. Later passes: minimal diff
//! 5. Rebind the component's events, then mount declared children, depth-first
//!
//! A pass that finds no target is a successful no-op: components may be
//! created before the document has a place for them, and a parent's render
//! mounts them once the mount point appears.

use std::rc::Rc;

use serde_json::Value;

use crate::dom::NodeId;
use crate::engine::ComponentInstance;
use crate::error::RenderError;
use crate::markup::{self, Directives};
use crate::renderer;
use crate::runtime::{Invocation, Runtime};
use crate::template::TemplateTag;

/// Mount a freshly created component if its target already exists.
pub(crate) fn mount_component(
    rt: &Runtime,
    instance: &Rc<ComponentInstance>,
) -> Result<(), RenderError> {
    render_pass(rt, instance, &instance.model())
}

/// One render pass with an explicit rendered value: a model snapshot, an
/// async resolution or a yielded step.
pub(crate) fn render_pass(
    rt: &Runtime,
    instance: &Rc<ComponentInstance>,
    value: &Value,
) -> Result<(), RenderError> {
    let Some(target) = rt.document().component_node(instance.name()) else {
        tracing::debug!(
            component = instance.name(),
            "no mount point in document, skipping render"
        );
        return Ok(());
    };
    render_into(rt, instance, value, target, 0)
}

fn render_into(
    rt: &Runtime,
    instance: &Rc<ComponentInstance>,
    value: &Value,
    target: NodeId,
    depth: usize,
) -> Result<(), RenderError> {
    let first = !instance.is_mounted();
    if first {
        instance.run_init_once(value);
    }
    let Some(render) = instance.view().render() else {
        // state-only component: nothing to draw, but it counts as mounted
        instance.set_mounted();
        return Ok(());
    };

    let markup_out = render(value, &TemplateTag);
    let nodes = markup::parse(markup_out.as_str())?;
    let directives = markup::collect_directives(&nodes);

    let doc = rt.document();
    if first {
        doc.remove_children(target);
        for node in &nodes {
            let built = doc.build(node);
            doc.append_child(target, built);
        }
        tracing::debug!(component = instance.name(), "mounted");
    } else {
        let stats = renderer::reconcile(doc, target, &nodes);
        if stats.changed() {
            tracing::trace!(component = instance.name(), ?stats, "patched");
        }
    }
    instance.set_mounted();

    bind_events(rt, instance.name(), target, &directives);
    mount_children(rt, target, &directives, depth)
}

/// Swap the component's event bindings for the set this pass declared.
fn bind_events(rt: &Runtime, owner: &str, target: NodeId, directives: &Directives) {
    let doc = rt.document();
    let mut entries = Vec::with_capacity(directives.bindings.len());
    for binding in &directives.bindings {
        let Some(node) = doc.child_at_path(target, &binding.path) else {
            tracing::warn!(
                component = owner,
                action = %binding.action,
                "bound element missing after patch"
            );
            continue;
        };
        entries.push((
            node,
            binding.event,
            Invocation {
                component: owner.to_string(),
                action: binding.action.clone(),
                args: binding.args.clone(),
            },
        ));
    }
    rt.replace_bindings(owner, entries);
}

/// Render every declared child into its mount point, depth-first.
fn mount_children(
    rt: &Runtime,
    target: NodeId,
    directives: &Directives,
    depth: usize,
) -> Result<(), RenderError> {
    for mount in &directives.mounts {
        let limit = rt.config().max_mount_depth;
        if depth + 1 > limit {
            return Err(RenderError::DepthExceeded {
                name: mount.name.clone(),
                limit,
            });
        }
        let Some(node) = rt.document().child_at_path(target, &mount.path) else {
            tracing::warn!(child = %mount.name, "mount point missing after patch");
            continue;
        };
        let Some(child) = rt.instance(&mount.name) else {
            tracing::debug!(child = %mount.name, "mount point for unregistered component");
            continue;
        };
        render_into(rt, &child, &child.model(), node, depth + 1)?;
    }
    Ok(())
}
