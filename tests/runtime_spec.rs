//! End-to-end runtime behavior: creation contracts, action-triggered
//! renders, diff-preserved node identity, declarative children, event
//! dispatch and deferred actions.
//!
//! Most tests share one "mock" component shaped like a small form: a
//! heading bound to the model title, a text input, two event-bound
//! controls and a child mount point.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{Value, json};
use sprig_dom::{
    ActionError, ActionMap, ActionOutcome, CallError, ComponentDef, ConfigError, CreateError,
    Document, EventKind, MarkupError, RenderError, Runtime, ViewObject,
};

fn setup() -> (Runtime, Document) {
    let doc = Document::new();
    doc.set_body_markup(r#"<div data-component="mock"></div>"#)
        .unwrap();
    let rt = Runtime::new(doc.clone());
    (rt, doc)
}

fn mock_model() -> Value {
    json!({ "num": 0, "title": "Mock title", "list": [] })
}

fn mock_actions() -> ActionMap {
    ActionMap::new()
        .action("empty", |_model, _args| Ok(ActionOutcome::done()))
        .action("double", |model, args| {
            let num = args.first().and_then(Value::as_i64).unwrap_or(0);
            model["num"] = Value::from(num * 2);
            Ok(ActionOutcome::done())
        })
        .action("setTitle", |model, args| {
            model["title"] = args.first().cloned().unwrap_or(Value::Null);
            Ok(ActionOutcome::done())
        })
        .action("addToList", |model, args| {
            if let Some(list) = model["list"].as_array_mut() {
                list.extend(args.iter().cloned());
            }
            Ok(ActionOutcome::done())
        })
}

fn mock_view() -> ViewObject {
    ViewObject::new().with_render(|model, html| {
        let title = html.escape(model["title"].as_str().unwrap_or_default());
        html.markup(format!(
            concat!(
                "<div>",
                "<h1>{title}</h1>",
                r#"<input type="text" data-change="setTitle(this.value)" value="{title}">"#,
                r#"<a data-click="setSum(2, 3)">Set sum</a>"#,
                r#"<button data-click="clearTitle">Click</button>"#,
                r#"<div data-component="childComponent"></div>"#,
                "</div>",
            ),
            title = title,
        ))
    })
}

fn create_mock(rt: &Runtime) -> sprig_dom::Handle {
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| mock_actions())
            .view(mock_view)
            .model(mock_model()),
    )
    .unwrap()
}

// =============================================================================
// Creation contract
// =============================================================================

#[test]
fn test_rejects_component_without_name() {
    let (rt, _doc) = setup();
    let error = rt
        .create(ComponentDef::default().actions(|_| mock_actions()))
        .unwrap_err();
    assert!(matches!(
        error,
        CreateError::Config(ConfigError::MissingName)
    ));
    assert_eq!(error.to_string(), "Your component needs a name");
}

#[test]
fn test_rejects_component_without_actions() {
    let (rt, _doc) = setup();
    let error = rt
        .create(ComponentDef::named("mock").model(mock_model()))
        .unwrap_err();
    assert!(error.to_string().starts_with("mock needs some actions!"));
}

#[test]
fn test_stores_component_by_name() {
    let (rt, _doc) = setup();
    create_mock(&rt);
    assert!(rt.contains("mock"));
    assert_eq!(rt.component_names(), vec!["mock".to_string()]);
    let mock = rt.component("mock").unwrap();
    assert_eq!(mock.get("num"), Some(json!(0)));
    assert_eq!(
        mock.action_names(),
        vec!["addToList", "double", "empty", "setTitle"]
    );
}

#[test]
fn test_models_are_deep_cloned_per_instance() {
    let (rt, _doc) = setup();
    let base = mock_model();
    let first = rt
        .create(
            ComponentDef::named("mock")
                .actions(|_| mock_actions())
                .model(base.clone()),
        )
        .unwrap();
    first
        .call("addToList", &[json!(1), json!(2), json!(3)])
        .unwrap();
    assert_eq!(first.get("list"), Some(json!([1, 2, 3])));

    let second = rt
        .create(
            ComponentDef::named("mock")
                .actions(|_| mock_actions())
                .model(base.clone()),
        )
        .unwrap();
    assert_eq!(second.get("list"), Some(json!([])));
    // the first instance and the caller's model are both untouched
    assert_eq!(first.get("list"), Some(json!([1, 2, 3])));
    assert_eq!(base["list"], json!([]));
}

#[test]
fn test_view_members_are_independently_optional() {
    let (rt, _doc) = setup();
    rt.create(ComponentDef::named("stateonly").actions(|_| mock_actions()))
        .unwrap();
    rt.create(
        ComponentDef::named("initonly")
            .actions(|_| mock_actions())
            .view(|| ViewObject::new().with_init(|_| {})),
    )
    .unwrap();
    rt.create(
        ComponentDef::named("renderonly")
            .actions(|_| mock_actions())
            .view(|| ViewObject::new().with_render(|_, html| html.markup("<p>r</p>"))),
    )
    .unwrap();
    assert_eq!(rt.component_names().len(), 3);
}

// =============================================================================
// Model access
// =============================================================================

#[test]
fn test_reads_model_paths_through_handle() {
    let (rt, _doc) = setup();
    let mock = create_mock(&rt);
    assert_eq!(mock.get("num"), Some(json!(0)));
    assert_eq!(mock.get("title"), Some(json!("Mock title")));
    assert_eq!(mock.get("missing"), None);
    assert_eq!(mock.get(""), Some(mock_model()));
    mock.call("addToList", &[json!("a")]).unwrap();
    assert_eq!(mock.get("list.0"), Some(json!("a")));
}

#[test]
fn test_actions_update_private_model() {
    let (rt, _doc) = setup();
    let mock = create_mock(&rt);
    mock.call("double", &[json!(2)]).unwrap();
    assert_eq!(mock.get("num"), Some(json!(4)));
}

#[test]
fn test_calling_unknown_action_fails() {
    let (rt, _doc) = setup();
    let mock = create_mock(&rt);
    let error = mock.call("launch", &[]).unwrap_err();
    assert!(matches!(error, CallError::UnknownAction { .. }));
    assert_eq!(error.to_string(), "mock has no action named launch");
}

#[test]
fn test_bound_actions_resolve_once_and_dispatch_repeatedly() {
    let (rt, _doc) = setup();
    let mock = create_mock(&rt);
    let double = mock.action("double").unwrap();
    double.call(&[json!(3)]).unwrap();
    assert_eq!(mock.get("num"), Some(json!(6)));
    double.call(&[json!(5)]).unwrap();
    assert_eq!(mock.get("num"), Some(json!(10)));
    assert!(mock.action("launch").is_err());
}

#[test]
fn test_actions_cannot_reenter_their_own_component() {
    let (rt, _doc) = setup();
    let reentry = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&reentry);
    rt.create(
        ComponentDef::named("mock")
            .actions(move |rt| {
                let rt = rt.clone();
                mock_actions().action("outer", move |_model, _args| {
                    let nested = rt.component("mock").unwrap().call("double", &[json!(2)]);
                    *seen.borrow_mut() = nested.err();
                    Ok(ActionOutcome::done())
                })
            })
            .model(mock_model())
            .view(mock_view),
    )
    .unwrap();

    let mock = rt.component("mock").unwrap();
    mock.call("outer", &[]).unwrap();
    let error = reentry.borrow_mut().take().unwrap();
    assert!(matches!(error, CallError::Reentrant { .. }));
    assert_eq!(
        error.to_string(),
        "cannot call mock.double while mock is mid-action"
    );
    // the borrow clears with the action, so the direct call works again
    assert_eq!(mock.get("num"), Some(json!(0)));
    mock.call("double", &[json!(2)]).unwrap();
    assert_eq!(mock.get("num"), Some(json!(4)));
}

// =============================================================================
// Render scheduling
// =============================================================================

#[test]
fn test_renders_on_create_and_after_each_action() {
    let (rt, _doc) = setup();
    let renders = Rc::new(Cell::new(0));
    let render_count = Rc::clone(&renders);
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| mock_actions())
            .model(mock_model())
            .view(move || {
                ViewObject::new().with_render(move |_model, html| {
                    render_count.set(render_count.get() + 1);
                    html.markup("<p>tick</p>")
                })
            }),
    )
    .unwrap();
    assert_eq!(renders.get(), 1);
    let mock = rt.component("mock").unwrap();
    mock.call("empty", &[]).unwrap();
    assert_eq!(renders.get(), 2);
    mock.call("double", &[json!(1)]).unwrap();
    assert_eq!(renders.get(), 3);
}

#[test]
fn test_init_runs_once_before_later_renders() {
    let (rt, _doc) = setup();
    let inits = Rc::new(Cell::new(0));
    let init_count = Rc::clone(&inits);
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| mock_actions())
            .model(mock_model())
            .view(move || {
                ViewObject::new()
                    .with_init(move |_| init_count.set(init_count.get() + 1))
                    .with_render(|_, html| html.markup("<p>x</p>"))
            }),
    )
    .unwrap();
    assert_eq!(inits.get(), 1);
    rt.component("mock").unwrap().call("empty", &[]).unwrap();
    assert_eq!(inits.get(), 1);
}

#[test]
fn test_failed_first_render_does_not_rearm_init() {
    let (rt, doc) = setup();
    let inits = Rc::new(Cell::new(0));
    let init_count = Rc::clone(&inits);
    let error = rt
        .create(
            ComponentDef::named("mock")
                .actions(|_| mock_actions())
                .model(mock_model())
                .view(move || {
                    let passes = Cell::new(0);
                    ViewObject::new()
                        .with_init(move |_| init_count.set(init_count.get() + 1))
                        .with_render(move |_, html| {
                            passes.set(passes.get() + 1);
                            if passes.get() == 1 {
                                html.markup("<div><p>broken</div>")
                            } else {
                                html.markup("<p>recovered</p>")
                            }
                        })
                }),
        )
        .unwrap_err();
    assert!(matches!(error, CreateError::Render { .. }));
    assert_eq!(inits.get(), 1);

    // the instance stayed registered; the next pass mounts without init
    rt.component("mock").unwrap().call("empty", &[]).unwrap();
    assert_eq!(inits.get(), 1);
    let p = doc.find_by_tag("p").unwrap();
    assert_eq!(doc.text_content(p), "recovered");
}

#[test]
fn test_async_action_renders_with_resolved_value_on_tick() {
    let (rt, _doc) = setup();
    let seen = Rc::new(RefCell::new(Vec::<String>::new()));
    let seen_in_view = Rc::clone(&seen);
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| {
                ActionMap::new().action("asyncAction", |_model, _args| {
                    Ok(ActionOutcome::future(async { Ok(json!("pass")) }))
                })
            })
            .model(json!(""))
            .view(move || {
                ViewObject::new().with_render(move |value, html| {
                    seen_in_view
                        .borrow_mut()
                        .push(value.as_str().unwrap_or("?").to_string());
                    html.markup("<p>async</p>")
                })
            }),
    )
    .unwrap();
    let mock = rt.component("mock").unwrap();
    mock.call("asyncAction", &[]).unwrap();
    // nothing rendered yet beyond the initial pass
    assert_eq!(rt.pending_actions(), 1);
    assert_eq!(*seen.borrow(), vec!["".to_string()]);
    rt.tick();
    assert_eq!(rt.pending_actions(), 0);
    assert_eq!(*seen.borrow(), vec!["".to_string(), "pass".to_string()]);
}

#[test]
fn test_step_action_renders_per_yield_in_order() {
    let (rt, _doc) = setup();
    let seen = Rc::new(RefCell::new(Vec::<i64>::new()));
    let seen_in_view = Rc::clone(&seen);
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| {
                ActionMap::new().action("generatorAction", |_model, _args| {
                    Ok(ActionOutcome::yielding([1, 2, 3]))
                })
            })
            .model(json!(0))
            .view(move || {
                ViewObject::new().with_render(move |value, html| {
                    seen_in_view.borrow_mut().push(value.as_i64().unwrap_or(-1));
                    html.markup("<p>steps</p>")
                })
            }),
    )
    .unwrap();
    rt.component("mock")
        .unwrap()
        .call("generatorAction", &[])
        .unwrap();
    // all steps rendered before the call returned, in production order
    assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(rt.pending_actions(), 0);
}

#[test]
fn test_failing_step_stops_the_call_after_rendering_prior_steps() {
    let (rt, _doc) = setup();
    let seen = Rc::new(RefCell::new(Vec::<i64>::new()));
    let seen_in_view = Rc::clone(&seen);
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| {
                ActionMap::new().action("explode", |_model, _args| {
                    Ok(ActionOutcome::steps([
                        Ok(json!(1)),
                        Err(ActionError::new("boom")),
                        Ok(json!(3)),
                    ]))
                })
            })
            .model(json!(0))
            .view(move || {
                ViewObject::new().with_render(move |value, html| {
                    seen_in_view.borrow_mut().push(value.as_i64().unwrap_or(-1));
                    html.markup("<p>steps</p>")
                })
            }),
    )
    .unwrap();
    let error = rt
        .component("mock")
        .unwrap()
        .call("explode", &[])
        .unwrap_err();
    assert!(matches!(error, CallError::Action(_)));
    assert_eq!(error.to_string(), "boom");
    assert_eq!(*seen.borrow(), vec![0, 1]);
}

#[test]
fn test_failed_async_actions_land_in_the_sink() {
    let (rt, _doc) = setup();
    let renders = Rc::new(Cell::new(0));
    let render_count = Rc::clone(&renders);
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| {
                ActionMap::new().action("fetch", |_model, _args| {
                    Ok(ActionOutcome::future(async {
                        Err(ActionError::new("offline"))
                    }))
                })
            })
            .model(json!(null))
            .view(move || {
                ViewObject::new().with_render(move |_value, html| {
                    render_count.set(render_count.get() + 1);
                    html.markup("<p>x</p>")
                })
            }),
    )
    .unwrap();
    rt.component("mock").unwrap().call("fetch", &[]).unwrap();
    rt.tick();
    let failures = rt.take_failed_actions();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].component, "mock");
    assert_eq!(failures[0].action, "fetch");
    assert_eq!(failures[0].error.message(), "offline");
    // failure rendered nothing, and the sink drains once
    assert_eq!(renders.get(), 1);
    assert!(rt.take_failed_actions().is_empty());
}

// =============================================================================
// Document output
// =============================================================================

#[test]
fn test_first_render_fills_the_mount_point() {
    let (rt, doc) = setup();
    create_mock(&rt);
    let h1 = doc.find_by_tag("h1").unwrap();
    assert_eq!(doc.text_content(h1), "Mock title");
}

#[test]
fn test_first_render_replaces_placeholder_content_wholesale() {
    let doc = Document::new();
    doc.set_body_markup(r#"<div data-component="mock"><span>loading</span></div>"#)
        .unwrap();
    let rt = Runtime::new(doc.clone());
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| mock_actions())
            .model(mock_model())
            .view(|| {
                ViewObject::new()
                    .with_render(|_, html| html.markup(r#"<p class="ready">done</p>"#))
            }),
    )
    .unwrap();

    let target = doc.component_node("mock").unwrap();
    assert_eq!(
        doc.outer_html(target),
        r#"<div data-component="mock"><p class="ready">done</p></div>"#
    );
    assert!(doc.find_by_tag("span").is_none());
}

#[test]
fn test_action_rerender_updates_changed_text() {
    let (rt, doc) = setup();
    let mock = create_mock(&rt);
    mock.call("setTitle", &[json!("New title")]).unwrap();
    let h1 = doc.find_by_tag("h1").unwrap();
    assert_eq!(doc.text_content(h1), "New title");
}

#[test]
fn test_untouched_nodes_keep_identity_and_focus() {
    let (rt, doc) = setup();
    let mock = create_mock(&rt);
    let input = doc.find_by_tag("input").unwrap();
    doc.focus(input);
    doc.set_value(input, "half-typed");

    mock.call("setTitle", &[json!("Other")]).unwrap();

    assert_eq!(doc.find_by_tag("input"), Some(input));
    assert_eq!(doc.active_element(), Some(input));
    assert_eq!(doc.value(input), "half-typed");
    let h1 = doc.find_by_tag("h1").unwrap();
    assert_eq!(doc.text_content(h1), "Other");
}

#[test]
fn test_invalid_view_markup_fails_the_render() {
    let (rt, _doc) = setup();
    let error = rt
        .create(
            ComponentDef::named("mock")
                .actions(|_| mock_actions())
                .view(|| {
                    ViewObject::new().with_render(|_, html| html.markup("<div><p>broken</div>"))
                }),
        )
        .unwrap_err();
    assert!(matches!(
        error,
        CreateError::Render {
            source: RenderError::Markup(MarkupError::MismatchedClosingTag { .. }),
            ..
        }
    ));
    assert!(error.to_string().starts_with("first render of mock failed"));
}

#[test]
fn test_component_without_mount_point_renders_later() {
    let doc = Document::new();
    let rt = Runtime::new(doc.clone());
    let renders = Rc::new(Cell::new(0));
    let render_count = Rc::clone(&renders);
    let mock = rt
        .create(
            ComponentDef::named("mock")
                .actions(|_| mock_actions())
                .model(mock_model())
                .view(move || {
                    ViewObject::new().with_render(move |_model, html| {
                        render_count.set(render_count.get() + 1);
                        html.markup("<p>here</p>")
                    })
                }),
        )
        .unwrap();
    assert_eq!(renders.get(), 0);
    mock.call("empty", &[]).unwrap();
    assert_eq!(renders.get(), 0);

    // once the document grows a mount point, the next pass lands
    doc.set_body_markup(r#"<div data-component="mock"></div>"#)
        .unwrap();
    mock.call("empty", &[]).unwrap();
    assert_eq!(renders.get(), 1);
    let p = doc.find_by_tag("p").unwrap();
    assert_eq!(doc.text_content(p), "here");
}

#[test]
fn test_recreating_a_name_takes_over_the_mount_point() {
    let (rt, doc) = setup();
    let first = rt
        .create(
            ComponentDef::named("mock")
                .actions(|_| mock_actions())
                .model(json!({ "tag": "first" }))
                .view(|| {
                    ViewObject::new().with_render(|model, html| {
                        html.markup(format!(
                            "<p>{}</p>",
                            model["tag"].as_str().unwrap_or_default()
                        ))
                    })
                }),
        )
        .unwrap();
    let target = doc.component_node("mock").unwrap();
    assert_eq!(doc.text_content(target), "first");

    rt.create(
        ComponentDef::named("mock")
            .actions(|_| mock_actions())
            .model(json!({ "tag": "second" }))
            .view(|| {
                ViewObject::new().with_render(|model, html| {
                    html.markup(format!(
                        "<p>{}</p>",
                        model["tag"].as_str().unwrap_or_default()
                    ))
                })
            }),
    )
    .unwrap();
    assert_eq!(doc.text_content(target), "second");
    // the old handle still reads its own instance
    assert_eq!(first.get("tag"), Some(json!("first")));
}

// =============================================================================
// Child components
// =============================================================================

#[test]
fn test_declared_child_mounts_render_their_own_model() {
    let (rt, doc) = setup();
    rt.create(
        ComponentDef::named("mock")
            .actions(|rt| {
                let rt = rt.clone();
                mock_actions().action("addChild", move |_model, _args| {
                    rt.create(
                        ComponentDef::named("childComponent")
                            .actions(|_| ActionMap::new())
                            .model(json!("child"))
                            .view(|| {
                                ViewObject::new().with_render(|value, html| {
                                    html.markup(format!(
                                        r#"<p id="child-component">{}</p>"#,
                                        html.escape(value.as_str().unwrap_or_default())
                                    ))
                                })
                            }),
                    )
                    .map_err(|error| ActionError::new(error.to_string()))?;
                    Ok(ActionOutcome::done())
                })
            })
            .view(mock_view)
            .model(mock_model()),
    )
    .unwrap();

    let mock = rt.component("mock").unwrap();
    mock.call("addChild", &[]).unwrap();
    let child = doc.find_by_id("child-component").unwrap();
    assert_eq!(doc.text_content(child), "child");

    // parent re-renders leave the child's subtree alone
    mock.call("setTitle", &[json!("Else")]).unwrap();
    assert_eq!(doc.find_by_id("child-component"), Some(child));
    assert_eq!(doc.text_content(child), "child");
}

#[test]
fn test_self_mounting_view_hits_depth_limit() {
    let doc = Document::new();
    doc.set_body_markup(r#"<div data-component="loop"></div>"#)
        .unwrap();
    let rt = Runtime::new(doc);
    let error = rt
        .create(
            ComponentDef::named("loop")
                .actions(|_| ActionMap::new())
                .view(|| {
                    ViewObject::new()
                        .with_render(|_, html| html.markup(r#"<div data-component="loop"></div>"#))
                }),
        )
        .unwrap_err();
    assert!(matches!(
        error,
        CreateError::Render {
            source: RenderError::DepthExceeded { .. },
            ..
        }
    ));
}

// =============================================================================
// Event dispatch
// =============================================================================

#[test]
fn test_click_binding_calls_action_with_literals() {
    let (rt, doc) = setup();
    rt.create(
        ComponentDef::named("mock")
            .actions(|_| mock_actions())
            .model(mock_model())
            .view(|| {
                ViewObject::new().with_render(|_, html| {
                    html.markup(r#"<button data-click="double(4)">go</button>"#)
                })
            }),
    )
    .unwrap();
    let button = doc.find_by_tag("button").unwrap();
    assert!(rt.dispatch(button, EventKind::Click).unwrap());
    assert_eq!(rt.component("mock").unwrap().get("num"), Some(json!(8)));
}

#[test]
fn test_change_binding_passes_live_input_value() {
    let (rt, doc) = setup();
    let mock = create_mock(&rt);
    let input = doc.find_by_tag("input").unwrap();
    doc.set_value(input, "Typed title");
    assert!(rt.dispatch(input, EventKind::Change).unwrap());
    assert_eq!(mock.get("title"), Some(json!("Typed title")));
    let h1 = doc.find_by_tag("h1").unwrap();
    assert_eq!(doc.text_content(h1), "Typed title");
}

#[test]
fn test_dispatching_unbound_event_is_not_an_error() {
    let (rt, doc) = setup();
    create_mock(&rt);
    let h1 = doc.find_by_tag("h1").unwrap();
    assert!(!rt.dispatch(h1, EventKind::Click).unwrap());
}

#[test]
fn test_dispatching_binding_to_unknown_action_fails() {
    let (rt, doc) = setup();
    create_mock(&rt);
    // the view binds setSum, which the action map never defined
    let link = doc.find_by_tag("a").unwrap();
    let error = rt.dispatch(link, EventKind::Click).unwrap_err();
    assert!(matches!(error, CallError::UnknownAction { .. }));
}

// =============================================================================
// Isolation
// =============================================================================

#[test]
fn test_runtimes_are_isolated() {
    let (first_rt, first_doc) = setup();
    let (second_rt, second_doc) = setup();
    let first = create_mock(&first_rt);
    let second = create_mock(&second_rt);

    first.call("setTitle", &[json!("First only")]).unwrap();

    assert_eq!(first.get("title"), Some(json!("First only")));
    assert_eq!(second.get("title"), Some(json!("Mock title")));
    let first_h1 = first_doc.find_by_tag("h1").unwrap();
    let second_h1 = second_doc.find_by_tag("h1").unwrap();
    assert_eq!(first_doc.text_content(first_h1), "First only");
    assert_eq!(second_doc.text_content(second_h1), "Mock title");
}
