//! Counter Example - components, events and deferred actions
//!
//! This example demonstrates the core runtime flow:
//! - Creating components with a model, actions and a view
//! - Event bindings declared in markup (`data-click`)
//! - A child component mounted declaratively (`data-component`)
//! - A deferred action resolved on `tick`
//!
//! Run with: cargo run --example counter

use serde_json::{Value, json};
use sprig_dom::{ActionMap, ActionOutcome, ComponentDef, Document, EventKind, Runtime, ViewObject};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== sprig-dom Counter Example ===\n");

    // A document with one mount point
    let doc = Document::new();
    doc.set_body_markup(
        r#"
        <main>
            <div data-component="counter"></div>
        </main>
        "#,
    )?;
    let rt = Runtime::new(doc.clone());

    // The status child renders inside the counter's view. Created first,
    // it stays dormant until its mount point appears.
    rt.create(
        ComponentDef::named("status")
            .actions(|_| ActionMap::new())
            .model(json!({ "label": "ready" }))
            .view(|| {
                ViewObject::new().with_render(|model, html| {
                    html.markup(format!(
                        r#"<small class="status">{}</small>"#,
                        html.escape(model["label"].as_str().unwrap_or_default())
                    ))
                })
            }),
    )?;

    rt.create(
        ComponentDef::named("counter")
            .actions(|_| {
                ActionMap::new()
                    .action("increment", |model, _args| {
                        bump(model, 1);
                        Ok(ActionOutcome::done())
                    })
                    .action("decrement", |model, _args| {
                        bump(model, -1);
                        Ok(ActionOutcome::done())
                    })
                    .action("add", |model, args| {
                        let by = args.first().and_then(Value::as_i64).unwrap_or(0);
                        bump(model, by);
                        Ok(ActionOutcome::done())
                    })
                    .action("reset", |_model, _args| {
                        // resolves later; the view renders the resolved value
                        Ok(ActionOutcome::future(async { Ok(json!({ "count": 0 })) }))
                    })
            })
            .model(json!({ "count": 0 }))
            .view(|| {
                ViewObject::new()
                    .with_init(|model| {
                        tracing::info!(
                            count = model["count"].as_i64().unwrap_or(0),
                            "counter ready"
                        );
                    })
                    .with_render(|model, html| {
                        html.markup(format!(
                            concat!(
                                "<div>",
                                "<h1>{count}</h1>",
                                r#"<button id="up" data-click="increment">+</button>"#,
                                r#"<button id="down" data-click="decrement">-</button>"#,
                                r#"<button id="five" data-click="add(5)">+5</button>"#,
                                r#"<div data-component="status"></div>"#,
                                "</div>",
                            ),
                            count = model["count"].as_i64().unwrap_or(0),
                        ))
                    })
            }),
    )?;

    // Simulate three clicks on + and one on +5
    let up = doc.find_by_id("up").ok_or("missing #up button")?;
    for _ in 0..3 {
        rt.dispatch(up, EventKind::Click)?;
    }
    let five = doc.find_by_id("five").ok_or("missing #five button")?;
    rt.dispatch(five, EventKind::Click)?;

    let counter = rt.component("counter").ok_or("counter not registered")?;
    let count = counter.get("count").unwrap_or(Value::Null);
    println!("After clicks: count = {count}");

    // Deferred reset lands on the next tick
    counter.call("reset", &[])?;
    println!("Pending actions before tick: {}", rt.pending_actions());
    rt.tick();
    println!("Pending actions after tick:  {}", rt.pending_actions());

    println!("\nFinal document:");
    println!("{}", doc.body_html());
    Ok(())
}

fn bump(model: &mut Value, by: i64) {
    let current = model["count"].as_i64().unwrap_or(0);
    model["count"] = Value::from(current + by);
}
