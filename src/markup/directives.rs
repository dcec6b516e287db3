//! Directive collection - the visitor pass that runs between parsing and
//! reconciliation.
//!
//! Two attribute conventions carry runtime meaning:
//! - `data-component="name"` declares a child mount point
//! - `data-<event>="action(args)"` binds a DOM event to a component action
//!
//! [`collect_directives`] walks a parsed tree once and returns both sets,
//! each entry addressed by its tree path. The reconciler never sees these
//! conventions; callers resolve paths against the live document after
//! patching.
//!
//! Binding expressions are a deliberately tiny call grammar:
//!
//! ```text
//! clearTitle
//! setSum(2, 3)
//! setTitle(this.value)
//! label('a, b', true, null)
//! ```
//!
//! Arguments are JSON-ish literals plus `this.value`, which reads the bound
//! element's live value at dispatch time. An expression that does not fit
//! the grammar is logged and dropped; one bad binding never fails a render.

use std::fmt;

use serde_json::Value;

use super::MarkupNode;

/// Path from a subtree root down to a node: child indexes, outermost first.
pub type TreePath = Vec<usize>;

// =============================================================================
// Events
// =============================================================================

/// DOM events the runtime can bind actions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Input,
    Submit,
    Keydown,
    Keyup,
    Focus,
    Blur,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::Click,
        EventKind::Change,
        EventKind::Input,
        EventKind::Submit,
        EventKind::Keydown,
        EventKind::Keyup,
        EventKind::Focus,
        EventKind::Blur,
    ];

    /// The event name as the DOM knows it.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Input => "input",
            EventKind::Submit => "submit",
            EventKind::Keydown => "keydown",
            EventKind::Keyup => "keyup",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }

    /// The `data-*` attribute that binds this event.
    pub fn attr(self) -> &'static str {
        match self {
            EventKind::Click => "data-click",
            EventKind::Change => "data-change",
            EventKind::Input => "data-input",
            EventKind::Submit => "data-submit",
            EventKind::Keydown => "data-keydown",
            EventKind::Keyup => "data-keyup",
            EventKind::Focus => "data-focus",
            EventKind::Blur => "data-blur",
        }
    }

    pub fn from_attr(attr: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.attr() == attr)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Directives
// =============================================================================

/// One argument of an event-bound action invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgExpr {
    /// A literal carried verbatim to the action.
    Literal(Value),
    /// `this.value` - the bound element's live value at dispatch time.
    NodeValue,
}

/// An action invocation declared on an element via a `data-<event>` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub path: TreePath,
    pub event: EventKind,
    pub action: String,
    pub args: Vec<ArgExpr>,
}

/// A child-component mount point declared via `data-component`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildMount {
    pub path: TreePath,
    pub name: String,
}

/// Everything a render pass needs to know about a markup tree beyond its shape.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Directives {
    pub mounts: Vec<ChildMount>,
    pub bindings: Vec<EventBinding>,
}

/// Walk a parsed tree and collect mount points and event bindings.
///
/// Collection stops at mount points: everything below a `data-component`
/// element belongs to that child's own render pass. Bindings declared on
/// the mount element itself still belong to the parent.
pub fn collect_directives(nodes: &[MarkupNode]) -> Directives {
    let mut directives = Directives::default();
    let mut path = TreePath::new();
    visit(nodes, &mut path, &mut directives);
    directives
}

fn visit(nodes: &[MarkupNode], path: &mut TreePath, directives: &mut Directives) {
    for (index, node) in nodes.iter().enumerate() {
        let Some(element) = node.as_element() else {
            continue;
        };
        path.push(index);
        for (attr, value) in &element.attrs {
            let Some(event) = EventKind::from_attr(attr) else {
                continue;
            };
            match parse_invocation(value) {
                Ok((action, args)) => directives.bindings.push(EventBinding {
                    path: path.clone(),
                    event,
                    action,
                    args,
                }),
                Err(reason) => {
                    tracing::warn!(%attr, %value, %reason, "ignoring unparsable event binding");
                }
            }
        }
        match element.component_name() {
            Some(name) => directives.mounts.push(ChildMount {
                path: path.clone(),
                name: name.to_string(),
            }),
            None => visit(&element.children, path, directives),
        }
        path.pop();
    }
}

// =============================================================================
// Invocation grammar
// =============================================================================

fn parse_invocation(expr: &str) -> Result<(String, Vec<ArgExpr>), String> {
    let expr = expr.trim();
    let Some(open) = expr.find('(') else {
        if !is_ident(expr) {
            return Err(format!("`{expr}` is not an action name"));
        }
        return Ok((expr.to_string(), Vec::new()));
    };
    let name = expr[..open].trim();
    if !is_ident(name) {
        return Err(format!("`{name}` is not an action name"));
    }
    let rest = expr[open + 1..].trim_end();
    let Some(inner) = rest.strip_suffix(')') else {
        return Err("missing closing parenthesis".to_string());
    };
    Ok((name.to_string(), parse_args(inner)?))
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn parse_args(inner: &str) -> Result<Vec<ArgExpr>, String> {
    let mut args = Vec::new();
    let mut rest = inner.trim();
    while !rest.is_empty() {
        let (arg, tail) = take_arg(rest)?;
        args.push(arg);
        rest = tail.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some(after_comma) = rest.strip_prefix(',') else {
            return Err(format!("expected `,` near `{rest}`"));
        };
        rest = after_comma.trim_start();
        if rest.is_empty() {
            return Err("trailing comma".to_string());
        }
    }
    Ok(args)
}

fn take_arg(input: &str) -> Result<(ArgExpr, &str), String> {
    let first = input.chars().next().ok_or("empty argument")?;
    if first == '"' || first == '\'' {
        for (index, ch) in input.char_indices().skip(1) {
            if ch == first {
                let literal = Value::String(input[1..index].to_string());
                return Ok((ArgExpr::Literal(literal), &input[index + 1..]));
            }
        }
        return Err("unterminated string literal".to_string());
    }
    let end = input.find(',').unwrap_or(input.len());
    let token = input[..end].trim();
    let rest = &input[end..];
    let arg = match token {
        "this.value" => ArgExpr::NodeValue,
        "true" => ArgExpr::Literal(Value::Bool(true)),
        "false" => ArgExpr::Literal(Value::Bool(false)),
        "null" => ArgExpr::Literal(Value::Null),
        _ => {
            if let Ok(int) = token.parse::<i64>() {
                ArgExpr::Literal(Value::from(int))
            } else if let Ok(float) = token.parse::<f64>() {
                let number = serde_json::Number::from_f64(float)
                    .ok_or_else(|| format!("`{token}` is not a finite number"))?;
                ArgExpr::Literal(Value::Number(number))
            } else {
                return Err(format!("unsupported argument `{token}`"));
            }
        }
    };
    Ok((arg, rest))
}
