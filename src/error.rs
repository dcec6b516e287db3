//! Error taxonomy for the runtime.
//!
//! Every fallible surface has its own enum so callers can match on exactly
//! the failures that surface can produce:
//!
//! - [`ConfigError`] - rejected `create` calls (bad component definition)
//! - [`MarkupError`] - view output that could not be parsed into a node tree
//! - [`RenderError`] - a render pass that could not complete
//! - [`CreateError`] - everything `Runtime::create` can report
//! - [`CallError`] - everything a bound-action call can report
//! - [`ActionError`] - failures raised by user action logic
//! - [`AsyncActionError`] - deferred failures collected in the failure sink
//!
//! Validation failures are fatal to the call that triggered them, never to
//! the runtime: other components keep working.

use thiserror::Error;

// =============================================================================
// Configuration
// =============================================================================

/// A component definition the runtime refuses to accept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The definition carried no name. Nameless components could never be
    /// found in the registry or matched to a mount point.
    #[error("Your component needs a name")]
    MissingName,

    /// The definition carried no actions factory.
    #[error("{name} needs some actions! Components without actions cannot respond to anything")]
    MissingActions { name: String },
}

// =============================================================================
// Markup
// =============================================================================

/// View output that could not be parsed into a node tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// Input ended in the middle of a tag, a comment or a quoted value.
    #[error("markup ended unexpectedly near `{context}`")]
    UnexpectedEnd { context: String },

    /// A closing tag appeared with no element open.
    #[error("closing tag </{found}> has no matching opening tag")]
    UnexpectedClosingTag { found: String },

    /// A closing tag did not match the innermost open element.
    #[error("expected </{expected}> but found </{found}>")]
    MismatchedClosingTag { expected: String, found: String },

    /// An element was still open when its enclosing scope ended.
    #[error("element <{tag}> was never closed")]
    UnclosedElement { tag: String },

    /// A tag that could not be scanned at all.
    #[error("malformed tag near `{context}`")]
    MalformedTag { context: String },
}

// =============================================================================
// Rendering
// =============================================================================

/// A render pass that could not complete.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// Recursive child mounting went deeper than the configured limit.
    /// Almost always a component whose view mounts itself.
    #[error("mounting {name} exceeded the depth limit of {limit}")]
    DepthExceeded { name: String, limit: usize },
}

/// Everything [`Runtime::create`](crate::runtime::Runtime::create) can report.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The component was registered but its first render pass failed.
    #[error("first render of {name} failed: {source}")]
    Render {
        name: String,
        #[source]
        source: RenderError,
    },
}

// =============================================================================
// Actions
// =============================================================================

/// Failure raised by user action logic.
///
/// The runtime never constructs these for its own faults; the message is
/// whatever the action chose to report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Everything a bound-action call can report synchronously.
#[derive(Debug, Error)]
pub enum CallError {
    /// The action name was not in the component's action map.
    #[error("{component} has no action named {action}")]
    UnknownAction { component: String, action: String },

    /// The call arrived while an action of the same component was still
    /// running and holding the model borrow.
    #[error("cannot call {component}.{action} while {component} is mid-action")]
    Reentrant { component: String, action: String },

    #[error(transparent)]
    Action(#[from] ActionError),

    /// A render pass triggered by the action failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A failed deferred action step, recorded in the runtime's failure sink.
///
/// Sync failures propagate out of the triggering call; failures inside an
/// async step have no caller left to return to, so they land here instead
/// and wait for [`take_failed_actions`](crate::runtime::Runtime::take_failed_actions).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("async action {component}.{action} failed: {error}")]
pub struct AsyncActionError {
    pub component: String,
    pub action: String,
    pub error: ActionError,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_message() {
        assert_eq!(
            ConfigError::MissingName.to_string(),
            "Your component needs a name"
        );
    }

    #[test]
    fn test_missing_actions_message_leads_with_name() {
        let error = ConfigError::MissingActions {
            name: "mock".to_string(),
        };
        assert!(error.to_string().starts_with("mock needs some actions!"));
    }

    #[test]
    fn test_action_error_passes_message_through() {
        let error = ActionError::new("nope");
        assert_eq!(error.to_string(), "nope");
        assert_eq!(error.message(), "nope");
    }

    #[test]
    fn test_call_error_wraps_action_error() {
        let error = CallError::from(ActionError::new("boom"));
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn test_reentrant_message_names_component_and_action() {
        let error = CallError::Reentrant {
            component: "mock".to_string(),
            action: "double".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "cannot call mock.double while mock is mid-action"
        );
    }

    #[test]
    fn test_async_error_names_component_and_action() {
        let error = AsyncActionError {
            component: "mock".to_string(),
            action: "load".to_string(),
            error: ActionError::new("offline"),
        };
        assert_eq!(error.to_string(), "async action mock.load failed: offline");
    }
}
