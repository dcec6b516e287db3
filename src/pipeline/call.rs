//! Bound-action calls - where outcome shapes turn into render passes.

use std::rc::Rc;

use serde_json::Value;

use crate::engine::{ActionOutcome, ComponentInstance};
use crate::error::{ActionError, AsyncActionError, CallError};
use crate::runtime::Runtime;

use super::mount::render_pass;

/// Run a named action and drive its outcome.
///
/// Sync outcomes (values and steps) finish before this returns, renders
/// included. Future outcomes return immediately; the resolution renders on
/// a later [`Runtime::tick`](crate::runtime::Runtime::tick). A call that
/// lands while the same component is still mid-action is refused with
/// [`CallError::Reentrant`]; calls into other components are fine.
pub(crate) fn call_action(
    rt: &Runtime,
    instance: &Rc<ComponentInstance>,
    action: &str,
    args: &[Value],
) -> Result<(), CallError> {
    let Some(func) = instance.actions().get(action) else {
        return Err(CallError::UnknownAction {
            component: instance.name().to_string(),
            action: action.to_string(),
        });
    };
    tracing::debug!(component = instance.name(), action, "calling action");

    // the model borrow spans the action body; a call back into the same
    // component finds it taken and is refused, not a borrow panic
    let outcome = {
        let Some(mut model) = instance.try_model_mut() else {
            tracing::warn!(
                component = instance.name(),
                action,
                "action re-entered its own component"
            );
            return Err(CallError::Reentrant {
                component: instance.name().to_string(),
                action: action.to_string(),
            });
        };
        func(&mut model, args)?
    };

    match outcome {
        ActionOutcome::Value(_) => {
            let snapshot = instance.model();
            render_pass(rt, instance, &snapshot)?;
            Ok(())
        }
        ActionOutcome::Steps(steps) => {
            for step in steps {
                let value = step?;
                render_pass(rt, instance, &value)?;
            }
            Ok(())
        }
        ActionOutcome::Future(future) => {
            let task_rt = rt.clone();
            let instance = instance.clone();
            let action_name = action.to_string();
            rt.spawn(async move {
                match future.await {
                    Ok(value) => {
                        if let Err(error) = render_pass(&task_rt, &instance, &value) {
                            tracing::error!(
                                component = instance.name(),
                                action = %action_name,
                                %error,
                                "render after async action failed"
                            );
                            task_rt.record_failure(AsyncActionError {
                                component: instance.name().to_string(),
                                action: action_name,
                                error: ActionError::new(error.to_string()),
                            });
                        }
                    }
                    Err(error) => {
                        tracing::error!(
                            component = instance.name(),
                            action = %action_name,
                            %error,
                            "async action failed"
                        );
                        task_rt.record_failure(AsyncActionError {
                            component: instance.name().to_string(),
                            action: action_name,
                            error,
                        });
                    }
                }
            });
            Ok(())
        }
    }
}
