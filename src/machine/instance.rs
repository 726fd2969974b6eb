//! Instances: single walks through a state machine.

use crate::callbacks::Next;
use crate::core::{State, StateHistory, StateTransition};
use crate::machine::error::InstanceError;
use crate::machine::state_machine::StateMachine;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Key-value data carried by an instance.
pub type Context = HashMap<String, Value>;

/// Outcome of a successful [`Instance::execute`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The transition function chose to stay
    Stayed { state: String },

    /// The instance moved along a declared edge
    Transitioned { from: String, to: String },
}

/// One runtime walk through a [`StateMachine`].
///
/// An instance owns its context and its position. It is advanced only by
/// [`execute`](Self::execute), one step per call.
#[derive(Clone, Debug)]
pub struct Instance<Id = String> {
    machine: StateMachine<Id>,
    id: Id,
    current: usize,
    context: Context,
    history: StateHistory,
}

impl<Id> Instance<Id> {
    pub(crate) fn from_parts(
        machine: StateMachine<Id>,
        id: Id,
        current: usize,
        context: Context,
        history: StateHistory,
    ) -> Self {
        Self {
            machine,
            id,
            current,
            context,
            history,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn machine(&self) -> &StateMachine<Id> {
        &self.machine
    }

    /// Name of the current state.
    pub fn current_state(&self) -> &str {
        &self.state().name
    }

    pub fn state(&self) -> &State {
        self.machine.state_at(self.current)
    }

    pub fn is_start(&self) -> bool {
        self.state().start
    }

    pub fn is_end(&self) -> bool {
        self.state().end
    }

    /// Read a context value; `None` when the key was never set.
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Set a context value, returning the previous one.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.context.insert(key.into(), value.into())
    }

    pub fn remove_data(&mut self, key: &str) -> Option<Value> {
        self.context.remove(key)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Give the context back to the caller, e.g. to persist it.
    pub fn into_context(self) -> Context {
        self.context
    }

    /// Moves made by this instance value since it was created or loaded.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Run one step.
    ///
    /// Calls the current state's transition function. If it proposes a
    /// declared target, the instance moves there; then `on_executed` runs,
    /// followed by the target's enter hook. Staying in place still runs
    /// `on_executed`, with no old state.
    ///
    /// Errors from the transition function leave the instance where it
    /// was. Errors from the hooks are returned after the move has been
    /// made; the move is not undone.
    pub fn execute(&mut self) -> Result<StepResult, InstanceError> {
        let machine = self.machine.clone();
        let from = machine.state_at(self.current);

        if from.end {
            return Err(InstanceError::EndState {
                machine: machine.name().to_string(),
                state: from.name.clone(),
            });
        }

        let transition = machine.registry().transition(&from.name).ok_or_else(|| {
            InstanceError::MissingTransitionFn {
                machine: machine.name().to_string(),
                state: from.name.clone(),
            }
        })?;

        let next = transition
            .next(&machine, self)
            .map_err(InstanceError::Callback)?;

        let to = match next {
            Next::To(to) if !to.is_empty() => to,
            // an empty target built directly with `Next::To` is a stay too
            Next::Stay | Next::To(_) => {
                debug!(machine = %machine.name(), state = %from.name, "instance stayed");
                if let Some(hook) = machine.registry().on_executed() {
                    hook.on_executed(&machine, self, None)
                        .map_err(InstanceError::Callback)?;
                }
                return Ok(StepResult::Stayed {
                    state: from.name.clone(),
                });
            }
        };

        if !machine.has_transition(&from.name, &to) {
            return Err(InstanceError::TransitionNotFound {
                machine: machine.name().to_string(),
                from: from.name.clone(),
                to,
            });
        }

        let target = machine
            .index_of(&to)
            .ok_or_else(|| InstanceError::StateNotFound {
                machine: machine.name().to_string(),
                state: to.clone(),
            })?;

        self.current = target;
        self.history.record(StateTransition {
            from: from.name.clone(),
            to: to.clone(),
            timestamp: Utc::now(),
        });
        debug!(machine = %machine.name(), from = %from.name, to = %to, "instance transitioned");

        if let Some(hook) = machine.registry().on_executed() {
            hook.on_executed(&machine, self, Some(from.name.as_str()))
                .map_err(InstanceError::Callback)?;
        }
        if let Some(hook) = machine.registry().on_enter(&to) {
            hook.on_enter(&machine, self)
                .map_err(InstanceError::Callback)?;
        }

        Ok(StepResult::Transitioned {
            from: from.name.clone(),
            to,
        })
    }
}
