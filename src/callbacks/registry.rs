//! Callback lookup tables keyed by state name.

use super::{Callbacks, OnEnter, OnExecuted, Transition};
use crate::core::State;
use crate::definition::DefinitionError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Callbacks resolved against a machine's states.
///
/// Built once by `initialize`, read-only afterwards.
pub(crate) struct Registry<Id> {
    transitions: HashMap<String, Arc<dyn Transition<Id>>>,
    enter: HashMap<String, Arc<dyn OnEnter<Id>>>,
    on_executed: Option<Arc<dyn OnExecuted<Id>>>,
}

impl<Id> Registry<Id> {
    /// Attach registered callbacks to `states`.
    ///
    /// Fails on a callback for an unknown state, on a second registration
    /// for the same state, and on a non-end state left without a
    /// transition function.
    pub(crate) fn attach(
        callbacks: Callbacks<Id>,
        machine: &str,
        states: &[State],
        index: &HashMap<String, usize>,
    ) -> Result<Self, DefinitionError> {
        let mut transitions = HashMap::new();
        for (state, transition) in callbacks.transitions {
            if !index.contains_key(&state) {
                return Err(DefinitionError::UnknownState {
                    machine: machine.to_string(),
                    state,
                });
            }
            match transitions.entry(state) {
                Entry::Occupied(entry) => {
                    return Err(DefinitionError::DuplicateTransitionFn {
                        machine: machine.to_string(),
                        state: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(transition);
                }
            }
        }

        let mut enter = HashMap::new();
        for (state, hook) in callbacks.enter {
            if !index.contains_key(&state) {
                return Err(DefinitionError::UnknownState {
                    machine: machine.to_string(),
                    state,
                });
            }
            match enter.entry(state) {
                Entry::Occupied(entry) => {
                    return Err(DefinitionError::DuplicateEnterFn {
                        machine: machine.to_string(),
                        state: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(hook);
                }
            }
        }

        // end states never execute, everything else must be able to
        if let Some(state) = states
            .iter()
            .find(|s| !s.end && !transitions.contains_key(&s.name))
        {
            return Err(DefinitionError::MissingTransitionFn {
                machine: machine.to_string(),
                state: state.name.clone(),
            });
        }

        Ok(Self {
            transitions,
            enter,
            on_executed: callbacks.on_executed,
        })
    }

    pub(crate) fn transition(&self, state: &str) -> Option<&Arc<dyn Transition<Id>>> {
        self.transitions.get(state)
    }

    pub(crate) fn on_enter(&self, state: &str) -> Option<&Arc<dyn OnEnter<Id>>> {
        self.enter.get(state)
    }

    pub(crate) fn on_executed(&self) -> Option<&Arc<dyn OnExecuted<Id>>> {
        self.on_executed.as_ref()
    }
}
