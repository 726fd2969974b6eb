//! Declarative machine definitions.
//!
//! A definition is the raw graph: a machine name, its states and the
//! allowed transitions between them. It is plain serde data, usually
//! loaded from JSON:
//!
//! ```json
//! {
//!   "name": "StateMachine",
//!   "states": [
//!     {"start": true, "name": "Start"},
//!     {"end": true, "name": "End"},
//!     {"name": "Welcome"}
//!   ],
//!   "transitions": [
//!     {"from": "Start", "to": "Welcome"},
//!     {"from": "Welcome", "to": "End"}
//!   ]
//! }
//! ```
//!
//! A definition does nothing on its own. It becomes runnable once
//! [`initialize`](crate::machine::initialize) pairs it with callbacks.

use crate::callbacks::Callbacks;
use crate::core::{State, TransitionConstraint};
use crate::machine::StateMachine;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

pub mod error;

pub use error::DefinitionError;

/// Raw state machine definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineDefinition {
    pub name: String,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub transitions: Vec<TransitionConstraint>,
    #[serde(skip)]
    initialized: bool,
}

impl MachineDefinition {
    pub fn new(
        name: impl Into<String>,
        states: Vec<State>,
        transitions: Vec<TransitionConstraint>,
    ) -> Self {
        Self {
            name: name.into(),
            states,
            transitions,
            initialized: false,
        }
    }

    /// Parse a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a definition from a JSON reader.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether a machine has already been initialized from this definition.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Initialize a machine from this definition.
    ///
    /// Shorthand for [`crate::machine::initialize`].
    pub fn initialize<Id>(
        &mut self,
        callbacks: Callbacks<Id>,
    ) -> Result<StateMachine<Id>, DefinitionError> {
        crate::machine::initialize(self, callbacks)
    }

    /// Check the graph structure, accumulating every problem found.
    ///
    /// Unlike `initialize`, which stops at the first error, this reports
    /// all of them at once. Callbacks are not considered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stepwise::core::{State, TransitionConstraint};
    /// use stepwise::definition::MachineDefinition;
    /// use stillwater::validation::Validation;
    ///
    /// let definition = MachineDefinition::new(
    ///     "",
    ///     vec![State::new("A"), State::new("A")],
    ///     vec![TransitionConstraint::new("A", "B")],
    /// );
    ///
    /// match definition.validate() {
    ///     // missing name, duplicate A, no start, no end, unknown B
    ///     Validation::Failure(errors) => assert_eq!(errors.len(), 5),
    ///     Validation::Success(_) => panic!("expected failures"),
    /// }
    /// ```
    pub fn validate(&self) -> Validation<(), NonEmptyVec<DefinitionError>> {
        let machine = self.name.clone();
        let mut checks: Vec<Validation<(), NonEmptyVec<DefinitionError>>> = Vec::new();

        checks.push(check(!self.name.is_empty(), || {
            DefinitionError::MissingName
        }));
        checks.push(check(self.states.len() >= 2, || {
            DefinitionError::TooFewStates {
                machine: machine.clone(),
                count: self.states.len(),
            }
        }));
        checks.push(check(!self.transitions.is_empty(), || {
            DefinitionError::NoTransitions {
                machine: machine.clone(),
            }
        }));

        let mut names = HashSet::new();
        for state in &self.states {
            checks.push(check(!state.name.is_empty(), || {
                DefinitionError::EmptyStateName {
                    machine: machine.clone(),
                }
            }));
            checks.push(check(names.insert(state.name.as_str()), || {
                DefinitionError::DuplicateState {
                    machine: machine.clone(),
                    state: state.name.clone(),
                }
            }));
        }

        let starts: Vec<&State> = self.states.iter().filter(|s| s.start).collect();
        let ends: Vec<&State> = self.states.iter().filter(|s| s.end).collect();
        checks.push(check(!starts.is_empty(), || DefinitionError::MissingStart {
            machine: machine.clone(),
        }));
        checks.push(check(!ends.is_empty(), || DefinitionError::MissingEnd {
            machine: machine.clone(),
        }));
        for extra in starts.iter().skip(1) {
            checks.push(Validation::fail(DefinitionError::DuplicateStart {
                machine: machine.clone(),
                state: extra.name.clone(),
            }));
        }
        for extra in ends.iter().skip(1) {
            checks.push(Validation::fail(DefinitionError::DuplicateEnd {
                machine: machine.clone(),
                state: extra.name.clone(),
            }));
        }

        for transition in &self.transitions {
            for endpoint in [&transition.from, &transition.to] {
                checks.push(check(names.contains(endpoint.as_str()), || {
                    DefinitionError::UnknownTransitionState {
                        machine: machine.clone(),
                        from: transition.from.clone(),
                        to: transition.to.clone(),
                        state: endpoint.clone(),
                    }
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

fn check<F>(ok: bool, error: F) -> Validation<(), NonEmptyVec<DefinitionError>>
where
    F: FnOnce() -> DefinitionError,
{
    if ok {
        Validation::success(())
    } else {
        Validation::fail(error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "name": "StateMachine",
        "states": [
            {"start": true, "name": "Start"},
            {"end": true, "name": "End"},
            {"name": "Welcome"}
        ],
        "transitions": [
            {"from": "Start", "to": "Welcome"},
            {"from": "Welcome", "to": "End"}
        ]
    }"#;

    fn errors_of(definition: &MachineDefinition) -> Vec<DefinitionError> {
        match definition.validate() {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    #[test]
    fn from_json_reads_declared_fields() {
        let definition = MachineDefinition::from_json(JSON).unwrap();

        assert_eq!(definition.name, "StateMachine");
        assert_eq!(definition.states.len(), 3);
        assert!(definition.states[0].start);
        assert!(definition.states[1].end);
        assert_eq!(
            definition.transitions[1],
            TransitionConstraint::new("Welcome", "End")
        );
        assert!(!definition.is_initialized());
    }

    #[test]
    fn from_json_reader_matches_from_json() {
        let from_reader = MachineDefinition::from_json_reader(JSON.as_bytes()).unwrap();
        assert_eq!(from_reader, MachineDefinition::from_json(JSON).unwrap());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = MachineDefinition::from_json(r#"{"name": 3}"#);
        assert!(matches!(result, Err(DefinitionError::Parse(_))));
    }

    #[test]
    fn json_round_trip_keeps_graph() {
        let definition = MachineDefinition::from_json(JSON).unwrap();
        let json = definition.to_json().unwrap();

        assert_eq!(MachineDefinition::from_json(&json).unwrap(), definition);
    }

    #[test]
    fn valid_definition_passes_validation() {
        let definition = MachineDefinition::from_json(JSON).unwrap();
        assert!(errors_of(&definition).is_empty());
    }

    #[test]
    fn validation_accumulates_all_problems() {
        let definition = MachineDefinition::new(
            "Broken",
            vec![State::start("A"), State::start("B"), State::new("A")],
            vec![TransitionConstraint::new("A", "Nowhere")],
        );

        let errors = errors_of(&definition);

        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&DefinitionError::DuplicateState {
            machine: "Broken".to_string(),
            state: "A".to_string(),
        }));
        assert!(errors.contains(&DefinitionError::DuplicateStart {
            machine: "Broken".to_string(),
            state: "B".to_string(),
        }));
        assert!(errors.contains(&DefinitionError::MissingEnd {
            machine: "Broken".to_string(),
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DefinitionError::UnknownTransitionState { state, .. } if state == "Nowhere")));
    }

    #[test]
    fn validation_rejects_empty_state_name() {
        let definition = MachineDefinition::new(
            "Blank",
            vec![State::start("A"), State::end("")],
            vec![TransitionConstraint::new("A", "")],
        );

        assert_eq!(
            errors_of(&definition),
            vec![DefinitionError::EmptyStateName {
                machine: "Blank".to_string()
            }]
        );
    }

    #[test]
    fn validation_reports_empty_definition() {
        let errors = errors_of(&MachineDefinition::default());

        assert!(errors.contains(&DefinitionError::MissingName));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DefinitionError::TooFewStates { count: 0, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DefinitionError::NoTransitions { .. })));
    }
}
