//! Configuration errors raised while loading or initializing a definition.

use thiserror::Error;

/// Errors that can occur when a machine definition is loaded, validated,
/// or initialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("state machine name is required")]
    MissingName,

    #[error("state machine {machine} should have at least start and end states (found {count})")]
    TooFewStates { machine: String, count: usize },

    #[error("state machine {machine} should have at least one transition")]
    NoTransitions { machine: String },

    #[error("state machine {machine} already initialized")]
    AlreadyInitialized { machine: String },

    #[error("state names must not be empty in {machine}")]
    EmptyStateName { machine: String },

    #[error("state {state} already exists in {machine}")]
    DuplicateState { machine: String, state: String },

    #[error("start state should be unique in {machine} (second start: {state})")]
    DuplicateStart { machine: String, state: String },

    #[error("end state should be unique in {machine} (second end: {state})")]
    DuplicateEnd { machine: String, state: String },

    #[error("state machine {machine} has no start state")]
    MissingStart { machine: String },

    #[error("state machine {machine} has no end state")]
    MissingEnd { machine: String },

    #[error("transition from {from} to {to} references unknown state {state} in {machine}")]
    UnknownTransitionState {
        machine: String,
        from: String,
        to: String,
        state: String,
    },

    #[error("state {state} not found in {machine}")]
    UnknownState { machine: String, state: String },

    #[error("state {state} already has a transition function in {machine}")]
    DuplicateTransitionFn { machine: String, state: String },

    #[error("state {state} already has an enter function in {machine}")]
    DuplicateEnterFn { machine: String, state: String },

    #[error("state {state} should have a transition function in {machine}")]
    MissingTransitionFn { machine: String, state: String },

    #[error("invalid machine definition: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for DefinitionError {
    fn from(err: serde_json::Error) -> Self {
        DefinitionError::Parse(err.to_string())
    }
}
