//! Errors raised while loading or stepping an instance.

use crate::callbacks::BoxError;
use thiserror::Error;

/// Errors that can occur when an instance is loaded or executed.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("instance is in end state {state} of {machine}")]
    EndState { machine: String, state: String },

    #[error("transition function not found for state {state} in {machine}")]
    MissingTransitionFn { machine: String, state: String },

    #[error("transition from {from} to {to} not found in {machine}")]
    TransitionNotFound {
        machine: String,
        from: String,
        to: String,
    },

    #[error("state {state} not found in {machine}")]
    StateNotFound { machine: String, state: String },

    /// Error returned by a transition function or hook, unchanged.
    #[error(transparent)]
    Callback(BoxError),
}
