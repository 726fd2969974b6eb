//! Callback capabilities attached to a machine at initialization.
//!
//! Three capabilities exist:
//! - [`Transition`]: decides where an instance goes next from a given state
//! - [`OnEnter`]: runs right after an instance enters a given state
//! - [`OnExecuted`]: machine-wide, runs after every attempted step
//!
//! Each is implemented for plain closures, so most callers never name the
//! traits. Callbacks only see read-only views of the machine and instance:
//! the only way a callback changes an instance's position is the [`Next`]
//! value a transition function returns.

use crate::machine::{Instance, StateMachine};
use std::sync::Arc;

mod registry;

pub(crate) use registry::Registry;

/// Error type returned by user callbacks.
///
/// Passed through unchanged to the caller of `Instance::execute`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Decision returned by a transition function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Next {
    /// Stay in the current state; no transition happens this step
    Stay,
    /// Move to the named state, which must be a declared target
    To(String),
}

impl Next {
    /// Move to `state`; an empty name is the same as [`Next::Stay`].
    pub fn to(state: impl Into<String>) -> Self {
        Next::from(state.into())
    }
}

/// An empty name means "stay".
impl From<&str> for Next {
    fn from(state: &str) -> Self {
        if state.is_empty() {
            Next::Stay
        } else {
            Next::To(state.to_string())
        }
    }
}

impl From<String> for Next {
    fn from(state: String) -> Self {
        if state.is_empty() {
            Next::Stay
        } else {
            Next::To(state)
        }
    }
}

impl From<Option<String>> for Next {
    fn from(state: Option<String>) -> Self {
        state.map_or(Next::Stay, Next::from)
    }
}

/// Per-state function choosing the next state.
pub trait Transition<Id>: Send + Sync {
    fn next(&self, machine: &StateMachine<Id>, instance: &Instance<Id>) -> Result<Next, BoxError>;
}

impl<Id, F> Transition<Id> for F
where
    F: Fn(&StateMachine<Id>, &Instance<Id>) -> Result<Next, BoxError> + Send + Sync,
{
    fn next(&self, machine: &StateMachine<Id>, instance: &Instance<Id>) -> Result<Next, BoxError> {
        self(machine, instance)
    }
}

/// Per-state hook invoked after an instance enters the state.
pub trait OnEnter<Id>: Send + Sync {
    fn on_enter(&self, machine: &StateMachine<Id>, instance: &Instance<Id>) -> Result<(), BoxError>;
}

impl<Id, F> OnEnter<Id> for F
where
    F: Fn(&StateMachine<Id>, &Instance<Id>) -> Result<(), BoxError> + Send + Sync,
{
    fn on_enter(&self, machine: &StateMachine<Id>, instance: &Instance<Id>) -> Result<(), BoxError> {
        self(machine, instance)
    }
}

/// Machine-wide hook invoked after every attempted step.
///
/// `old_state` is the state left by the step, or `None` when the
/// transition function chose to stay. The instance is already at its
/// new position when this runs.
pub trait OnExecuted<Id>: Send + Sync {
    fn on_executed(
        &self,
        machine: &StateMachine<Id>,
        instance: &Instance<Id>,
        old_state: Option<&str>,
    ) -> Result<(), BoxError>;
}

impl<Id, F> OnExecuted<Id> for F
where
    F: Fn(&StateMachine<Id>, &Instance<Id>, Option<&str>) -> Result<(), BoxError> + Send + Sync,
{
    fn on_executed(
        &self,
        machine: &StateMachine<Id>,
        instance: &Instance<Id>,
        old_state: Option<&str>,
    ) -> Result<(), BoxError> {
        self(machine, instance, old_state)
    }
}

/// Callbacks registered for a machine, in registration order.
///
/// Registration is unchecked; unknown states and duplicate registrations
/// are reported by `initialize`.
///
/// # Example
///
/// ```rust
/// use stepwise::callbacks::{Callbacks, Next};
///
/// let callbacks: Callbacks = Callbacks::new()
///     .transition("Start", |_, _| Ok(Next::to("End")))
///     .on_enter("End", |_, instance| {
///         println!("{} finished", instance.id());
///         Ok(())
///     })
///     .on_executed(|_, _, _| Ok(()));
/// ```
pub struct Callbacks<Id = String> {
    pub(crate) transitions: Vec<(String, Arc<dyn Transition<Id>>)>,
    pub(crate) enter: Vec<(String, Arc<dyn OnEnter<Id>>)>,
    pub(crate) on_executed: Option<Arc<dyn OnExecuted<Id>>>,
}

impl<Id> Callbacks<Id> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            enter: Vec::new(),
            on_executed: None,
        }
    }

    /// Register a transition closure for `state`.
    pub fn transition<F>(self, state: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StateMachine<Id>, &Instance<Id>) -> Result<Next, BoxError> + Send + Sync + 'static,
    {
        self.transition_with(state, f)
    }

    /// Register any [`Transition`] implementation for `state`.
    pub fn transition_with<T>(mut self, state: impl Into<String>, transition: T) -> Self
    where
        T: Transition<Id> + 'static,
    {
        self.transitions.push((state.into(), Arc::new(transition)));
        self
    }

    /// Register an enter hook closure for `state`.
    pub fn on_enter<F>(self, state: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StateMachine<Id>, &Instance<Id>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_enter_with(state, f)
    }

    pub fn on_enter_with<H>(mut self, state: impl Into<String>, hook: H) -> Self
    where
        H: OnEnter<Id> + 'static,
    {
        self.enter.push((state.into(), Arc::new(hook)));
        self
    }

    /// Set the machine-wide step hook, replacing any previous one.
    pub fn on_executed<F>(self, f: F) -> Self
    where
        F: Fn(&StateMachine<Id>, &Instance<Id>, Option<&str>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.on_executed_with(f)
    }

    pub fn on_executed_with<H>(mut self, hook: H) -> Self
    where
        H: OnExecuted<Id> + 'static,
    {
        self.on_executed = Some(Arc::new(hook));
        self
    }
}

impl<Id> Default for Callbacks<Id> {
    fn default() -> Self {
        Self::new()
    }
}
