//! Machine initialization and the shared machine handle.

use crate::callbacks::{Callbacks, Registry};
use crate::core::{State, TransitionConstraint};
use crate::definition::{DefinitionError, MachineDefinition};
use crate::machine::error::InstanceError;
use crate::machine::instance::{Context, Instance};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Validate `definition` together with `callbacks` and build a machine.
///
/// Initialization is one-shot: once it succeeds, the definition is marked
/// initialized and any further call fails with
/// [`DefinitionError::AlreadyInitialized`]. A failed call leaves the
/// definition untouched and may be retried.
///
/// # Example
///
/// ```rust
/// use stepwise::callbacks::{Callbacks, Next};
/// use stepwise::core::{State, TransitionConstraint};
/// use stepwise::definition::MachineDefinition;
/// use stepwise::machine::initialize;
///
/// let mut definition = MachineDefinition::new(
///     "Door",
///     vec![State::start("Closed"), State::end("Open")],
///     vec![TransitionConstraint::new("Closed", "Open")],
/// );
/// let callbacks = Callbacks::new().transition("Closed", |_, _| Ok(Next::to("Open")));
///
/// let machine = initialize(&mut definition, callbacks).unwrap();
/// let mut instance = machine.new_instance("front-door");
///
/// instance.execute().unwrap();
/// assert!(instance.is_end());
///
/// // a second initialization is refused
/// assert!(initialize::<String>(&mut definition, Callbacks::new()).is_err());
/// ```
pub fn initialize<Id>(
    definition: &mut MachineDefinition,
    callbacks: Callbacks<Id>,
) -> Result<StateMachine<Id>, DefinitionError> {
    if definition.name.is_empty() {
        return Err(DefinitionError::MissingName);
    }
    let machine = definition.name.clone();

    if definition.states.len() < 2 {
        return Err(DefinitionError::TooFewStates {
            machine,
            count: definition.states.len(),
        });
    }
    if definition.transitions.is_empty() {
        return Err(DefinitionError::NoTransitions { machine });
    }
    if definition.is_initialized() {
        return Err(DefinitionError::AlreadyInitialized { machine });
    }

    let mut index = HashMap::with_capacity(definition.states.len());
    let mut start = None;
    let mut end = None;
    for (i, state) in definition.states.iter().enumerate() {
        // an empty name is the stay signal and could never be entered
        if state.name.is_empty() {
            return Err(DefinitionError::EmptyStateName { machine });
        }
        if index.insert(state.name.clone(), i).is_some() {
            return Err(DefinitionError::DuplicateState {
                machine,
                state: state.name.clone(),
            });
        }
        if state.start && start.is_some() {
            return Err(DefinitionError::DuplicateStart {
                machine,
                state: state.name.clone(),
            });
        }
        if state.end && end.is_some() {
            return Err(DefinitionError::DuplicateEnd {
                machine,
                state: state.name.clone(),
            });
        }
        if state.start {
            start = Some(i);
        }
        if state.end {
            end = Some(i);
        }
    }
    let start = start.ok_or_else(|| DefinitionError::MissingStart {
        machine: machine.clone(),
    })?;
    let end = end.ok_or_else(|| DefinitionError::MissingEnd {
        machine: machine.clone(),
    })?;

    for transition in &definition.transitions {
        for endpoint in [&transition.from, &transition.to] {
            if !index.contains_key(endpoint) {
                return Err(DefinitionError::UnknownTransitionState {
                    machine,
                    from: transition.from.clone(),
                    to: transition.to.clone(),
                    state: endpoint.clone(),
                });
            }
        }
    }

    let registry = Registry::attach(callbacks, &machine, &definition.states, &index)?;

    definition.mark_initialized();
    debug!(
        machine = %machine,
        states = definition.states.len(),
        transitions = definition.transitions.len(),
        "state machine initialized"
    );

    Ok(StateMachine {
        inner: Arc::new(Inner {
            name: machine,
            states: definition.states.clone(),
            transitions: definition.transitions.clone(),
            index,
            start,
            end,
            registry,
        }),
    })
}

struct Inner<Id> {
    name: String,
    states: Vec<State>,
    transitions: Vec<TransitionConstraint>,
    index: HashMap<String, usize>,
    start: usize,
    end: usize,
    registry: Registry<Id>,
}

/// An initialized, read-only state machine.
///
/// Cloning is cheap and yields a handle to the same machine. Handles are
/// `Send + Sync`, so instances on different threads can share one.
pub struct StateMachine<Id = String> {
    inner: Arc<Inner<Id>>,
}

impl<Id> Clone for StateMachine<Id> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Id> fmt::Debug for StateMachine<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.inner.name)
            .field("states", &self.inner.states)
            .field("transitions", &self.inner.transitions)
            .finish_non_exhaustive()
    }
}

impl<Id> StateMachine<Id> {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// States in declaration order.
    pub fn states(&self) -> &[State] {
        &self.inner.states
    }

    /// Declared transition constraints in declaration order.
    pub fn transitions(&self) -> &[TransitionConstraint] {
        &self.inner.transitions
    }

    pub fn start_state(&self) -> &State {
        &self.inner.states[self.inner.start]
    }

    pub fn end_state(&self) -> &State {
        &self.inner.states[self.inner.end]
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<&State> {
        self.index_of(name).map(|i| &self.inner.states[i])
    }

    /// Whether `from -> to` was declared.
    pub fn has_transition(&self, from: &str, to: &str) -> bool {
        self.inner.transitions.iter().any(|t| t.allows(from, to))
    }

    /// Declared targets reachable in one step from `from`.
    pub fn transitions_from<'a>(&'a self, from: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.inner
            .transitions
            .iter()
            .filter(move |t| t.from == from)
            .map(|t| t.to.as_str())
    }

    pub fn has_transition_fn(&self, state: &str) -> bool {
        self.inner.registry.transition(state).is_some()
    }

    pub fn has_enter_fn(&self, state: &str) -> bool {
        self.inner.registry.on_enter(state).is_some()
    }

    /// Create an instance at the start state with an empty context.
    pub fn new_instance(&self, id: Id) -> Instance<Id> {
        trace!(machine = %self.inner.name, "new instance");
        Instance::from_parts(self.clone(), id, self.inner.start, Context::new(), Default::default())
    }

    /// Resume an instance at `state` with a previously stored context.
    ///
    /// A missing context is replaced by an empty one. The context is moved
    /// into the instance; read it back with [`Instance::context`] or
    /// [`Instance::into_context`] after executing.
    pub fn load_instance(
        &self,
        id: Id,
        context: Option<Context>,
        state: &str,
    ) -> Result<Instance<Id>, InstanceError> {
        let current = self.index_of(state).ok_or_else(|| InstanceError::StateNotFound {
            machine: self.inner.name.clone(),
            state: state.to_string(),
        })?;
        trace!(machine = %self.inner.name, state, "instance loaded");
        Ok(Instance::from_parts(
            self.clone(),
            id,
            current,
            context.unwrap_or_default(),
            Default::default(),
        ))
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.inner.index.get(name).copied()
    }

    pub(crate) fn state_at(&self, index: usize) -> &State {
        &self.inner.states[index]
    }

    pub(crate) fn registry(&self) -> &Registry<Id> {
        &self.inner.registry
    }
}
