//! Builder for constructing machine definitions.

use crate::builder::error::BuildError;
use crate::core::{State, TransitionConstraint};
use crate::definition::MachineDefinition;
use stillwater::validation::Validation;

/// Builder for constructing machine definitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use stepwise::builder::DefinitionBuilder;
///
/// let definition = DefinitionBuilder::new("Order")
///     .start("Created")
///     .state("Paid")
///     .end("Shipped")
///     .transition("Created", "Paid")
///     .transition("Paid", "Shipped")
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.states.len(), 3);
/// ```
pub struct DefinitionBuilder {
    name: String,
    states: Vec<State>,
    transitions: Vec<TransitionConstraint>,
}

impl DefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Add the start state.
    pub fn start(mut self, name: impl Into<String>) -> Self {
        self.states.push(State::start(name));
        self
    }

    /// Add an intermediate state.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(State::new(name));
        self
    }

    /// Add the end state.
    pub fn end(mut self, name: impl Into<String>) -> Self {
        self.states.push(State::end(name));
        self
    }

    /// Declare an allowed transition.
    pub fn transition(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.transitions.push(TransitionConstraint::new(from, to));
        self
    }

    /// Declare several transitions leaving the same state.
    pub fn transitions<I, S>(mut self, from: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transitions.extend(
            targets
                .into_iter()
                .map(|to| TransitionConstraint::new(from, to)),
        );
        self
    }

    /// Build the definition.
    /// Returns every structural problem found if the graph is invalid.
    pub fn build(self) -> Result<MachineDefinition, BuildError> {
        let definition = MachineDefinition::new(self.name, self.states, self.transitions);
        match definition.validate() {
            Validation::Success(_) => Ok(definition),
            Validation::Failure(errors) => Err(BuildError::Invalid {
                errors: errors.iter().cloned().collect(),
            }),
        }
    }
}
