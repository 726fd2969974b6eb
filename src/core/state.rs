//! State and transition constraint records.
//!
//! These are plain data: they describe the graph a machine walks but carry
//! no behavior. Callbacks are attached separately when the machine is
//! initialized.

use serde::{Deserialize, Serialize};

/// A named node in the state graph.
///
/// Field names match the declarative format exactly (`name`, `start`,
/// `end`). The flags default to `false` when absent.
///
/// # Example
///
/// ```rust
/// use stepwise::core::State;
///
/// let state: State = serde_json::from_str(r#"{"start": true, "name": "Start"}"#).unwrap();
///
/// assert_eq!(state.name, "Start");
/// assert!(state.start);
/// assert!(!state.end);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Unique name of the state within its machine
    pub name: String,
    /// Instances created with `new_instance` begin here
    #[serde(default)]
    pub start: bool,
    /// Terminal state, no transitions leave it
    #[serde(default)]
    pub end: bool,
}

impl State {
    /// Create an intermediate state (neither start nor end).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: false,
            end: false,
        }
    }

    /// Create a start-flagged state.
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: true,
            ..Self::new(name)
        }
    }

    /// Create an end-flagged state.
    pub fn end(name: impl Into<String>) -> Self {
        Self {
            end: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_start(&self) -> bool {
        self.start
    }

    /// Check if this is a terminal state.
    pub fn is_end(&self) -> bool {
        self.end
    }
}

/// A declared, allowed edge of the graph.
///
/// Transition functions may only move an instance along edges declared
/// this way.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionConstraint {
    pub from: String,
    pub to: String,
}

impl TransitionConstraint {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Check whether this constraint allows the `from -> to` move.
    pub fn allows(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}
