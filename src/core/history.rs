//! Per-instance transition history.
//!
//! Every successful move of an instance is recorded with the time it
//! happened. Steps that stay in place are not recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single move between two states.
///
/// # Example
///
/// ```rust
/// use stepwise::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "Start".to_string(),
///     to: "Welcome".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "Welcome");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left
    pub from: String,
    /// The state being entered
    pub to: String,
    /// When the move happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of moves.
///
/// # Example
///
/// ```rust
/// use stepwise::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     from: "Start".to_string(),
///     to: "Middle".to_string(),
///     timestamp: Utc::now(),
/// });
/// history.record(StateTransition {
///     from: "Middle".to_string(),
///     to: "End".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["Start", "Middle", "End"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a move.
    pub fn record(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first move, then the `to` state of
    /// each move. Empty when nothing has been recorded.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and the last recorded move.
    ///
    /// Returns `None` if there are no moves.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
