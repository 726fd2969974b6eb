//! Core graph records.
//!
//! This module contains the plain data a machine is made of:
//! - `State` nodes flagged start or end
//! - `TransitionConstraint` edges declaring allowed moves
//! - `StateHistory` records of the moves an instance made

mod history;
mod state;

pub use history::{StateHistory, StateTransition};
pub use state::{State, TransitionConstraint};
