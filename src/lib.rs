//! Stepwise: a declarative finite state machine engine
//!
//! A machine is declared as data (named states, one flagged start and one
//! flagged end, plus the allowed transitions between them) and brought to
//! life by attaching callbacks. Instances of the machine are then driven by
//! the caller, one step at a time. Only declared transitions can happen.
//!
//! # Core Concepts
//!
//! - **Definition**: the declarative graph, usually loaded from JSON
//! - **Callbacks**: a transition function per state, optional enter hooks,
//!   and a machine-wide step hook
//! - **State Machine**: an immutable handle produced by [`initialize`]
//! - **Instance**: one walk through the machine with its own context
//!
//! # Example
//!
//! ```rust
//! use stepwise::{Callbacks, MachineDefinition, Next};
//!
//! let mut definition = MachineDefinition::from_json(r#"{
//!     "name": "Onboarding",
//!     "states": [
//!         {"start": true, "name": "Start"},
//!         {"name": "Welcome"},
//!         {"end": true, "name": "End"}
//!     ],
//!     "transitions": [
//!         {"from": "Start", "to": "Welcome"},
//!         {"from": "Welcome", "to": "End"}
//!     ]
//! }"#).unwrap();
//!
//! let callbacks = Callbacks::new()
//!     .transition("Start", |_, _| Ok(Next::to("Welcome")))
//!     .transition("Welcome", |_, instance| {
//!         if instance.get_data("accepted").is_some() {
//!             Ok(Next::to("End"))
//!         } else {
//!             Ok(Next::Stay)
//!         }
//!     });
//!
//! let machine = definition.initialize(callbacks).unwrap();
//! let mut instance = machine.new_instance("user-1".to_string());
//!
//! instance.execute().unwrap();
//! instance.execute().unwrap();
//! assert_eq!(instance.current_state(), "Welcome");
//!
//! instance.set_data("accepted", true);
//! instance.execute().unwrap();
//! assert!(instance.is_end());
//! ```

pub mod builder;
pub mod callbacks;
pub mod checkpoint;
pub mod core;
pub mod definition;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, DefinitionBuilder};
pub use callbacks::{BoxError, Callbacks, Next, OnEnter, OnExecuted, Transition};
pub use checkpoint::{Checkpoint, CheckpointError, CHECKPOINT_VERSION};
pub use self::core::{State, StateHistory, StateTransition, TransitionConstraint};
pub use definition::{DefinitionError, MachineDefinition};
pub use machine::{initialize, Context, Instance, InstanceError, StateMachine, StepResult};
