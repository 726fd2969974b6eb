//! Runnable state machines and their instances.
//!
//! [`initialize`] turns a [`MachineDefinition`](crate::definition::MachineDefinition)
//! and its [`Callbacks`](crate::callbacks::Callbacks) into a [`StateMachine`]
//! handle. The handle is immutable and cheap to clone; it stamps out
//! [`Instance`]s, each of which the caller advances with
//! [`Instance::execute`], one step per call.

mod error;
mod instance;
mod state_machine;

pub use error::InstanceError;
pub use instance::{Context, Instance, StepResult};
pub use state_machine::{initialize, StateMachine};
