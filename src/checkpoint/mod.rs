//! Checkpoint and restore for instances.
//!
//! The engine has no storage of its own. A checkpoint captures everything
//! needed to bring an instance back (its id, current state, context and
//! history) in a serializable form; where it is kept is up to the caller.
//! Callbacks are not part of a checkpoint: they live in the machine, and
//! an instance is restored against a machine with [`StateMachine::restore`].

use crate::core::StateHistory;
use crate::machine::{Context, Instance, StateMachine};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of an instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<Id> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the machine the instance belongs to
    pub machine: String,

    pub instance_id: Id,

    /// Name of the current state
    pub state: String,

    pub context: Context,

    pub history: StateHistory,
}

/// Binary layout. The context holds open-ended JSON values, which bincode
/// cannot decode on its own, so it travels as JSON text.
#[derive(Serialize, Deserialize)]
struct BinaryCheckpoint<Id> {
    version: u32,
    id: Uuid,
    timestamp: DateTime<Utc>,
    machine: String,
    instance_id: Id,
    state: String,
    context: String,
    history: StateHistory,
}

impl<Id> Checkpoint<Id> {
    pub fn to_json(&self) -> Result<String, CheckpointError>
    where
        Id: Serialize,
    {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError>
    where
        Id: DeserializeOwned,
    {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError>
    where
        Id: Serialize + Clone,
    {
        let context = serde_json::to_string(&self.context)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))?;
        let binary = BinaryCheckpoint {
            version: self.version,
            id: self.id,
            timestamp: self.timestamp,
            machine: self.machine.clone(),
            instance_id: self.instance_id.clone(),
            state: self.state.clone(),
            context,
            history: self.history.clone(),
        };
        bincode::serialize(&binary).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError>
    where
        Id: DeserializeOwned,
    {
        let binary: BinaryCheckpoint<Id> = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        let context = serde_json::from_str(&binary.context)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        Ok(Self {
            version: binary.version,
            id: binary.id,
            timestamp: binary.timestamp,
            machine: binary.machine,
            instance_id: binary.instance_id,
            state: binary.state,
            context,
            history: binary.history,
        })
    }
}

impl<Id: Clone> Instance<Id> {
    /// Capture the instance for later restore.
    pub fn checkpoint(&self) -> Checkpoint<Id> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            machine: self.machine().name().to_string(),
            instance_id: self.id().clone(),
            state: self.current_state().to_string(),
            context: self.context().clone(),
            history: self.history().clone(),
        }
    }
}

impl<Id> StateMachine<Id> {
    /// Rebuild an instance from a checkpoint taken on this machine.
    pub fn restore(&self, checkpoint: Checkpoint<Id>) -> Result<Instance<Id>, CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if checkpoint.machine != self.name() {
            return Err(CheckpointError::MachineMismatch {
                expected: self.name().to_string(),
                found: checkpoint.machine,
            });
        }
        let current =
            self.index_of(&checkpoint.state)
                .ok_or_else(|| CheckpointError::UnknownState {
                    machine: self.name().to_string(),
                    state: checkpoint.state.clone(),
                })?;

        Ok(Instance::from_parts(
            self.clone(),
            checkpoint.instance_id,
            current,
            checkpoint.context,
            checkpoint.history,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{Callbacks, Next};
    use crate::core::{State, TransitionConstraint};
    use crate::definition::MachineDefinition;
    use crate::machine::initialize;
    use serde_json::json;

    fn machine(name: &str) -> StateMachine<u64> {
        let mut definition = MachineDefinition::new(
            name,
            vec![State::start("Draft"), State::new("Review"), State::end("Published")],
            vec![
                TransitionConstraint::new("Draft", "Review"),
                TransitionConstraint::new("Review", "Published"),
            ],
        );
        let callbacks = Callbacks::new()
            .transition("Draft", |_, _| Ok(Next::to("Review")))
            .transition("Review", |_, _| Ok(Next::to("Published")));
        initialize(&mut definition, callbacks).unwrap()
    }

    fn reviewed_instance(machine: &StateMachine<u64>) -> Instance<u64> {
        let mut instance = machine.new_instance(42);
        instance.set_data("title", "Checkpoints");
        instance.set_data("tags", json!(["fsm", "persistence"]));
        instance.execute().unwrap();
        instance
    }

    #[test]
    fn checkpoint_captures_instance() {
        let machine = machine("Docs");
        let instance = reviewed_instance(&machine);

        let checkpoint = instance.checkpoint();

        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.machine, "Docs");
        assert_eq!(checkpoint.instance_id, 42);
        assert_eq!(checkpoint.state, "Review");
        assert_eq!(checkpoint.context.get("title"), Some(&json!("Checkpoints")));
        assert_eq!(checkpoint.history.len(), 1);
    }

    #[test]
    fn checkpoint_ids_are_unique() {
        let machine = machine("Docs");
        let instance = machine.new_instance(1);

        assert_ne!(instance.checkpoint().id, instance.checkpoint().id);
    }

    #[test]
    fn restore_from_json_resumes_execution() {
        let machine = machine("Docs");
        let json = reviewed_instance(&machine).checkpoint().to_json().unwrap();

        let checkpoint = Checkpoint::<u64>::from_json(&json).unwrap();
        let mut restored = machine.restore(checkpoint).unwrap();

        assert_eq!(*restored.id(), 42);
        assert_eq!(restored.current_state(), "Review");
        assert_eq!(restored.get_data("tags"), Some(&json!(["fsm", "persistence"])));

        restored.execute().unwrap();
        assert!(restored.is_end());
        assert_eq!(
            restored.history().get_path(),
            vec!["Draft", "Review", "Published"]
        );
    }

    #[test]
    fn binary_encoding_preserves_checkpoint() {
        let machine = machine("Docs");
        let checkpoint = reviewed_instance(&machine).checkpoint();

        let bytes = checkpoint.to_bytes().unwrap();
        let decoded = Checkpoint::<u64>::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, checkpoint);
    }

    #[test]
    fn corrupted_bytes_fail_to_decode() {
        let result = Checkpoint::<u64>::from_bytes(&[1, 2, 3]);
        assert!(matches!(result, Err(CheckpointError::DeserializationFailed(_))));
    }

    #[test]
    fn restore_rejects_unsupported_version() {
        let machine = machine("Docs");
        let mut checkpoint = machine.new_instance(1).checkpoint();
        checkpoint.version = CHECKPOINT_VERSION + 1;

        assert!(matches!(
            machine.restore(checkpoint),
            Err(CheckpointError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn restore_rejects_other_machine() {
        let docs = machine("Docs");
        let other = machine("Other");
        let checkpoint = docs.new_instance(1).checkpoint();

        assert!(matches!(
            other.restore(checkpoint),
            Err(CheckpointError::MachineMismatch { .. })
        ));
    }

    #[test]
    fn restore_rejects_unknown_state() {
        let machine = machine("Docs");
        let mut checkpoint = machine.new_instance(1).checkpoint();
        checkpoint.state = "Archived".to_string();

        assert!(matches!(
            machine.restore(checkpoint),
            Err(CheckpointError::UnknownState { state, .. }) if state == "Archived"
        ));
    }
}
