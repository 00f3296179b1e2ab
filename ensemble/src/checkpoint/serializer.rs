//! Serializer for checkpoint state (state <-> bytes).
//!
//! Used by persistent Checkpointer implementations. MemorySaver keeps
//! `Checkpoint<S>` in memory and does not use a Serializer.

use crate::checkpoint::checkpointer::CheckpointError;

/// Serializes and deserializes state for checkpoint storage.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON-based serializer. Requires S: Serialize + DeserializeOwned.
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SupervisorState;

    /// **Scenario**: Serialize then deserialize yields an equivalent state.
    #[test]
    fn json_serializer_roundtrip() {
        let ser = JsonSerializer;
        let state = SupervisorState::from_user_message("hello");
        let bytes = ser.serialize(&state).unwrap();
        let restored: SupervisorState = ser.deserialize(&bytes).unwrap();
        assert_eq!(restored.messages, state.messages);
    }

    /// **Scenario**: Invalid JSON on deserialize returns CheckpointError::Serialization.
    #[test]
    fn json_serializer_invalid_json_deserialize_returns_checkpoint_error() {
        let ser = JsonSerializer;
        let invalid = b"{ not valid json ]";
        let result: Result<SupervisorState, _> = ser.deserialize(invalid);
        match result {
            Err(CheckpointError::Serialization(s)) => assert!(!s.is_empty()),
            other => panic!("expected Serialization error, got {:?}", other.map(|_| ())),
        }
    }
}
