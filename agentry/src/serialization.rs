//! Serialization contract between the invocation core and the wire.
//!
//! The core never commits to a concrete encoding: argument decoding, reply
//! marshaling and the cluster response envelope all go through the
//! [`Serializer`] trait. `JsonSerializer` is the default implementation;
//! swapping in MessagePack or Protobuf is a matter of implementing the trait.
//!
//! Marshal and unmarshal failures are treated uniformly by the callers of
//! this trait: log, drop or error-respond — never propagate as a
//! mailbox-fatal fault.

use serde::{Deserialize, Serialize};

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Marshaling a value to bytes failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// Unmarshaling bytes to a value failed.
    #[error("deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// Pluggable marshal/unmarshal contract.
///
/// Handler registries capture a clone of their serializer at registration
/// time, so a table's encoding is fixed once and shared by every adapter it
/// builds.
pub trait Serializer: Clone {
    /// Serialize a value to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::SerializationFailed`] when the value
    /// cannot be encoded.
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::DeserializationFailed`] when the bytes
    /// are malformed or do not match the target type.
    fn deserialize<T: for<'de> Deserialize<'de>>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON serializer using serde_json.
///
/// Human-readable and cross-language; the default encoding for client
/// payloads and cluster response envelopes.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    /// Create a new JSON serializer.
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| SerializationError::SerializationFailed(format!("JSON error: {}", e)))
    }

    fn deserialize<T: for<'de> Deserialize<'de>>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| SerializationError::DeserializationFailed(format!("JSON error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestMessage {
        id: u64,
        name: String,
    }

    #[test]
    fn test_json_serializer_roundtrip() {
        let serializer = JsonSerializer::new();
        let original = TestMessage {
            id: 42,
            name: "test".to_string(),
        };

        let bytes = serializer.serialize(&original).unwrap();
        let deserialized: TestMessage = serializer.deserialize(&bytes).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_json_serializer_invalid_data() {
        let serializer = JsonSerializer::new();
        let invalid_data = b"not valid json";

        let result: Result<TestMessage> = serializer.deserialize(invalid_data);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SerializationError::DeserializationFailed(_)
        ));
    }
}
