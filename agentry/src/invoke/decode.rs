//! Argument decoding shared by every calling convention.

use crate::error::InvokeError;
use crate::messaging::{ActorPath, Envelope, Payload};
use crate::serialization::Serializer;
use serde::de::DeserializeOwned;
use std::any::Any;

/// Envelope context threaded into adapters for error annotation.
///
/// Decode failures must name the source path, target path and function name;
/// the adapter closures only ever see the payload, so the engine hands them
/// this snapshot of the envelope's addressing fields.
#[derive(Debug, Clone)]
pub struct CallInfo {
    /// Originating actor path.
    pub source: ActorPath,
    /// Destination actor path.
    pub target: ActorPath,
    /// Registered function name.
    pub func_name: String,
}

impl CallInfo {
    /// Snapshot the addressing fields of an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            source: envelope.source.clone(),
            target: envelope.target.clone(),
            func_name: envelope.func_name.clone(),
        }
    }

    fn decode_error(&self, detail: impl Into<String>) -> InvokeError {
        InvokeError::ArgumentDecode {
            source: self.source.to_string(),
            target: self.target.to_string(),
            func_name: self.func_name.clone(),
            detail: detail.into(),
        }
    }
}

/// Decode an opaque payload into the concrete type a handler declares.
///
/// Raw bytes go through the configured serializer; an already-decoded value
/// from an in-process caller is downcast instead. Either failure mode aborts
/// the invocation before the handler runs.
///
/// # Errors
///
/// Returns [`InvokeError::ArgumentDecode`], annotated with the envelope's
/// source, target and function name, on malformed bytes or a type mismatch.
pub fn decode_arg<S, T>(serializer: &S, payload: Payload, info: &CallInfo) -> Result<T, InvokeError>
where
    S: Serializer,
    T: DeserializeOwned + Any + Send,
{
    match payload {
        Payload::Bytes(bytes) => serializer
            .deserialize(&bytes)
            .map_err(|e| info.decode_error(e.to_string())),
        Payload::Value(value) => value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            info.decode_error(format!(
                "value type mismatch: expected {}",
                std::any::type_name::<T>()
            ))
        }),
        Payload::Empty => Err(info.decode_error("missing argument payload")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::JsonSerializer;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct LoginReq {
        token: String,
    }

    fn info() -> CallInfo {
        CallInfo {
            source: ActorPath::new("gate.agent.1"),
            target: ActorPath::new("game.player.1"),
            func_name: "login".to_string(),
        }
    }

    #[test]
    fn test_decode_bytes() {
        let serializer = JsonSerializer::new();
        let bytes = serializer
            .serialize(&LoginReq {
                token: "abc".to_string(),
            })
            .unwrap();

        let req: LoginReq = decode_arg(&serializer, Payload::Bytes(bytes), &info()).unwrap();
        assert_eq!(req.token, "abc");
    }

    #[test]
    fn test_decode_in_process_value() {
        let serializer = JsonSerializer::new();
        let payload = Payload::value(LoginReq {
            token: "abc".to_string(),
        });

        let req: LoginReq = decode_arg(&serializer, payload, &info()).unwrap();
        assert_eq!(req.token, "abc");
    }

    #[test]
    fn test_decode_malformed_bytes_names_the_route() {
        let serializer = JsonSerializer::new();
        let payload = Payload::Bytes(b"not json".to_vec());

        let err = decode_arg::<_, LoginReq>(&serializer, payload, &info()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("gate.agent.1"));
        assert!(text.contains("game.player.1"));
        assert!(text.contains("login"));
    }

    #[test]
    fn test_decode_value_type_mismatch() {
        let serializer = JsonSerializer::new();
        let payload = Payload::value(42u32);

        let err = decode_arg::<_, LoginReq>(&serializer, payload, &info()).unwrap_err();
        assert!(matches!(err, InvokeError::ArgumentDecode { .. }));
    }
}
