//! Error types for the agentry invocation core.

use crate::codes::StatusCode;
use thiserror::Error;

/// Errors raised at handler registration time.
///
/// Registration errors are fatal to startup: they are surfaced immediately
/// to the caller and never recovered at dispatch time. Shape mismatches are
/// not represented here — the typed `register_*` constructors make an
/// invalid handler signature a compile-time error.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The function name is already bound in the same table.
    #[error("duplicate handler registration: {0}")]
    Duplicate(String),

    /// The function name is empty.
    #[error("handler name must not be empty")]
    EmptyName,
}

/// Errors raised while invoking a handler.
///
/// None of these unwind past an actor boundary: the invocation engine
/// converts each into a log line plus, where a caller is waiting, a
/// best-effort negative outcome.
// `Display`/`Error` are implemented by hand rather than via `thiserror`:
// `ArgumentDecode` carries a field named `source` (an actor path, not an
// error cause), which the derive would mandatorily treat as the error
// source and fail to compile against a `String`.
#[derive(Debug)]
pub enum InvokeError {
    /// The envelope payload could not be decoded into the type the handler
    /// declares. Annotated with full envelope context; the invocation is
    /// aborted without calling the handler.
    ArgumentDecode {
        /// Originating actor path.
        source: String,
        /// Destination actor path.
        target: String,
        /// Registered function name.
        func_name: String,
        /// Underlying decode failure.
        detail: String,
    },

    /// A handler result could not be marshaled for the reply.
    Marshal {
        /// Registered function name.
        func_name: String,
        /// Underlying marshal failure.
        detail: String,
    },

    /// A reply rendezvous timed out before the engine resolved it.
    Timeout,
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArgumentDecode {
                source,
                target,
                func_name,
                detail,
            } => write!(
                f,
                "argument decode failed: {detail} [source = {source}, target = {target} -> {func_name}]"
            ),
            Self::Marshal { func_name, detail } => {
                write!(f, "marshal failed for '{func_name}': {detail}")
            }
            Self::Timeout => write!(f, "reply timed out"),
        }
    }
}

impl std::error::Error for InvokeError {}

/// Structured handler error: a status code plus a client-visible message.
///
/// This is the only error shape the response path recognizes. A handler that
/// returns a `StatusError` has its code and message forwarded verbatim to the
/// client; any other error type reaching `respond_error` is a contract
/// violation and is logged and dropped instead of guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code {code}: {message}")]
pub struct StatusError {
    /// Status code transmitted to the client.
    pub code: StatusCode,
    /// Human-readable message transmitted to the client.
    pub message: String,
}

impl StatusError {
    /// Create a new structured handler error.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = StatusError::new(400, "bad request");
        assert_eq!(err.to_string(), "code 400: bad request");
    }

    #[test]
    fn test_argument_decode_context() {
        let err = InvokeError::ArgumentDecode {
            source: "gate.agent.1".to_string(),
            target: "game.player.1".to_string(),
            func_name: "login".to_string(),
            detail: "unexpected end of input".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("gate.agent.1"));
        assert!(text.contains("game.player.1"));
        assert!(text.contains("login"));
    }
}
