//! Status codes shared end-to-end between handlers, protocol adapters and
//! clients.
//!
//! This is a closed set: business handlers return these codes, the invocation
//! engine normalizes outcomes into them, and protocol adapters transmit them
//! to the client unmodified. Application-specific codes should be allocated
//! well above this range.

/// Wire-level status code type.
pub type StatusCode = i32;

/// Generic success.
pub const OK: StatusCode = 0;

/// Unclassified failure.
pub const UNKNOWN_ERROR: StatusCode = 1;

/// The target function name is not registered on the target actor.
pub const FUNCTION_NOT_FOUND: StatusCode = 2;

/// A runtime fault occurred while executing a remote/cluster handler.
///
/// This is the fixed code produced by the invocation engine's failure
/// boundary; a faulting handler never gets to choose its own code.
pub const REMOTE_EXECUTE_ERROR: StatusCode = 3;

/// Returns true when `code` denotes success.
pub fn is_ok(code: StatusCode) -> bool {
    code == OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ok() {
        assert!(is_ok(OK));
        assert!(!is_ok(UNKNOWN_ERROR));
        assert!(!is_ok(REMOTE_EXECUTE_ERROR));
    }
}
