//! Control messages routed back to network-facing actors.
//!
//! Business actors never hold a connection reference; they emit one of these
//! four control messages to the actor identified by `session.agent_path`,
//! addressed by well-known function name. Every protocol adapter that wants
//! to receive business-actor replies registers the four names verbatim on its
//! remote handler table — they are part of the wire contract between adapter
//! implementations and this core.

use crate::codes::StatusCode;
use serde::{Deserialize, Serialize};

/// Function name every network-facing actor registers for responses.
pub const RESPONSE_FUNC: &str = "response";

/// Function name every network-facing actor registers for pushes.
pub const PUSH_FUNC: &str = "push";

/// Function name every network-facing actor registers for kicks.
pub const KICK_FUNC: &str = "kick";

/// Function name every network-facing actor registers for broadcasts.
pub const BROADCAST_FUNC: &str = "broadcast";

/// Deliver a request response to one connection, keyed by `mid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCtl {
    /// Target connection id.
    pub sid: String,
    /// Client request sequence number the response answers.
    pub mid: u32,
    /// Status code; non-OK turns the response into an error frame.
    pub code: StatusCode,
    /// Marshaled success payload; empty for error responses.
    pub data: Vec<u8>,
    /// Error message; empty for success responses.
    pub message: String,
}

/// Push a server-initiated frame to one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushCtl {
    /// Target connection id.
    pub sid: String,
    /// Client route the frame is delivered on.
    pub route: String,
    /// Marshaled payload.
    pub data: Vec<u8>,
}

/// Kick a connection, optionally closing it after delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickCtl {
    /// Target connection id; fallback when uid lookup misses.
    pub sid: String,
    /// Target user id; preferred lookup key, covers the case where a stale
    /// sid has been replaced by a reconnect.
    pub uid: i64,
    /// Marshaled kick reason.
    pub reason: Vec<u8>,
    /// Whether the connection must be forcibly terminated after delivery.
    pub close: bool,
}

/// Fan a push out to many connections on one network-facing actor.
///
/// Invariant: `all_uid` is true or `uid_list` is non-empty — the protocol
/// helpers reject anything else before a message is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastCtl {
    /// Explicit target user ids; ignored when `all_uid` is set.
    pub uid_list: Vec<i64>,
    /// Push to every live, authenticated connection.
    pub all_uid: bool,
    /// Client route the frame is delivered on.
    pub route: String,
    /// Marshaled payload, marshaled once for all targets.
    pub data: Vec<u8>,
}
