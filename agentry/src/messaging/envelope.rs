//! The envelope: the unit of inter-actor communication.
//!
//! An envelope carries everything needed to locate, decode, invoke and reply:
//! source and target actor paths, the registered function name, an opaque
//! payload, an optional session for client-visible calls, and a reply handle.
//!
//! # Reply handles
//!
//! How (and whether) a result flows back is encoded structurally in
//! [`ReplyHandle`]: exactly one of "nothing", "in-process rendezvous channel"
//! or "cluster RPC responder" — the invalid combinations of the original
//! design cannot be constructed. Both live variants are consume-once: a
//! [`ChanReply`] is destroyed by `resolve`, a [`ClusterResponder`] by
//! `respond`, so writing twice is a type error and the invocation engine is
//! forced to resolve them on every exit path.

use crate::codes::StatusCode;
use crate::config::CallConfig;
use crate::error::InvokeError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use tokio::sync::oneshot;

/// Hierarchical actor address, e.g. `"node.service.id"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorPath(String);

impl ActorPath {
    /// Create a path from its string form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ActorPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Opaque handler arguments.
///
/// Cross-boundary messages arrive as raw encoded bytes and are decoded by
/// the handler's adapter; in-process callers may hand over an
/// already-decoded value instead, which the adapter downcasts.
pub enum Payload {
    /// No arguments.
    Empty,
    /// Raw serialized bytes; must be decoded before invocation.
    Bytes(Vec<u8>),
    /// An already-decoded value from an in-process caller.
    Value(Box<dyn Any + Send>),
}

impl Payload {
    /// Wrap an in-process value without serializing it.
    pub fn value<T: Any + Send>(value: T) -> Self {
        Payload::Value(Box::new(value))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Empty => f.write_str("Payload::Empty"),
            Payload::Bytes(b) => write!(f, "Payload::Bytes({} bytes)", b.len()),
            Payload::Value(_) => f.write_str("Payload::Value(..)"),
        }
    }
}

/// Wire-level (code, payload) pair produced by remote invocation.
///
/// Serialized into the cluster transport's response envelope, or handed as-is
/// to a blocking in-process caller. An empty `data` means the handler
/// produced no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Status code, transmitted unmodified.
    pub code: StatusCode,
    /// Marshaled result payload; empty when there is none.
    pub data: Vec<u8>,
}

impl RpcResponse {
    /// A code-only response with no payload.
    pub fn code_only(code: StatusCode) -> Self {
        Self { code, data: Vec::new() }
    }
}

/// Receiver half of an in-process reply rendezvous.
///
/// `None` means the invocation resolved without an outcome (fault or decode
/// failure); the caller treats it as an absent reply.
pub type ReplyReceiver = oneshot::Receiver<Option<RpcResponse>>;

/// Single-use rendezvous for an in-process, non-cluster call that expects a
/// synchronous result.
///
/// `resolve` consumes the handle, so it can be written at most once; the
/// invocation engine takes ownership and resolves it on every code path,
/// including the failure-boundary path, so a blocked waiter is never leaked.
pub struct ChanReply {
    sender: oneshot::Sender<Option<RpcResponse>>,
}

impl ChanReply {
    /// Create a rendezvous pair: the handle to embed in an envelope and the
    /// receiver the caller awaits.
    pub fn pair() -> (Self, ReplyReceiver) {
        let (tx, rx) = oneshot::channel();
        (Self { sender: tx }, rx)
    }

    /// Resolve the rendezvous, consuming the handle.
    ///
    /// A dropped receiver is tolerated (the caller may have timed out) and
    /// logged at debug level.
    pub fn resolve(self, response: Option<RpcResponse>) {
        if self.sender.send(response).is_err() {
            tracing::debug!("chan reply dropped: receiver no longer waiting");
        }
    }
}

impl fmt::Debug for ChanReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChanReply")
    }
}

/// One-shot responder bound to an originating network RPC call.
///
/// Implemented by the cluster transport. Consuming `self` on `respond` makes
/// double-writes unrepresentable.
pub trait ClusterResponder: Send {
    /// Transmit the serialized response envelope back over the RPC channel.
    fn respond(self: Box<Self>, bytes: Vec<u8>);
}

/// How (and whether) an invocation outcome is returned.
pub enum ReplyHandle {
    /// Fire-and-forget: the outcome is discarded after logging.
    None,
    /// In-process rendezvous for a blocking caller.
    Chan(ChanReply),
    /// Cluster transport responder for a cross-process RPC.
    Cluster(Box<dyn ClusterResponder>),
}

impl fmt::Debug for ReplyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyHandle::None => f.write_str("ReplyHandle::None"),
            ReplyHandle::Chan(_) => f.write_str("ReplyHandle::Chan"),
            ReplyHandle::Cluster(_) => f.write_str("ReplyHandle::Cluster"),
        }
    }
}

/// The message passed between actors.
#[derive(Debug)]
pub struct Envelope {
    /// Originating actor path.
    pub source: ActorPath,
    /// Destination actor path.
    pub target: ActorPath,
    /// Name under which the handler was registered.
    pub func_name: String,
    /// Opaque handler arguments.
    pub args: Payload,
    /// Present for any call that must eventually produce a client-visible
    /// response.
    pub session: Option<Session>,
    /// True when the call crosses a process/node boundary.
    pub is_cluster: bool,
    /// How the outcome is returned, if at all.
    pub reply: ReplyHandle,
}

impl Envelope {
    /// Create a fire-and-forget envelope.
    pub fn new(
        source: impl Into<ActorPath>,
        target: impl Into<ActorPath>,
        func_name: impl Into<String>,
        args: Payload,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            func_name: func_name.into(),
            args,
            session: None,
            is_cluster: false,
            reply: ReplyHandle::None,
        }
    }

    /// Attach the session of the originating client connection.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach an in-process rendezvous for a blocking caller.
    pub fn with_chan_reply(mut self, chan: ChanReply) -> Self {
        self.reply = ReplyHandle::Chan(chan);
        self
    }

    /// Mark the envelope as a cluster call and attach the transport's
    /// one-shot responder.
    pub fn with_cluster_reply(mut self, responder: Box<dyn ClusterResponder>) -> Self {
        self.is_cluster = true;
        self.reply = ReplyHandle::Cluster(responder);
        self
    }

    /// Mark the envelope as crossing a process boundary without expecting a
    /// reply (cluster notify).
    pub fn cluster(mut self) -> Self {
        self.is_cluster = true;
        self
    }
}

/// Await an in-process reply within the configured timeout.
///
/// Returns `Ok(None)` when the invocation resolved without an outcome.
///
/// # Errors
///
/// Returns [`InvokeError::Timeout`] when no resolution arrives in time, which
/// can only happen if the envelope never reached an invocation engine — the
/// engine itself resolves the handle on every path.
pub async fn await_reply(
    rx: ReplyReceiver,
    config: &CallConfig,
) -> Result<Option<RpcResponse>, InvokeError> {
    match tokio::time::timeout(config.reply_timeout, rx).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(_)) => Ok(None),
        Err(_) => Err(InvokeError::Timeout),
    }
}
