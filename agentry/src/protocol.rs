//! Session-bound response protocol.
//!
//! Business actors emit responses, pushes, kicks and broadcasts without ever
//! holding a network connection: each helper builds a small control message
//! and sends it via ordinary actor addressing to the actor that owns the
//! originating connection (`session.agent_path`), under a well-known function
//! name. The receiving side lives in [`crate::agent::Gate`].
//!
//! All helpers are best-effort: a marshal fault or a validation failure is
//! logged and the message is dropped — the client-side call times out, and
//! nothing unwinds into the calling actor.

use crate::codes::{self, StatusCode};
use crate::error::StatusError;
use crate::messaging::{
    ActorPath, BroadcastCtl, KickCtl, Payload, PushCtl, ResponseCtl, BROADCAST_FUNC, KICK_FUNC,
    PUSH_FUNC, RESPONSE_FUNC,
};
use crate::serialization::Serializer;
use crate::session::Session;
use serde::Serialize;

/// Actor addressing boundary provided by the supervisor.
///
/// `call` is an asynchronous enqueue onto the target actor's mailbox; the
/// caller never blocks. The core only ever uses it to deliver control
/// messages to network-facing actors.
pub trait Caller {
    /// Enqueue `args` for `func_name` on the actor at `target`.
    fn call(&self, target: &ActorPath, func_name: &str, args: Payload);
}

pub(crate) fn emit_response<C: Caller + ?Sized>(
    caller: &C,
    session: &Session,
    code: StatusCode,
    data: Vec<u8>,
    message: String,
) {
    let ctl = ResponseCtl {
        sid: session.sid.clone(),
        mid: session.mid,
        code,
        data,
        message,
    };
    caller.call(&session.agent_path, RESPONSE_FUNC, Payload::value(ctl));
}

/// Respond to the in-flight client request with a marshaled value.
///
/// A marshal fault is logged and the respond is dropped; the client times
/// out.
pub fn respond<C, S, T>(caller: &C, serializer: &S, session: &Session, value: &T)
where
    C: Caller + ?Sized,
    S: Serializer,
    T: Serialize,
{
    let data = match serializer.serialize(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(sid = %session.sid, error = %e, "respond dropped: marshal failed");
            return;
        }
    };
    emit_response(caller, session, codes::OK, data, String::new());
}

/// Respond with a bare status code and no payload.
pub fn respond_code<C: Caller + ?Sized>(caller: &C, session: &Session, code: StatusCode) {
    emit_response(caller, session, code, Vec::new(), String::new());
}

/// Respond with a status code and a client-visible message.
pub fn respond_code_message<C: Caller + ?Sized>(
    caller: &C,
    session: &Session,
    code: StatusCode,
    message: impl Into<String>,
) {
    emit_response(caller, session, code, Vec::new(), message.into());
}

/// Respond with a handler error.
///
/// Only the structured [`StatusError`] shape is recognized; any other error
/// type is a contract violation, logged and dropped rather than guessed at —
/// this keeps internal error text from leaking to clients.
pub fn respond_error<C: Caller + ?Sized>(
    caller: &C,
    session: &Session,
    err: &(dyn std::error::Error + 'static),
) {
    match err.downcast_ref::<StatusError>() {
        Some(status) => {
            respond_code_message(caller, session, status.code, status.message.clone());
        }
        None => {
            tracing::error!(
                sid = %session.sid,
                error = %err,
                "respond_error dropped: error is not a StatusError"
            );
        }
    }
}

/// Push a server-initiated frame to the session's connection.
///
/// Fails fast (logged, dropped) on an empty route or a marshal fault.
pub fn push<C, S, T>(caller: &C, serializer: &S, session: &Session, route: &str, value: &T)
where
    C: Caller + ?Sized,
    S: Serializer,
    T: Serialize,
{
    if route.is_empty() {
        tracing::warn!(sid = %session.sid, "push dropped: empty route");
        return;
    }

    let data = match serializer.serialize(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(sid = %session.sid, route, error = %e, "push dropped: marshal failed");
            return;
        }
    };

    let ctl = PushCtl {
        sid: session.sid.clone(),
        route: route.to_string(),
        data,
    };
    caller.call(&session.agent_path, PUSH_FUNC, Payload::value(ctl));
}

/// Kick the session's connection, optionally closing it after delivery.
pub fn kick<C, S, T>(caller: &C, serializer: &S, session: &Session, reason: &T, close: bool)
where
    C: Caller + ?Sized,
    S: Serializer,
    T: Serialize,
{
    let reason = match serializer.serialize(reason) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(sid = %session.sid, error = %e, "kick dropped: marshal failed");
            return;
        }
    };

    let ctl = KickCtl {
        sid: session.sid.clone(),
        uid: session.uid,
        reason,
        close,
    };
    caller.call(&session.agent_path, KICK_FUNC, Payload::value(ctl));
}

/// Broadcast a value to many connections owned by one network-facing actor.
///
/// The value is marshaled once; the receiving actor fans it out to every
/// matching live connection. Fails fast (logged, dropped) when `route` is
/// empty, or when `all_uid` is false and `uid_list` is empty — an emitted
/// broadcast always has `all_uid` set or a non-empty uid list.
pub fn broadcast<C, S, T>(
    caller: &C,
    serializer: &S,
    agent_path: &ActorPath,
    uid_list: Vec<i64>,
    all_uid: bool,
    route: &str,
    value: &T,
) where
    C: Caller + ?Sized,
    S: Serializer,
    T: Serialize,
{
    if !all_uid && uid_list.is_empty() {
        tracing::warn!(%agent_path, route, "broadcast dropped: empty uid list");
        return;
    }

    if route.is_empty() {
        tracing::warn!(%agent_path, "broadcast dropped: empty route");
        return;
    }

    let data = match serializer.serialize(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(%agent_path, route, error = %e, "broadcast dropped: marshal failed");
            return;
        }
    };

    let ctl = BroadcastCtl {
        uid_list,
        all_uid,
        route: route.to_string(),
        data,
    };
    caller.call(agent_path, BROADCAST_FUNC, Payload::value(ctl));
}
