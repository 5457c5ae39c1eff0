//! The invocation engine.
//!
//! Given a handler table and an envelope, the engine resolves the handler,
//! lets its adapter decode the arguments and normalize the return values,
//! and dispatches the outcome through exactly one reply channel. Three entry
//! points cover the three calling conventions:
//!
//! - [`invoke_local`]: session call from a decoded client request; the
//!   response travels as a control message to the session's owning actor.
//! - [`invoke_connection_bound`]: same decode/invoke rules, but the response
//!   is written through the live agent-registry entry directly, skipping the
//!   second actor hop.
//! - [`invoke_remote`]: cluster RPC, in-process rendezvous, or pure
//!   fire-and-forget, selected by the envelope's reply handle.
//!
//! # Failure boundary
//!
//! The handler call is the single place a runtime fault can originate, and
//! it is wrapped in `catch_unwind`: a panicking handler is converted into a
//! failure outcome instead of taking down the actor's mailbox loop. Every
//! exit path — success, handler error, decode fault, missing handler, panic
//! — resolves a pending reply handle exactly once, so a blocked waiter or a
//! cluster responder is never leaked.

use crate::agent::AgentRegistry;
use crate::codes::{self, StatusCode};
use crate::invoke::decode::CallInfo;
use crate::invoke::registry::{LocalHandlers, LocalOutcome, RemoteHandlers};
use crate::messaging::{Envelope, ReplyHandle, RpcResponse};
use crate::protocol::{emit_response, Caller};
use crate::serialization::Serializer;
use crate::session::Session;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// How a session call's response reaches the client connection.
///
/// Both strategies share the whole decode/invoke path; they differ only in
/// the last hop.
pub enum ResponseDelivery<'a> {
    /// Send a `response` control message to the session's owning actor via
    /// ordinary actor addressing.
    AgentHop(&'a dyn Caller),
    /// Write through the live agent-registry entry for the session's sid.
    Direct(&'a AgentRegistry),
}

impl ResponseDelivery<'_> {
    fn respond(&self, session: &Session, code: StatusCode, data: Vec<u8>, message: String) {
        match self {
            ResponseDelivery::AgentHop(caller) => {
                emit_response(*caller, session, code, data, message);
            }
            ResponseDelivery::Direct(agents) => match agents.get(&session.sid) {
                Some(agent) => {
                    if codes::is_ok(code) {
                        agent.response(session.mid, &data);
                    } else {
                        agent.response_error(session.mid, code, &message);
                    }
                }
                None => {
                    tracing::debug!(
                        sid = %session.sid,
                        uid = session.uid,
                        "response dropped: connection gone"
                    );
                }
            },
        }
    }
}

/// Invoke a local session handler; the response (if any) is delivered as a
/// control message to the session's owning actor.
pub fn invoke_local<A, S>(
    actor: &mut A,
    handlers: &LocalHandlers<A, S>,
    caller: &dyn Caller,
    envelope: Envelope,
) where
    S: Serializer + Send + 'static,
{
    invoke_session(actor, handlers, envelope, ResponseDelivery::AgentHop(caller));
}

/// Invoke a local session handler; the response (if any) is written through
/// the live agent-registry entry for the session's connection.
pub fn invoke_connection_bound<A, S>(
    actor: &mut A,
    handlers: &LocalHandlers<A, S>,
    agents: &AgentRegistry,
    envelope: Envelope,
) where
    S: Serializer + Send + 'static,
{
    invoke_session(actor, handlers, envelope, ResponseDelivery::Direct(agents));
}

fn invoke_session<A, S>(
    actor: &mut A,
    handlers: &LocalHandlers<A, S>,
    envelope: Envelope,
    delivery: ResponseDelivery<'_>,
) where
    S: Serializer + Send + 'static,
{
    let info = CallInfo::from_envelope(&envelope);
    let Envelope {
        args,
        session,
        reply,
        ..
    } = envelope;

    // Session calls reply through the response protocol, not through the
    // envelope. Resolve any handle that slipped in so no waiter leaks.
    if !matches!(reply, ReplyHandle::None) {
        tracing::debug!(
            func_name = %info.func_name,
            "session call carried a reply handle; resolving it with no outcome"
        );
        discard_reply(reply, handlers.serializer(), codes::UNKNOWN_ERROR);
    }

    let Some(mut session) = session else {
        tracing::error!(
            target_path = %info.target,
            func_name = %info.func_name,
            "session call without a session"
        );
        return;
    };

    let Some(handler) = handlers.get(&info.func_name) else {
        tracing::debug!(
            target_path = %info.target,
            func_name = %info.func_name,
            "unregistered local function"
        );
        return;
    };

    let result = catch_unwind(AssertUnwindSafe(|| {
        handler(actor, &mut session, args, &info)
    }));

    match result {
        Ok(Ok(LocalOutcome::None)) => {}
        Ok(Ok(LocalOutcome::Reply(data))) => {
            delivery.respond(&session, codes::OK, data, String::new());
        }
        Ok(Ok(LocalOutcome::Error { code, message })) => {
            tracing::warn!(
                target_path = %info.target,
                func_name = %info.func_name,
                code,
                message = %message,
                "handler returned an error response"
            );
            delivery.respond(&session, code, Vec::new(), message);
        }
        Ok(Ok(LocalOutcome::NullReply)) => {
            // Latent handler bug: neither result nor error. The client gets
            // nothing and times out; the actor keeps running.
            tracing::warn!(
                target_path = %info.target,
                func_name = %info.func_name,
                "reply must not be null"
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "local invocation aborted");
        }
        Err(panic) => {
            tracing::error!(
                target_path = %info.target,
                func_name = %info.func_name,
                panic = panic_message(panic.as_ref()),
                "local handler fault"
            );
        }
    }
}

/// Invoke a remote handler and dispatch the (code, payload) outcome.
///
/// If the envelope carries a cluster responder, the outcome is serialized
/// into a wire response envelope and handed to it; if it carries an
/// in-process rendezvous, the outcome is pushed into the channel; with
/// neither, the outcome is discarded after logging. A runtime fault during
/// the call yields the fixed [`codes::REMOTE_EXECUTE_ERROR`] — never the
/// handler's own code — and still resolves the reply handle.
pub fn invoke_remote<A, S>(actor: &mut A, handlers: &RemoteHandlers<A, S>, envelope: Envelope)
where
    S: Serializer + Send + 'static,
{
    let info = CallInfo::from_envelope(&envelope);
    let Envelope { args, reply, .. } = envelope;
    let serializer = handlers.serializer();

    let Some(handler) = handlers.get(&info.func_name) else {
        tracing::debug!(
            target_path = %info.target,
            func_name = %info.func_name,
            "unregistered remote function"
        );
        discard_reply(reply, serializer, codes::FUNCTION_NOT_FOUND);
        return;
    };

    let result = catch_unwind(AssertUnwindSafe(|| handler(actor, args, &info)));

    match result {
        Ok(Ok(outcome)) => match reply {
            ReplyHandle::None => {
                tracing::trace!(
                    func_name = %info.func_name,
                    code = outcome.code,
                    "fire-and-forget outcome discarded"
                );
            }
            ReplyHandle::Chan(chan) => {
                chan.resolve(Some(RpcResponse {
                    code: outcome.code,
                    data: outcome.data,
                }));
            }
            ReplyHandle::Cluster(responder) => {
                let rsp = RpcResponse {
                    code: outcome.code,
                    data: outcome.data,
                };
                responder.respond(encode_rpc_response(serializer, &rsp));
            }
        },
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "remote invocation aborted");
            discard_reply(reply, serializer, codes::REMOTE_EXECUTE_ERROR);
        }
        Err(panic) => {
            tracing::error!(
                source_path = %info.source,
                target_path = %info.target,
                func_name = %info.func_name,
                panic = panic_message(panic.as_ref()),
                "remote handler fault"
            );
            discard_reply(reply, serializer, codes::REMOTE_EXECUTE_ERROR);
        }
    }
}

/// Resolve a reply handle without a handler outcome.
///
/// A rendezvous channel gets an absent outcome; a cluster responder gets a
/// code-only response, since the RPC peer is waiting on the wire either way.
fn discard_reply<S: Serializer>(reply: ReplyHandle, serializer: &S, code: StatusCode) {
    match reply {
        ReplyHandle::None => {}
        ReplyHandle::Chan(chan) => chan.resolve(None),
        ReplyHandle::Cluster(responder) => {
            responder.respond(encode_rpc_response(serializer, &RpcResponse::code_only(code)));
        }
    }
}

fn encode_rpc_response<S: Serializer>(serializer: &S, rsp: &RpcResponse) -> Vec<u8> {
    match serializer.serialize(rsp) {
        Ok(bytes) => bytes,
        Err(e) => {
            // The one-shot must still be written; an empty body at least
            // unblocks the peer's framing layer.
            tracing::warn!(error = %e, "failed to marshal rpc response envelope");
            Vec::new()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic payload"
    }
}
