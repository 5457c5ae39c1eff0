//! Per-actor handler registries.
//!
//! Built once during actor initialization, a registry maps a function name to
//! a type-erased adapter closure wrapping a strongly-typed handler. One
//! `register_*` constructor exists per accepted handler shape, so a shape
//! mismatch is a compile-time error rather than a runtime registration
//! failure; what remains checkable only at runtime is name collision.
//!
//! Local and remote tables are disjoint: a function registered for
//! local/session dispatch is not visible to cross-process cluster dispatch
//! and vice versa.
//!
//! Each adapter performs the whole "decode args, invoke, normalize outcome"
//! sequence for its shape, capturing a clone of the table's serializer at
//! registration time — no shape inspection happens on the hot path.

use crate::codes::{self, StatusCode};
use crate::error::{InvokeError, RegistryError, StatusError};
use crate::invoke::decode::{decode_arg, CallInfo};
use crate::messaging::Payload;
use crate::serialization::Serializer;
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;

/// Normalized outcome of a local (session-bound) handler call.
#[derive(Debug)]
pub enum LocalOutcome {
    /// Notify-style shape: nothing flows back to the client.
    None,
    /// Success: marshaled result to respond with.
    Reply(Vec<u8>),
    /// Structured handler error, forwarded verbatim to the client.
    Error {
        /// Status code from the handler's error.
        code: StatusCode,
        /// Message from the handler's error.
        message: String,
    },
    /// Contract violation: a request-shaped handler produced neither a
    /// result nor an error. Logged, never delivered — the client times out,
    /// surfacing the latent handler bug without crashing the actor.
    NullReply,
}

/// Normalized (code, payload) outcome of a remote handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutcome {
    /// Status code; appears in the wire response exactly as returned.
    pub code: StatusCode,
    /// Marshaled result; empty when the handler produced none.
    pub data: Vec<u8>,
}

type LocalHandlerFn<A> =
    Box<dyn Fn(&mut A, &mut Session, Payload, &CallInfo) -> Result<LocalOutcome, InvokeError> + Send>;

type RemoteHandlerFn<A> =
    Box<dyn Fn(&mut A, Payload, &CallInfo) -> Result<RemoteOutcome, InvokeError> + Send>;

fn check_name<V>(table: &HashMap<String, V>, name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    if table.contains_key(name) {
        return Err(RegistryError::Duplicate(name.to_string()));
    }
    Ok(())
}

/// Table of handlers reachable through local/session dispatch.
///
/// Accepted shapes:
///
/// - `(session) -> ()` via [`register_session`](Self::register_session)
/// - `(session, args) -> ()` via [`register_notify`](Self::register_notify)
/// - `(session, args) -> (result, error)` via
///   [`register_request`](Self::register_request)
pub struct LocalHandlers<A, S: Serializer> {
    serializer: S,
    table: HashMap<String, LocalHandlerFn<A>>,
}

impl<A, S: Serializer + Send + 'static> LocalHandlers<A, S> {
    /// Create an empty table whose adapters use `serializer` for argument
    /// decoding and reply marshaling.
    pub fn new(serializer: S) -> Self {
        Self {
            serializer,
            table: HashMap::new(),
        }
    }

    /// Register a `(session) -> ()` handler. The payload is ignored.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_session<F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut A, &mut Session) + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering local session handler");

        let adapter: LocalHandlerFn<A> = Box::new(move |actor, session, _payload, _info| {
            handler(actor, session);
            Ok(LocalOutcome::None)
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Register a `(session, args) -> ()` handler.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_notify<Req, F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        Req: DeserializeOwned + Any + Send,
        F: Fn(&mut A, &mut Session, Req) + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering local notify handler");

        let serializer = self.serializer.clone();
        let adapter: LocalHandlerFn<A> = Box::new(move |actor, session, payload, info| {
            let req: Req = decode_arg(&serializer, payload, info)?;
            handler(actor, session, req);
            Ok(LocalOutcome::None)
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Register a `(session, args) -> (result, error)` handler.
    ///
    /// The handler returns `Ok(Some(result))` for a success response,
    /// `Err(status_error)` for an error response carrying the error's code
    /// and message, and `Ok(None)` — a contract violation — to produce no
    /// response at all.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_request<Req, Res, F>(
        &mut self,
        name: &str,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        Req: DeserializeOwned + Any + Send,
        Res: Serialize,
        F: Fn(&mut A, &mut Session, Req) -> Result<Option<Res>, StatusError> + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering local request handler");

        let serializer = self.serializer.clone();
        let adapter: LocalHandlerFn<A> = Box::new(move |actor, session, payload, info| {
            let req: Req = decode_arg(&serializer, payload, info)?;
            match handler(actor, session, req) {
                Ok(Some(result)) => {
                    let data = serializer
                        .serialize(&result)
                        .map_err(|e| InvokeError::Marshal {
                            func_name: info.func_name.clone(),
                            detail: e.to_string(),
                        })?;
                    Ok(LocalOutcome::Reply(data))
                }
                Ok(None) => Ok(LocalOutcome::NullReply),
                Err(err) => Ok(LocalOutcome::Error {
                    code: err.code,
                    message: err.message,
                }),
            }
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Look up a handler by name. Unknown names are an expected runtime
    /// condition (e.g. a client sends an unregistered route).
    pub(crate) fn get(&self, name: &str) -> Option<&LocalHandlerFn<A>> {
        self.table.get(name)
    }

    /// Whether a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The serializer this table's adapters were built with.
    pub(crate) fn serializer(&self) -> &S {
        &self.serializer
    }
}

/// Table of handlers reachable through remote/cluster dispatch.
///
/// Accepted shapes:
///
/// - `() -> ()` via [`register_notify0`](Self::register_notify0)
/// - `(args) -> ()` via [`register_notify`](Self::register_notify)
/// - `(args) -> (code)` via [`register_code`](Self::register_code)
/// - `(args) -> (result, code)` via [`register_call`](Self::register_call)
pub struct RemoteHandlers<A, S: Serializer> {
    serializer: S,
    table: HashMap<String, RemoteHandlerFn<A>>,
}

impl<A, S: Serializer + Send + 'static> RemoteHandlers<A, S> {
    /// Create an empty table whose adapters use `serializer` for argument
    /// decoding and result marshaling.
    pub fn new(serializer: S) -> Self {
        Self {
            serializer,
            table: HashMap::new(),
        }
    }

    /// Register a `() -> ()` handler. The payload is never decoded.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_notify0<F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut A) + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering remote nullary handler");

        let adapter: RemoteHandlerFn<A> = Box::new(move |actor, _payload, _info| {
            handler(actor);
            Ok(RemoteOutcome {
                code: codes::OK,
                data: Vec::new(),
            })
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Register an `(args) -> ()` handler.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_notify<Req, F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        Req: DeserializeOwned + Any + Send,
        F: Fn(&mut A, Req) + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering remote notify handler");

        let serializer = self.serializer.clone();
        let adapter: RemoteHandlerFn<A> = Box::new(move |actor, payload, info| {
            let req: Req = decode_arg(&serializer, payload, info)?;
            handler(actor, req);
            Ok(RemoteOutcome {
                code: codes::OK,
                data: Vec::new(),
            })
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Register an `(args) -> (code)` handler: a single return value
    /// interpreted as a status code, with no payload.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_code<Req, F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        Req: DeserializeOwned + Any + Send,
        F: Fn(&mut A, Req) -> StatusCode + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering remote code handler");

        let serializer = self.serializer.clone();
        let adapter: RemoteHandlerFn<A> = Box::new(move |actor, payload, info| {
            let req: Req = decode_arg(&serializer, payload, info)?;
            let code = handler(actor, req);
            Ok(RemoteOutcome {
                code,
                data: Vec::new(),
            })
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Register an `(args) -> (result, code)` handler.
    ///
    /// A `None` result yields an empty payload. A result that fails to
    /// marshal degrades the outcome to [`codes::REMOTE_EXECUTE_ERROR`] with
    /// an empty payload, logged at warn level.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or already bound in this table.
    pub fn register_call<Req, Res, F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        Req: DeserializeOwned + Any + Send,
        Res: Serialize,
        F: Fn(&mut A, Req) -> (Option<Res>, StatusCode) + Send + 'static,
    {
        check_name(&self.table, name)?;
        tracing::debug!(func_name = name, "registering remote call handler");

        let serializer = self.serializer.clone();
        let adapter: RemoteHandlerFn<A> = Box::new(move |actor, payload, info| {
            let req: Req = decode_arg(&serializer, payload, info)?;
            let (result, mut code) = handler(actor, req);
            let data = match result {
                Some(value) => match serializer.serialize(&value) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(
                            func_name = %info.func_name,
                            error = %e,
                            "failed to marshal remote call result"
                        );
                        code = codes::REMOTE_EXECUTE_ERROR;
                        Vec::new()
                    }
                },
                None => Vec::new(),
            };
            Ok(RemoteOutcome { code, data })
        });
        self.table.insert(name.to_string(), adapter);
        Ok(())
    }

    /// Look up a handler by name. Unknown names are an expected runtime
    /// condition, not an error.
    pub(crate) fn get(&self, name: &str) -> Option<&RemoteHandlerFn<A>> {
        self.table.get(name)
    }

    /// Whether a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The serializer this table's adapters were built with.
    pub(crate) fn serializer(&self) -> &S {
        &self.serializer
    }
}
