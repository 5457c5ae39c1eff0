//! # Agentry
//!
//! Message invocation and session-bound response core for actor-based game
//! servers.
//!
//! Business logic runs inside isolated actors reachable by hierarchical
//! path; client connections are terminated by dedicated gate actors that
//! bridge a wire protocol to the internal actor message bus. This crate is
//! the piece in the middle: it turns a generic envelope into a concrete
//! handler call using only runtime-registered signatures, and routes
//! responses, pushes, kicks and broadcasts back to the correct network
//! connection without the business actor ever touching a socket.
//!
//! ## Architecture
//!
//! ```text
//! client packet                                    control message
//!      │                                                 ▲
//!      ▼                                                 │
//! ┌──────────┐  Envelope   ┌─────────────────┐  respond/push/kick/broadcast
//! │   Gate   │────────────▶│ Invocation      │──────────────┘
//! │ (owns    │             │ Engine          │
//! │  agents) │◀────────────│  decode args    │
//! └────┬─────┘  "response" │  invoke handler │
//!      │        "push" ... │  normalize      │
//!      ▼                   │  (code,payload) │
//! ┌──────────┐             └─────────────────┘
//! │  Agent   │                      │
//! │ Registry │             ┌────────┴────────┐
//! └──────────┘             │ Handler tables  │
//!                          │ (local│remote)  │
//!                          └─────────────────┘
//! ```
//!
//! ## Calling conventions
//!
//! | Entry point | Handler shapes | Reply channel |
//! |-------------|----------------|---------------|
//! | [`invoke::invoke_local`] | `(session)`, `(session, args)`, `(session, args) -> (result, error)` | `response` control message |
//! | [`invoke::invoke_connection_bound`] | same | direct agent-registry write |
//! | [`invoke::invoke_remote`] | `()`, `(args)`, `(args) -> code`, `(args) -> (result, code)` | cluster responder, rendezvous channel, or none |
//!
//! ## Quick start
//!
//! ```ignore
//! use agentry::invoke::{LocalHandlers, invoke_local};
//! use agentry::serialization::JsonSerializer;
//!
//! let mut handlers = LocalHandlers::<PlayerActor, _>::new(JsonSerializer::new());
//! handlers.register_request("getPlayer", |actor, session, req: GetPlayerReq| {
//!     Ok(Some(actor.player_info(session.uid)))
//! })?;
//!
//! // For each envelope the supervisor dequeues:
//! invoke_local(&mut actor, &handlers, &caller, envelope);
//! ```
//!
//! The actor supervisor (mailbox scheduling, path resolution), the wire
//! framing and the concrete serializer are external collaborators, reached
//! through the [`protocol::Caller`], [`agent::Agent`],
//! [`messaging::ClusterResponder`] and [`serialization::Serializer`] traits.

#![deny(missing_docs)]

pub mod agent;
pub mod codes;
pub mod config;
pub mod error;
pub mod invoke;
pub mod messaging;
pub mod protocol;
pub mod serialization;
pub mod session;

pub use agent::{Agent, AgentRegistry, Gate};
pub use config::CallConfig;
pub use error::{InvokeError, RegistryError, StatusError};
pub use messaging::{ActorPath, ChanReply, Envelope, Payload, ReplyHandle, RpcResponse};
pub use session::Session;
