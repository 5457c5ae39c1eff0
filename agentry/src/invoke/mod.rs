//! Handler registration and the invocation engine.

mod decode;
mod engine;
mod registry;

pub use decode::{decode_arg, CallInfo};
pub use engine::{invoke_connection_bound, invoke_local, invoke_remote, ResponseDelivery};
pub use registry::{LocalHandlers, LocalOutcome, RemoteHandlers, RemoteOutcome};
