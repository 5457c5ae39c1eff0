//! Live-connection boundary: agents, their registry, and the gate actor
//! that receives control messages for them.

mod gate;
mod registry;

pub use gate::Gate;
pub use registry::AgentRegistry;

use crate::codes::StatusCode;

/// One live client connection, as seen by the invocation core.
///
/// Implemented by each protocol family's connection object. The core never
/// inspects the wire format: it only asks the agent to write frames keyed by
/// request id or route. All methods are best-effort writes; delivery
/// failures are the adapter's concern.
pub trait Agent: Send + Sync {
    /// Connection identifier, assigned at accept time.
    fn sid(&self) -> &str;

    /// Authenticated user identifier; 0 until login completes.
    fn uid(&self) -> i64;

    /// Whether a user id has been bound to this connection.
    fn is_bound(&self) -> bool {
        self.uid() > 0
    }

    /// Write a success response frame for the client request `mid`.
    fn response(&self, mid: u32, data: &[u8]);

    /// Write an error response frame for the client request `mid`.
    fn response_error(&self, mid: u32, code: StatusCode, message: &str);

    /// Write a server-initiated push frame on `route`.
    fn push(&self, route: &str, data: &[u8]);

    /// Write a kick frame, closing the connection afterwards if requested.
    fn kick(&self, reason: &[u8], close: bool);
}
