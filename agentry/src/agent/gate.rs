//! The gate: the network-facing actor kind that owns connections.

use crate::agent::AgentRegistry;
use crate::codes;
use crate::error::RegistryError;
use crate::invoke::RemoteHandlers;
use crate::messaging::{
    BroadcastCtl, KickCtl, PushCtl, ResponseCtl, BROADCAST_FUNC, KICK_FUNC, PUSH_FUNC,
    RESPONSE_FUNC,
};
use crate::serialization::Serializer;
use std::sync::Arc;

/// Receiving half of the response protocol.
///
/// A gate terminates client connections for one protocol family and bridges
/// the response protocol back onto sockets: business actors address control
/// messages to the gate's path, and the gate resolves them against the live
/// [`AgentRegistry`]. A control message whose target connection has since
/// disconnected is dropped quietly — that race is expected, not an error.
///
/// Connection accept/close and the wire handshake live in the protocol
/// adapter; the adapter binds each accepted connection into the registry and
/// unbinds it exactly once at disconnect.
pub struct Gate {
    agents: Arc<AgentRegistry>,
}

impl Gate {
    /// Create a gate over a connection registry.
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self { agents }
    }

    /// The registry of live connections this gate owns.
    pub fn agents(&self) -> &Arc<AgentRegistry> {
        &self.agents
    }

    /// Register the four control operations, under their wire-contract
    /// names, on the gate's remote handler table.
    ///
    /// Called once during gate actor initialization.
    ///
    /// # Errors
    ///
    /// Fails if any control name is already bound, i.e. `register` was
    /// called twice on the same table.
    pub fn register<S: Serializer + Send + 'static>(
        handlers: &mut RemoteHandlers<Gate, S>,
    ) -> Result<(), RegistryError> {
        handlers.register_notify(RESPONSE_FUNC, Gate::on_response)?;
        handlers.register_notify(PUSH_FUNC, Gate::on_push)?;
        handlers.register_notify(KICK_FUNC, Gate::on_kick)?;
        handlers.register_notify(BROADCAST_FUNC, Gate::on_broadcast)?;
        Ok(())
    }

    fn on_response(&mut self, ctl: ResponseCtl) {
        let Some(agent) = self.agents.get(&ctl.sid) else {
            tracing::debug!(sid = %ctl.sid, mid = ctl.mid, "response dropped: connection gone");
            return;
        };

        if codes::is_ok(ctl.code) {
            agent.response(ctl.mid, &ctl.data);
        } else {
            agent.response_error(ctl.mid, ctl.code, &ctl.message);
        }
    }

    fn on_push(&mut self, ctl: PushCtl) {
        let Some(agent) = self.agents.get(&ctl.sid) else {
            tracing::debug!(sid = %ctl.sid, route = %ctl.route, "push dropped: connection gone");
            return;
        };

        agent.push(&ctl.route, &ctl.data);
    }

    fn on_kick(&mut self, ctl: KickCtl) {
        // Prefer the uid: a reconnect may have replaced the sid the kicking
        // actor still holds.
        let agent = self
            .agents
            .get_by_uid(ctl.uid)
            .or_else(|| self.agents.get(&ctl.sid));

        match agent {
            Some(agent) => agent.kick(&ctl.reason, ctl.close),
            None => {
                tracing::debug!(sid = %ctl.sid, uid = ctl.uid, "kick dropped: connection gone");
            }
        }
    }

    fn on_broadcast(&mut self, ctl: BroadcastCtl) {
        if ctl.all_uid {
            self.agents.for_each(|agent| {
                if agent.is_bound() {
                    agent.push(&ctl.route, &ctl.data);
                }
            });
        } else {
            for uid in &ctl.uid_list {
                if let Some(agent) = self.agents.get_by_uid(*uid) {
                    agent.push(&ctl.route, &ctl.data);
                }
                // Absent targets are tolerated: they disconnected between
                // handler completion and delivery.
            }
        }
    }
}
