//! Per-connection session state.

use crate::messaging::ActorPath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State tying one live client connection to the actor system.
///
/// A session is created by the network-facing actor when a connection is
/// accepted and travels inside every envelope that must eventually produce a
/// client-visible response. Business actors read and mutate it (for example
/// binding a user id at login); they never touch the socket behind it —
/// responses are routed back through [`agent_path`](Session::agent_path).
///
/// # Lifecycle
///
/// 1. **Connect**: created with a fresh sid and the owning actor's path.
/// 2. **Login**: `bind` sets the authenticated uid.
/// 3. **Requests**: `mid` carries the in-flight client request sequence
///    number so the eventual response reaches the right client callback.
/// 4. **Disconnect**: the agent registry entry is removed exactly once and a
///    close notification fires into business logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique connection identifier, generated at connect time.
    pub sid: String,

    /// Authenticated user identifier; 0 until login completes.
    pub uid: i64,

    /// Path of the actor that owns the connection. Never changes for the
    /// session's lifetime.
    pub agent_path: ActorPath,

    /// Sequence number of the in-flight client request being served.
    pub mid: u32,

    /// Auxiliary per-connection state (server id, player id, ...).
    pub data: HashMap<String, String>,
}

impl Session {
    /// Create a session for a freshly accepted connection.
    ///
    /// Generates a new sid; uid starts unbound and `mid` starts at 0.
    pub fn new(agent_path: ActorPath) -> Self {
        Self {
            sid: uuid::Uuid::new_v4().simple().to_string(),
            uid: 0,
            agent_path,
            mid: 0,
            data: HashMap::new(),
        }
    }

    /// Bind the authenticated user id after login completes.
    pub fn bind(&mut self, uid: i64) {
        self.uid = uid;
    }

    /// Whether a user id has been bound to this session.
    pub fn is_bound(&self) -> bool {
        self.uid > 0
    }

    /// Read a property from the session's data bag.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Set a property in the session's data bag.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}
