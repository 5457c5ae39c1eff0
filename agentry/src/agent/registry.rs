//! Registry of live client connections.

use crate::agent::Agent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    by_sid: HashMap<String, Arc<dyn Agent>>,
    sid_by_uid: HashMap<i64, String>,
}

/// The single synchronization point for connection visibility.
///
/// One registry exists per listener: created at startup, torn down at
/// shutdown, shared (`Arc`) between the gate actor and any component that
/// needs direct delivery. A connection is visible under its sid from the
/// moment it is accepted and additionally under its uid from the moment
/// authentication completes; removal happens exactly once, at disconnect.
///
/// Lookups and iteration are safe to call concurrently with binds and
/// unbinds from any actor. No other component caches connection liveness.
#[derive(Default)]
pub struct AgentRegistry {
    inner: RwLock<Inner>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a freshly accepted connection under its sid.
    ///
    /// Rebinding an existing sid replaces the entry and is logged — sids are
    /// generated to be unique, so this indicates a bug in the adapter.
    pub fn bind(&self, agent: Arc<dyn Agent>) {
        let sid = agent.sid().to_string();
        let mut inner = self.inner.write();
        if inner.by_sid.insert(sid.clone(), agent).is_some() {
            tracing::warn!(sid = %sid, "rebinding an already-bound sid");
        }
    }

    /// Make the connection additionally visible under `uid`.
    ///
    /// Called when authentication completes. A uid already bound to another
    /// sid (reconnect before the stale connection closed) is repointed to
    /// the new sid; the stale connection stays reachable by its sid until it
    /// disconnects. Returns false when `sid` is not bound.
    pub fn bind_uid(&self, sid: &str, uid: i64) -> bool {
        let mut inner = self.inner.write();
        if !inner.by_sid.contains_key(sid) {
            tracing::warn!(sid, uid, "bind_uid on unknown sid");
            return false;
        }
        if let Some(old_sid) = inner.sid_by_uid.insert(uid, sid.to_string()) {
            if old_sid != sid {
                tracing::debug!(uid, old_sid = %old_sid, new_sid = sid, "uid rebound to a new connection");
            }
        }
        true
    }

    /// Look up a connection by sid.
    pub fn get(&self, sid: &str) -> Option<Arc<dyn Agent>> {
        self.inner.read().by_sid.get(sid).cloned()
    }

    /// Look up a connection by authenticated uid.
    pub fn get_by_uid(&self, uid: i64) -> Option<Arc<dyn Agent>> {
        let inner = self.inner.read();
        let sid = inner.sid_by_uid.get(&uid)?;
        inner.by_sid.get(sid).cloned()
    }

    /// Visit every live connection.
    ///
    /// Holds a read lock for the duration, so binds and unbinds elsewhere
    /// block until iteration finishes; callers must not re-enter the
    /// registry from `f`.
    pub fn for_each<F: FnMut(&Arc<dyn Agent>)>(&self, mut f: F) {
        for agent in self.inner.read().by_sid.values() {
            f(agent);
        }
    }

    /// Remove a connection at disconnect. Returns the removed agent, or
    /// `None` when the sid was already gone (removal is exactly-once).
    pub fn unbind(&self, sid: &str) -> Option<Arc<dyn Agent>> {
        let mut inner = self.inner.write();
        let agent = inner.by_sid.remove(sid)?;
        let uid = agent.uid();
        // Only drop the uid entry if it still points at this connection; a
        // reconnect may have repointed it already.
        if uid > 0 && inner.sid_by_uid.get(&uid).is_some_and(|s| s == sid) {
            inner.sid_by_uid.remove(&uid);
        }
        Some(agent)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.inner.read().by_sid.len()
    }

    /// Whether no connections are live.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_sid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::StatusCode;
    use parking_lot::Mutex;

    struct FakeAgent {
        sid: String,
        uid: Mutex<i64>,
    }

    impl FakeAgent {
        fn new(sid: &str, uid: i64) -> Arc<Self> {
            Arc::new(Self {
                sid: sid.to_string(),
                uid: Mutex::new(uid),
            })
        }
    }

    impl Agent for FakeAgent {
        fn sid(&self) -> &str {
            &self.sid
        }
        fn uid(&self) -> i64 {
            *self.uid.lock()
        }
        fn response(&self, _mid: u32, _data: &[u8]) {}
        fn response_error(&self, _mid: u32, _code: StatusCode, _message: &str) {}
        fn push(&self, _route: &str, _data: &[u8]) {}
        fn kick(&self, _reason: &[u8], _close: bool) {}
    }

    #[test]
    fn test_bind_and_lookup_by_sid() {
        let registry = AgentRegistry::new();
        registry.bind(FakeAgent::new("s1", 0));

        assert!(registry.get("s1").is_some());
        assert!(registry.get("s2").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_uid_visible_after_bind_uid() {
        let registry = AgentRegistry::new();
        let agent = FakeAgent::new("s1", 0);
        registry.bind(agent.clone());

        assert!(registry.get_by_uid(42).is_none());

        *agent.uid.lock() = 42;
        assert!(registry.bind_uid("s1", 42));
        assert!(registry.get_by_uid(42).is_some());
    }

    #[test]
    fn test_bind_uid_unknown_sid() {
        let registry = AgentRegistry::new();
        assert!(!registry.bind_uid("ghost", 42));
    }

    #[test]
    fn test_unbind_exactly_once() {
        let registry = AgentRegistry::new();
        let agent = FakeAgent::new("s1", 7);
        registry.bind(agent);
        registry.bind_uid("s1", 7);

        assert!(registry.unbind("s1").is_some());
        assert!(registry.unbind("s1").is_none());
        assert!(registry.get_by_uid(7).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reconnect_repoints_uid() {
        let registry = AgentRegistry::new();
        let stale = FakeAgent::new("old", 7);
        registry.bind(stale);
        registry.bind_uid("old", 7);

        let fresh = FakeAgent::new("new", 7);
        registry.bind(fresh);
        registry.bind_uid("new", 7);

        let found = registry.get_by_uid(7).unwrap();
        assert_eq!(found.sid(), "new");

        // Closing the stale connection must not evict the fresh uid entry.
        registry.unbind("old");
        assert!(registry.get_by_uid(7).is_some());
    }

    #[test]
    fn test_for_each_sees_all_connections() {
        let registry = AgentRegistry::new();
        registry.bind(FakeAgent::new("a", 1));
        registry.bind(FakeAgent::new("b", 2));
        registry.bind(FakeAgent::new("c", 0));

        let mut seen = 0;
        registry.for_each(|_agent| seen += 1);
        assert_eq!(seen, 3);
    }
}
