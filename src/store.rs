//! The synchronized server collection and its memoized active view.
//!
//! [`ServerStore`] is the only owner of the collection. The collection lives
//! in a `tokio::sync::watch` channel so reactive consumers can subscribe to
//! changes. Each [`dispatch`](ServerStore::dispatch) swaps in a complete new
//! [`ServerList`], so readers never see a half-applied operation.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::action::{RegistryAction, reduce};
use crate::server::McpServer;

/// An immutable snapshot of the collection tagged with its version.
///
/// The version increases by one on every dispatched action, including
/// actions that leave the contents unchanged. `Clone` is cheap.
#[derive(Debug, Clone)]
pub struct ServerList {
    version: u64,
    servers: Arc<[McpServer]>,
}

impl ServerList {
    fn new(version: u64, servers: Vec<McpServer>) -> Self {
        Self {
            version,
            servers: servers.into(),
        }
    }

    /// Monotonic version of this snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The servers in insertion order.
    pub fn servers(&self) -> &Arc<[McpServer]> {
        &self.servers
    }
}

impl std::ops::Deref for ServerList {
    type Target = [McpServer];

    fn deref(&self) -> &[McpServer] {
        &self.servers
    }
}

/// Cached active-only filter keyed by the list version it was built from.
type ActiveCache = Option<(u64, Arc<[McpServer]>)>;

struct StoreInner {
    tx: watch::Sender<ServerList>,
    active: Mutex<ActiveCache>,
}

/// Shared handle to the synchronized server collection.
///
/// All writers, push handlers and accessors alike, go through
/// [`dispatch`](ServerStore::dispatch) or one of the four named wrappers.
///
/// `Clone` is cheap -- all internal state is `Arc`-wrapped.
#[derive(Clone)]
pub struct ServerStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for ServerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = self.snapshot();
        f.debug_struct("ServerStore")
            .field("version", &list.version)
            .field("len", &list.len())
            .finish()
    }
}

impl Default for ServerStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ServerStore {
    /// Create a store seeded with `servers` at version 0.
    pub fn new(servers: Vec<McpServer>) -> Self {
        let (tx, _rx) = watch::channel(ServerList::new(0, servers));
        Self {
            inner: Arc::new(StoreInner {
                tx,
                active: Mutex::new(None),
            }),
        }
    }

    /// Apply one action, replacing the collection with the reduced result.
    ///
    /// Never fails. Subscribers are notified even when the contents did not
    /// change, since the version still advances.
    pub fn dispatch(&self, action: RegistryAction) {
        let mut duplicate = false;
        let mut len = 0;
        self.inner.tx.send_modify(|list| {
            if let RegistryAction::AddServer(server) = &action {
                duplicate = list.iter().any(|s| s.id == server.id);
            }
            let next = reduce(&list.servers, &action);
            len = next.len();
            *list = ServerList::new(list.version + 1, next);
        });

        if duplicate && let RegistryAction::AddServer(server) = &action {
            tracing::warn!(
                server_id = %server.id,
                "added server shares an id with an existing entry"
            );
        }
        tracing::debug!(action = action.kind(), len, "registry updated");
    }

    /// Replace the whole collection.
    pub fn replace_all(&self, servers: Vec<McpServer>) {
        self.dispatch(RegistryAction::SetServers(servers));
    }

    /// Append one server.
    pub fn add(&self, server: McpServer) {
        self.dispatch(RegistryAction::AddServer(server));
    }

    /// Replace the first server with the same id, if any.
    pub fn update(&self, server: McpServer) {
        self.dispatch(RegistryAction::UpdateServer(server));
    }

    /// Remove the server with `id`, if any.
    pub fn remove(&self, id: impl Into<String>) {
        self.dispatch(RegistryAction::DeleteServer(id.into()));
    }

    /// The current snapshot of the collection.
    pub fn snapshot(&self) -> ServerList {
        self.inner.tx.borrow().clone()
    }

    /// The current servers in insertion order.
    pub fn servers(&self) -> Arc<[McpServer]> {
        self.snapshot().servers
    }

    /// Look up a server by id. Returns the first match.
    pub fn find(&self, id: &str) -> Option<McpServer> {
        self.inner.tx.borrow().iter().find(|s| s.id == id).cloned()
    }

    /// The active-only servers, memoized by collection version.
    ///
    /// Calling this repeatedly without an intervening dispatch returns the
    /// same `Arc`. After any dispatch the next call rebuilds the view.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn active(&self) -> Arc<[McpServer]> {
        let list = self.snapshot();
        let mut cache = self.inner.active.lock().expect("active view cache poisoned");
        if let Some((version, view)) = cache.as_ref()
            && *version == list.version
        {
            return Arc::clone(view);
        }

        let view: Arc<[McpServer]> = filter_active(&list);
        *cache = Some((list.version, Arc::clone(&view)));
        view
    }

    /// Subscribe to collection changes.
    ///
    /// The receiver starts with the current snapshot marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<ServerList> {
        self.inner.tx.subscribe()
    }
}

/// Filter `servers` down to the active ones, always building a fresh value.
pub(crate) fn filter_active(servers: &[McpServer]) -> Arc<[McpServer]> {
    servers.iter().filter(|s| s.is_active).cloned().collect()
}
