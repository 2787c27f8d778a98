//! Read/write facades handed to UI callers.
//!
//! Both facades read through to [`ServerStore`] and write through its four
//! operations. They hold no state of their own beyond the store handle.

use std::sync::Arc;

use crate::server::McpServer;
use crate::store::{ServerStore, filter_active};

/// Collection-scoped facade over the registry.
#[derive(Debug, Clone)]
pub struct ServersAccessor {
    store: ServerStore,
}

impl ServersAccessor {
    /// Wrap a store handle.
    pub fn new(store: ServerStore) -> Self {
        Self { store }
    }

    /// Every server, in insertion order.
    pub fn servers(&self) -> Arc<[McpServer]> {
        self.store.servers()
    }

    /// Active servers, memoized until the next mutation.
    pub fn active_servers(&self) -> Arc<[McpServer]> {
        self.store.active()
    }

    /// Active servers, filtered fresh on every call.
    pub fn active_servers_fresh(&self) -> Arc<[McpServer]> {
        filter_active(&self.store.servers())
    }

    /// Append a server.
    pub fn add_server(&self, server: McpServer) {
        self.store.add(server);
    }

    /// Replace the stored server with the same id, if any.
    pub fn update_server(&self, server: McpServer) {
        self.store.update(server);
    }

    /// Remove the server with `id`, if any.
    pub fn delete_server(&self, id: &str) {
        self.store.remove(id);
    }

    /// Store `server` with its activation flag overwritten.
    ///
    /// Every other field comes from `server` as passed, not from the
    /// currently stored record.
    pub fn set_server_active(&self, server: McpServer, is_active: bool) {
        self.store.update(server.with_active(is_active));
    }

    /// Replace the whole collection.
    pub fn replace_servers(&self, servers: Vec<McpServer>) {
        self.store.replace_all(servers);
    }
}

/// Facade scoped to the single server with a fixed id.
///
/// Writes for any other id are refused (logged and dropped).
#[derive(Debug, Clone)]
pub struct ServerAccessor {
    id: String,
    store: ServerStore,
}

impl ServerAccessor {
    /// Scope a store handle to `id`.
    pub fn new(store: ServerStore, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }

    /// The id this facade is scoped to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The stored server, if present.
    pub fn server(&self) -> Option<McpServer> {
        self.store.find(&self.id)
    }

    /// Replace the stored server with `server`.
    ///
    /// # Returns
    ///
    /// `false` if `server` belongs to a different id and was ignored.
    pub fn update_server(&self, server: McpServer) -> bool {
        if server.id != self.id {
            tracing::warn!(
                scope = %self.id,
                server_id = %server.id,
                "update outside accessor scope ignored"
            );
            return false;
        }
        self.store.update(server);
        true
    }

    /// Store `server` with its activation flag overwritten.
    ///
    /// # Returns
    ///
    /// `false` if `server` belongs to a different id and was ignored.
    pub fn set_server_active(&self, server: McpServer, is_active: bool) -> bool {
        self.update_server(server.with_active(is_active))
    }

    /// Remove this server from the registry.
    pub fn delete_server(&self) {
        self.store.remove(self.id.as_str());
    }
}
