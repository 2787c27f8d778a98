//! Registry actions and the pure reducer that applies them.

use serde::{Deserialize, Serialize};

use crate::server::McpServer;

/// The four operations that may change the server collection.
///
/// Every writer (push handlers and accessors alike) goes through these
/// variants, so there is exactly one mutation surface.
///
/// Uses adjacently tagged serialization (`"type"` + `"data"`), so actions can
/// be forwarded over a host transport as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RegistryAction {
    /// Discard the current collection and install this one.
    SetServers(Vec<McpServer>),
    /// Append a server. Duplicate ids are not rejected.
    AddServer(McpServer),
    /// Replace the first server with the same id. No-op if none matches.
    UpdateServer(McpServer),
    /// Remove every server with this id. No-op if absent.
    DeleteServer(String),
}

impl RegistryAction {
    /// Short name of the variant, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetServers(_) => "set_servers",
            Self::AddServer(_) => "add_server",
            Self::UpdateServer(_) => "update_server",
            Self::DeleteServer(_) => "delete_server",
        }
    }
}

/// Apply an action to a collection and return the next collection.
///
/// Pure and total: never fails, never mutates `servers`. Misses on update
/// and delete return an unchanged copy.
///
/// # Arguments
///
/// * `servers` - The current collection.
/// * `action` - The operation to apply.
///
/// # Returns
///
/// The collection after the action.
pub fn reduce(servers: &[McpServer], action: &RegistryAction) -> Vec<McpServer> {
    match action {
        RegistryAction::SetServers(next) => next.clone(),
        RegistryAction::AddServer(server) => {
            let mut next = servers.to_vec();
            next.push(server.clone());
            next
        }
        RegistryAction::UpdateServer(server) => {
            let mut next = servers.to_vec();
            if let Some(slot) = next.iter_mut().find(|s| s.id == server.id) {
                *slot = server.clone();
            }
            next
        }
        RegistryAction::DeleteServer(id) => servers
            .iter()
            .filter(|s| &s.id != id)
            .cloned()
            .collect(),
    }
}
