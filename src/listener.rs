//! Push handlers that map bridge events onto store actions.
//!
//! Both handlers go through [`ServerStore`] operations only; neither touches
//! the collection any other way. A payload that does not decode is logged
//! and dropped, leaving the collection as it was.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::bridge::{Bridge, Channel, Listener};
use crate::error::PayloadError;
use crate::navigation::NavigationService;
use crate::server::McpServer;
use crate::store::ServerStore;

/// Decode a raw payload into `T`, tagging failures with the channel.
fn decode<T: DeserializeOwned>(channel: Channel, payload: &Value) -> Result<T, PayloadError> {
    T::deserialize(payload).map_err(|source| PayloadError { channel, source })
}

/// Full-sync handler: last writer wins.
pub(crate) fn on_servers_changed(store: &ServerStore, payload: &Value) {
    match decode::<Vec<McpServer>>(Channel::ServersChanged, payload) {
        Ok(servers) => {
            tracing::debug!(count = servers.len(), "full sync received");
            store.replace_all(servers);
        }
        Err(e) => tracing::warn!(error = %e, "ignoring full sync"),
    }
}

/// Add-server handler: append, then reveal the new server if we can.
pub(crate) fn on_add_server(store: &ServerStore, navigation: &NavigationService, payload: &Value) {
    match decode::<McpServer>(Channel::AddServer, payload) {
        Ok(server) => {
            let id = server.id.clone();
            store.add(server);
            tracing::info!(server_id = %id, "server added by background process");
            navigation.reveal_server(&id);
        }
        Err(e) => tracing::warn!(error = %e, "ignoring added server"),
    }
}

/// Subscribe the two push handlers on `bridge`.
///
/// Registration is additive on the bridge, so callers must make sure this
/// runs once per bridge. [`ReadinessGate`](crate::gate::ReadinessGate)
/// guarantees that.
pub fn attach_listeners(bridge: &dyn Bridge, store: &ServerStore, navigation: &NavigationService) {
    let sync_store = store.clone();
    let on_sync: Listener = Arc::new(move |payload: &Value| {
        on_servers_changed(&sync_store, payload);
    });
    bridge.on(Channel::ServersChanged, on_sync);

    let add_store = store.clone();
    let add_navigation = navigation.clone();
    let on_add: Listener = Arc::new(move |payload: &Value| {
        on_add_server(&add_store, &add_navigation, payload);
    });
    bridge.on(Channel::AddServer, on_add);

    tracing::info!("registry listeners attached");
}
