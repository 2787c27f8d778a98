//! Top-level entry point composing the store, the readiness gate, and the
//! navigation slot into a single [`McpRegistry`].
//!
//! The registry is opened via [`McpRegistryBuilder`]. One registry is meant
//! to live for the whole front-end process; [`McpRegistry::start`] is the
//! single place the readiness gate is entered from.

use std::sync::Arc;

use crate::accessor::{ServerAccessor, ServersAccessor};
use crate::error::RegistryError;
use crate::gate::{GateConfig, GateOutcome, ReadinessGate};
use crate::host::Host;
use crate::navigation::{NavigationService, Navigator};
use crate::server::McpServer;
use crate::store::{ServerList, ServerStore};

/// The front-end's synchronized view of the MCP server registry.
///
/// `Clone` is cheap -- all internal state is `Arc`-wrapped.
#[derive(Debug, Clone)]
pub struct McpRegistry {
    store: ServerStore,
    navigation: NavigationService,
    gate: Arc<ReadinessGate>,
}

impl McpRegistry {
    /// Start configuring a registry.
    pub fn builder() -> McpRegistryBuilder {
        McpRegistryBuilder::new()
    }

    /// Attach the push listeners now or as soon as the bridge is ready.
    ///
    /// Safe to call more than once; listeners are attached at most once.
    pub fn start(&self) -> GateOutcome {
        let outcome = self.gate.ensure_listeners_attached();
        tracing::debug!(?outcome, "registry started");
        outcome
    }

    /// Whether the push listeners are attached.
    pub fn is_listening(&self) -> bool {
        self.gate.is_attached()
    }

    /// Collection-scoped facade.
    pub fn servers(&self) -> ServersAccessor {
        ServersAccessor::new(self.store.clone())
    }

    /// Facade scoped to the server with `id`.
    pub fn server(&self, id: impl Into<String>) -> ServerAccessor {
        ServerAccessor::new(self.store.clone(), id)
    }

    /// The underlying store, for subscriptions and raw actions.
    pub fn store(&self) -> &ServerStore {
        &self.store
    }

    /// Subscribe to collection changes.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<ServerList> {
        self.store.subscribe()
    }

    /// The navigation slot; install the router here once it is mounted.
    pub fn navigation(&self) -> &NavigationService {
        &self.navigation
    }
}

/// Builder for configuring and opening an [`McpRegistry`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mcp_registry_sync::{ManualHost, McpRegistry};
///
/// let host = Arc::new(ManualHost::new());
/// let registry = McpRegistry::builder().host(host).open().unwrap();
/// assert!(registry.servers().servers().is_empty());
/// ```
pub struct McpRegistryBuilder {
    host: Option<Arc<dyn Host>>,
    navigator: Option<Arc<dyn Navigator>>,
    gate_config: GateConfig,
    initial: Vec<McpServer>,
}

impl Default for McpRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl McpRegistryBuilder {
    /// Create a builder with no configuration.
    ///
    /// At minimum, [`host`](McpRegistryBuilder::host) must be called before
    /// [`open`](McpRegistryBuilder::open).
    pub fn new() -> Self {
        Self {
            host: None,
            navigator: None,
            gate_config: GateConfig::default(),
            initial: Vec::new(),
        }
    }

    /// Set the host environment that exposes the bridge.
    pub fn host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Install a navigator up front.
    ///
    /// It can also be installed later via [`McpRegistry::navigation`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the readiness gate configuration.
    ///
    /// If not called, [`GateConfig::default()`] is used.
    pub fn gate_config(mut self, config: GateConfig) -> Self {
        self.gate_config = config;
        self
    }

    /// Seed the store with `servers`.
    ///
    /// Hosts that keep the last known collection across restarts pass it
    /// here. Defaults to an empty collection.
    pub fn initial_servers(mut self, servers: Vec<McpServer>) -> Self {
        self.initial = servers;
        self
    }

    /// Open the registry.
    ///
    /// Does not attach listeners -- call [`McpRegistry::start`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingHost`] if no host was set.
    pub fn open(self) -> Result<McpRegistry, RegistryError> {
        let host = self.host.ok_or(RegistryError::MissingHost)?;

        tracing::debug!(count = self.initial.len(), "opening registry");
        let store = ServerStore::new(self.initial);
        let navigation = NavigationService::new();
        if let Some(navigator) = self.navigator {
            navigation.install(navigator);
        }
        let gate = ReadinessGate::new(host, store.clone(), navigation.clone(), self.gate_config);

        Ok(McpRegistry {
            store,
            navigation,
            gate,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::bridge::{Channel, LocalBridge};
    use crate::host::ManualHost;

    fn host_with_bridge() -> (Arc<ManualHost>, Arc<LocalBridge>) {
        let host = Arc::new(ManualHost::new());
        let bridge = Arc::new(LocalBridge::new());
        host.set_bridge(bridge.clone());
        host.mark_ready();
        (host, bridge)
    }

    #[test]
    fn open_without_host_fails() {
        let result = McpRegistry::builder().open();
        assert!(matches!(result, Err(RegistryError::MissingHost)));
    }

    #[tokio::test]
    async fn start_attaches_and_syncs() {
        let (host, bridge) = host_with_bridge();
        let registry = McpRegistry::builder()
            .host(host)
            .open()
            .expect("open should succeed");

        assert_eq!(registry.start(), GateOutcome::Attached);
        assert_eq!(registry.start(), GateOutcome::AlreadyAttached);
        assert!(registry.is_listening());

        bridge.emit(
            Channel::ServersChanged,
            &json!([{ "id": "a", "isActive": true }, { "id": "b" }]),
        );
        let active = registry.servers().active_servers();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a");
    }

    #[tokio::test]
    async fn navigator_from_builder_receives_reveal() {
        let (host, bridge) = host_with_bridge();
        let paths = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&paths);
        let registry = McpRegistry::builder()
            .host(host)
            .navigator(Arc::new(move |path: &str| {
                sink.lock().expect("poisoned").push(path.to_owned());
            }))
            .open()
            .expect("open should succeed");
        registry.start();

        bridge.emit(Channel::AddServer, &json!({ "id": "new" }));
        assert_eq!(
            *paths.lock().expect("poisoned"),
            ["/settings/mcp", "/settings/mcp/settings/new"]
        );
    }

    #[tokio::test]
    async fn start_while_loading_attaches_after_ready() {
        let host = Arc::new(ManualHost::new());
        let registry = McpRegistry::builder()
            .host(host.clone())
            .gate_config(GateConfig {
                retry_delay: Duration::from_millis(10),
            })
            .open()
            .expect("open should succeed");

        assert_eq!(registry.start(), GateOutcome::Deferred);
        host.set_bridge(Arc::new(LocalBridge::new()));
        host.mark_ready();
        assert!(registry.is_listening());
    }

    #[test]
    fn initial_servers_seed_the_store() {
        let registry = McpRegistry::builder()
            .host(Arc::new(ManualHost::new()))
            .initial_servers(vec![McpServer::new("a", "A")])
            .open()
            .expect("open should succeed");
        assert_eq!(registry.server("a").server().map(|s| s.name), Some("A".into()));
    }

    #[test]
    fn retry_uses_runtime_of_start_when_opened_outside_one() {
        let host = Arc::new(ManualHost::new());
        host.mark_ready();
        let registry = McpRegistry::builder()
            .host(host.clone())
            .gate_config(GateConfig {
                retry_delay: Duration::from_millis(10),
            })
            .open()
            .expect("open should succeed");

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        rt.block_on(async {
            assert_eq!(registry.start(), GateOutcome::RetryScheduled);
            host.set_bridge(Arc::new(LocalBridge::new()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        });
        assert!(registry.is_listening());
    }
}
