//! Keeps a front-end's copy of the MCP server registry in sync with pushes
//! from a background process.

mod accessor;
pub use accessor::{ServerAccessor, ServersAccessor};
mod action;
pub use action::{RegistryAction, reduce};
pub mod bridge;
pub use bridge::{Bridge, BridgeMessage, Channel, Listener, LocalBridge};
mod error;
pub use error::{PayloadError, RegistryError};
mod gate;
pub use gate::{GateConfig, GateOutcome, ReadinessGate};
mod host;
pub use host::{DocumentState, Host, ManualHost, ReadyCallback};
mod listener;
pub use listener::attach_listeners;
pub mod navigation;
pub use navigation::{NavigationService, Navigator};
mod registry;
pub use registry::{McpRegistry, McpRegistryBuilder};
mod server;
pub use server::McpServer;
mod store;
pub use store::{ServerList, ServerStore};
