//! Walks through a registry lifecycle against an in-process bridge.
//!
//! Run with: `RUST_LOG=debug cargo run --example registry`

use std::sync::Arc;
use std::time::Duration;

use mcp_registry_sync::{BridgeMessage, Channel, GateConfig, LocalBridge, ManualHost, McpRegistry};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // The UI is still loading and the background process has not exposed
    // its bridge yet.
    let host = Arc::new(ManualHost::new());
    let registry = McpRegistry::builder()
        .host(host.clone())
        .gate_config(GateConfig {
            retry_delay: Duration::from_millis(50),
        })
        .navigator(Arc::new(|path: &str| println!("navigate -> {path}")))
        .open()?;

    println!("start: {:?}", registry.start());

    let bridge = LocalBridge::new();
    host.set_bridge(Arc::new(bridge.clone()));
    host.mark_ready();
    println!("listening: {}", registry.is_listening());

    let (tx, pump) = bridge.connect(16);
    tx.send(BridgeMessage::new(
        Channel::ServersChanged,
        json!([
            { "id": "fetch", "name": "Fetch", "isActive": true, "command": "uvx" },
            { "id": "memory", "name": "Memory", "isActive": false }
        ]),
    ))
    .await?;
    tx.send(BridgeMessage::new(
        Channel::AddServer,
        json!({ "id": "@acme/search", "name": "Search", "isActive": true }),
    ))
    .await?;
    drop(tx);
    pump.await?;

    let servers = registry.servers();
    for server in servers.servers().iter() {
        println!("{} active={}", server.id, server.is_active);
    }

    registry.server("memory").set_server_active(servers.servers()[1].clone(), true);
    println!("active: {}", servers.active_servers().len());

    Ok(())
}
