//! Cross-process bridge abstraction and an in-process implementation.
//!
//! The background process pushes named-channel events; the [`Bridge`]
//! trait is the listener-registration half of that handle. [`LocalBridge`]
//! implements it in-process and is fed by a stream of [`BridgeMessage`]s,
//! which is how hosts wire up a real transport (and how tests drive it).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

/// Named channels the background process pushes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Full-sync: payload is the complete server array.
    #[serde(rename = "mcp:servers-changed")]
    ServersChanged,
    /// A single newly added server.
    #[serde(rename = "mcp:add-server")]
    AddServer,
}

impl Channel {
    /// Wire name of the channel.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServersChanged => "mcp:servers-changed",
            Self::AddServer => "mcp:add-server",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked with the raw payload of each event on a channel.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Listener-registration side of a cross-process bridge.
///
/// # Contract
///
/// - Listeners for one channel are invoked in delivery order (FIFO).
/// - No ordering is implied across channels.
/// - Registration is additive: registering twice means two invocations per
///   event, so callers must guard against double registration themselves.
pub trait Bridge: Send + Sync {
    /// Register `listener` for every future event on `channel`.
    fn on(&self, channel: Channel, listener: Listener);
}

/// One event pushed by the background process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMessage {
    /// Channel the event was sent on.
    pub channel: Channel,
    /// Raw JSON payload.
    pub payload: Value,
}

impl BridgeMessage {
    /// Build a message for `channel` carrying `payload`.
    pub fn new(channel: Channel, payload: Value) -> Self {
        Self { channel, payload }
    }
}

type ListenerMap = HashMap<Channel, Vec<Listener>>;

/// In-process [`Bridge`] that dispatches messages synchronously to listeners.
///
/// `Clone` is cheap -- the listener table is `Arc`-wrapped.
#[derive(Clone, Default)]
pub struct LocalBridge {
    listeners: Arc<RwLock<ListenerMap>>,
}

impl fmt::Debug for LocalBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBridge")
            .field(
                "servers_changed",
                &self.listener_count(Channel::ServersChanged),
            )
            .field("add_server", &self.listener_count(Channel::AddServer))
            .finish()
    }
}

impl LocalBridge {
    /// Create a bridge with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners registered on `channel`.
    ///
    /// # Panics
    ///
    /// Panics if the listener table lock is poisoned.
    pub fn listener_count(&self, channel: Channel) -> usize {
        let listeners = self.listeners.read().expect("listener table poisoned");
        listeners.get(&channel).map_or(0, Vec::len)
    }

    /// Deliver one event to every listener on its channel.
    ///
    /// Listeners are invoked outside the table lock, so a listener may
    /// register further listeners without deadlocking.
    ///
    /// # Returns
    ///
    /// How many listeners were invoked.
    ///
    /// # Panics
    ///
    /// Panics if the listener table lock is poisoned.
    pub fn emit(&self, channel: Channel, payload: &Value) -> usize {
        let targets: Vec<Listener> = {
            let listeners = self.listeners.read().expect("listener table poisoned");
            listeners.get(&channel).cloned().unwrap_or_default()
        };
        if targets.is_empty() {
            tracing::trace!(%channel, "no listeners, event dropped");
        }
        for listener in &targets {
            listener(payload);
        }
        targets.len()
    }

    /// Drain `stream`, emitting each message in order.
    ///
    /// Returns when the stream ends.
    ///
    /// # Returns
    ///
    /// The number of messages consumed.
    pub async fn pump<S>(&self, mut stream: S) -> u64
    where
        S: tokio_stream::Stream<Item = BridgeMessage> + Unpin,
    {
        let mut delivered = 0;
        while let Some(message) = stream.next().await {
            self.emit(message.channel, &message.payload);
            delivered += 1;
        }
        tracing::debug!(delivered, "bridge stream ended");
        delivered
    }

    /// Spawn [`pump`](LocalBridge::pump) on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_pump<S>(&self, stream: S) -> tokio::task::JoinHandle<u64>
    where
        S: tokio_stream::Stream<Item = BridgeMessage> + Send + Unpin + 'static,
    {
        let bridge = self.clone();
        tokio::spawn(async move { bridge.pump(stream).await })
    }

    /// Open an mpsc sender feeding a spawned pump.
    ///
    /// The pump ends once every clone of the returned sender is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect(
        &self,
        buffer: usize,
    ) -> (mpsc::Sender<BridgeMessage>, tokio::task::JoinHandle<u64>) {
        let (tx, rx) = mpsc::channel(buffer);
        let task = self.spawn_pump(ReceiverStream::new(rx));
        (tx, task)
    }
}

impl Bridge for LocalBridge {
    fn on(&self, channel: Channel, listener: Listener) {
        let mut listeners = self.listeners.write().expect("listener table poisoned");
        listeners.entry(channel).or_default().push(listener);
        tracing::trace!(%channel, "listener registered");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use serde_json::json;

    fn recorder() -> (Listener, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Listener = Arc::new(move |payload: &Value| {
            sink.lock().expect("poisoned").push(payload.clone());
        });
        (listener, seen)
    }

    #[test]
    fn channel_wire_names() {
        assert_eq!(Channel::ServersChanged.as_str(), "mcp:servers-changed");
        assert_eq!(Channel::AddServer.to_string(), "mcp:add-server");
        let value = serde_json::to_value(Channel::AddServer).expect("serialize");
        assert_eq!(value, json!("mcp:add-server"));
    }

    #[test]
    fn message_deserializes_from_wire_shape() {
        let message: BridgeMessage = serde_json::from_value(json!({
            "channel": "mcp:servers-changed",
            "payload": []
        }))
        .expect("deserialize");
        assert_eq!(message.channel, Channel::ServersChanged);
        assert_eq!(message.payload, json!([]));
    }

    #[test]
    fn emit_reaches_only_matching_channel() {
        let bridge = LocalBridge::new();
        let (listener, seen) = recorder();
        bridge.on(Channel::AddServer, listener);

        assert_eq!(bridge.emit(Channel::ServersChanged, &json!([])), 0);
        assert_eq!(bridge.emit(Channel::AddServer, &json!({ "id": "a" })), 1);
        assert_eq!(*seen.lock().expect("poisoned"), vec![json!({ "id": "a" })]);
    }

    #[test]
    fn double_registration_dispatches_twice() {
        let bridge = LocalBridge::new();
        let (listener, seen) = recorder();
        bridge.on(Channel::AddServer, Arc::clone(&listener));
        bridge.on(Channel::AddServer, listener);

        bridge.emit(Channel::AddServer, &json!(1));
        assert_eq!(bridge.listener_count(Channel::AddServer), 2);
        assert_eq!(seen.lock().expect("poisoned").len(), 2);
    }

    #[test]
    fn listener_may_register_during_emit() {
        let bridge = LocalBridge::new();
        let inner = bridge.clone();
        bridge.on(
            Channel::ServersChanged,
            Arc::new(move |_: &Value| {
                inner.on(Channel::AddServer, Arc::new(|_: &Value| {}));
            }),
        );

        bridge.emit(Channel::ServersChanged, &json!([]));
        assert_eq!(bridge.listener_count(Channel::AddServer), 1);
    }

    #[tokio::test]
    async fn pump_delivers_in_order() {
        let bridge = LocalBridge::new();
        let (listener, seen) = recorder();
        bridge.on(Channel::ServersChanged, listener);

        let stream = tokio_stream::iter(vec![
            BridgeMessage::new(Channel::ServersChanged, json!(1)),
            BridgeMessage::new(Channel::AddServer, json!(2)),
            BridgeMessage::new(Channel::ServersChanged, json!(3)),
        ]);
        let delivered = bridge.pump(stream).await;

        assert_eq!(delivered, 3);
        assert_eq!(*seen.lock().expect("poisoned"), vec![json!(1), json!(3)]);
    }

    #[tokio::test]
    async fn connect_pump_ends_when_sender_dropped() {
        let bridge = LocalBridge::new();
        let (listener, seen) = recorder();
        bridge.on(Channel::AddServer, listener);

        let (tx, task) = bridge.connect(8);
        tx.send(BridgeMessage::new(Channel::AddServer, json!("x")))
            .await
            .expect("pump alive");
        drop(tx);

        let delivered = task.await.expect("pump task");
        assert_eq!(delivered, 1);
        assert_eq!(*seen.lock().expect("poisoned"), vec![json!("x")]);
    }
}
