//! The host environment the registry runs inside.
//!
//! A host knows whether the cross-process bridge exists yet and whether its
//! document (window, webview, UI shell) has finished loading. The readiness
//! gate only ever observes these two signals.

use std::sync::{Arc, Mutex};

use crate::bridge::Bridge;

/// Loading state of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Still loading; a ready transition is still to come.
    Loading,
    /// Finished loading; the ready transition has already happened.
    Ready,
}

/// One-shot continuation run on the document's ready transition.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Environment probe consumed by [`ReadinessGate`](crate::gate::ReadinessGate).
pub trait Host: Send + Sync {
    /// The bridge handle, if the background process has exposed one.
    fn bridge(&self) -> Option<Arc<dyn Bridge>>;

    /// Current document loading state.
    fn document_state(&self) -> DocumentState;

    /// Run `callback` once when the document becomes ready.
    ///
    /// Each registered callback fires at most once.
    fn on_document_ready(&self, callback: ReadyCallback);
}

struct ManualHostState {
    bridge: Option<Arc<dyn Bridge>>,
    document: DocumentState,
    pending: Vec<ReadyCallback>,
}

/// A [`Host`] driven explicitly by the embedding application.
///
/// Starts `Loading` without a bridge. Call [`set_bridge`](ManualHost::set_bridge)
/// once the transport is up and [`mark_ready`](ManualHost::mark_ready) when
/// the UI has loaded. Callbacks registered after the ready transition run
/// immediately, so a registration can never miss the transition.
pub struct ManualHost {
    state: Mutex<ManualHostState>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("host state poisoned");
        f.debug_struct("ManualHost")
            .field("has_bridge", &state.bridge.is_some())
            .field("document", &state.document)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl ManualHost {
    /// Create a loading host with no bridge.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualHostState {
                bridge: None,
                document: DocumentState::Loading,
                pending: Vec::new(),
            }),
        }
    }

    /// Expose the bridge handle.
    ///
    /// # Panics
    ///
    /// Panics if the host state lock is poisoned.
    pub fn set_bridge(&self, bridge: Arc<dyn Bridge>) {
        self.state.lock().expect("host state poisoned").bridge = Some(bridge);
    }

    /// Transition to `Ready` and run every pending callback once.
    ///
    /// Callbacks run outside the state lock. Calling this again is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the host state lock is poisoned.
    pub fn mark_ready(&self) {
        let pending = {
            let mut state = self.state.lock().expect("host state poisoned");
            if state.document == DocumentState::Ready {
                return;
            }
            state.document = DocumentState::Ready;
            std::mem::take(&mut state.pending)
        };
        tracing::debug!(callbacks = pending.len(), "host document ready");
        for callback in pending {
            callback();
        }
    }
}

impl Host for ManualHost {
    fn bridge(&self) -> Option<Arc<dyn Bridge>> {
        self.state.lock().expect("host state poisoned").bridge.clone()
    }

    fn document_state(&self) -> DocumentState {
        self.state.lock().expect("host state poisoned").document
    }

    fn on_document_ready(&self, callback: ReadyCallback) {
        {
            let mut state = self.state.lock().expect("host state poisoned");
            if state.document == DocumentState::Loading {
                state.pending.push(callback);
                return;
            }
        }
        callback();
    }
}
