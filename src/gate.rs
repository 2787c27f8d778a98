//! Readiness gate: attach the push listeners as soon as a bridge exists.
//!
//! The gate never blocks start-up. If the bridge is missing it either hooks
//! the host's document-ready transition (while loading) or schedules one
//! delayed re-check (once loaded). If the bridge is still missing after that
//! single retry, the gate gives up; without a bridge the front-end cannot
//! work anyway.
//!
//! An explicit attached flag guards [`attach_listeners`] so that repeated or
//! concurrent calls can never register a channel twice.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use crate::bridge::Bridge;
use crate::host::{DocumentState, Host};
use crate::listener::attach_listeners;
use crate::navigation::NavigationService;
use crate::store::ServerStore;

/// Configuration for the readiness gate.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use mcp_registry_sync::GateConfig;
///
/// let config = GateConfig::default();
/// assert_eq!(config.retry_delay, Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Delay before the single re-check when the document is ready but the
    /// bridge is not.
    ///
    /// Default: 100 milliseconds.
    pub retry_delay: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// What a call to [`ReadinessGate::ensure_listeners_attached`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Listeners were attached by this call.
    Attached,
    /// Listeners were attached earlier; nothing to do.
    AlreadyAttached,
    /// Waiting for the host document to become ready.
    Deferred,
    /// A delayed re-check is pending.
    RetryScheduled,
    /// The single retry has been used up (or could not be scheduled).
    GaveUp,
}

const RETRY_IDLE: u8 = 0;
const RETRY_PENDING: u8 = 1;
const RETRY_DONE: u8 = 2;

/// Attach-when-ready gate for the registry's push listeners.
pub struct ReadinessGate {
    host: Arc<dyn Host>,
    store: ServerStore,
    navigation: NavigationService,
    config: GateConfig,
    runtime: Option<tokio::runtime::Handle>,
    attached: AtomicBool,
    ready_hooked: AtomicBool,
    retry: AtomicU8,
}

impl std::fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("attached", &self.is_attached())
            .field("config", &self.config)
            .finish()
    }
}

impl ReadinessGate {
    /// Create a gate that will attach listeners for `store` and `navigation`.
    ///
    /// Captures the current tokio runtime, if any. The delayed retry prefers
    /// the runtime of the calling thread and falls back to this one when the
    /// gate is re-entered from a host thread.
    pub fn new(
        host: Arc<dyn Host>,
        store: ServerStore,
        navigation: NavigationService,
        config: GateConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            host,
            store,
            navigation,
            config,
            runtime: tokio::runtime::Handle::try_current().ok(),
            attached: AtomicBool::new(false),
            ready_hooked: AtomicBool::new(false),
            retry: AtomicU8::new(RETRY_IDLE),
        })
    }

    /// Whether the listeners have been attached.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Make sure the push listeners are attached, now or later.
    ///
    /// Idempotent: safe to call any number of times from any thread; each
    /// channel listener is attached at most once.
    pub fn ensure_listeners_attached(self: &Arc<Self>) -> GateOutcome {
        if self.is_attached() {
            return GateOutcome::AlreadyAttached;
        }

        if let Some(bridge) = self.host.bridge() {
            return self.attach(bridge.as_ref());
        }

        match self.host.document_state() {
            DocumentState::Loading => self.defer_until_ready(),
            DocumentState::Ready => self.schedule_retry(),
        }
    }

    /// Attach the listeners unless another caller won the race.
    fn attach(&self, bridge: &dyn Bridge) -> GateOutcome {
        if self
            .attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return GateOutcome::AlreadyAttached;
        }
        attach_listeners(bridge, &self.store, &self.navigation);
        GateOutcome::Attached
    }

    /// Register a single document-ready continuation that re-enters the gate.
    fn defer_until_ready(self: &Arc<Self>) -> GateOutcome {
        if self.ready_hooked.swap(true, Ordering::AcqRel) {
            return GateOutcome::Deferred;
        }
        tracing::debug!("bridge not available yet, waiting for document ready");
        let gate = Arc::clone(self);
        self.host.on_document_ready(Box::new(move || {
            let outcome = gate.ensure_listeners_attached();
            tracing::debug!(?outcome, "readiness gate re-entered on document ready");
        }));
        GateOutcome::Deferred
    }

    /// Schedule the one delayed re-check of the bridge.
    fn schedule_retry(self: &Arc<Self>) -> GateOutcome {
        match self.retry.compare_exchange(
            RETRY_IDLE,
            RETRY_PENDING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {}
            Err(RETRY_PENDING) => return GateOutcome::RetryScheduled,
            Err(_) => return GateOutcome::GaveUp,
        }

        let runtime = tokio::runtime::Handle::try_current()
            .ok()
            .or_else(|| self.runtime.clone());
        let Some(runtime) = runtime else {
            tracing::warn!("no tokio runtime to schedule bridge retry; giving up");
            self.retry.store(RETRY_DONE, Ordering::Release);
            return GateOutcome::GaveUp;
        };

        let delay = self.config.retry_delay;
        tracing::debug!(?delay, "bridge not available, retrying once");
        let gate = Arc::clone(self);
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            gate.retry.store(RETRY_DONE, Ordering::Release);
            match gate.host.bridge() {
                Some(bridge) => {
                    gate.attach(bridge.as_ref());
                }
                None => tracing::debug!("bridge still unavailable after retry; giving up"),
            }
        });
        GateOutcome::RetryScheduled
    }
}
