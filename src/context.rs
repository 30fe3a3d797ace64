//! The node's shared, long-lived state: its own identity, its
//! collaborators, and the registries keyed off switch label / peer
//! address (§9).
//!
//! Everything *per-frame* (which label a datagram arrived on, which
//! session decrypted it) is threaded through dispatcher method
//! arguments and local variables instead of living here — the original
//! design's global mutable scratch fields are replaced by an explicit,
//! stack-local record built fresh for each call (see
//! [`crate::dispatcher::DispatchState`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::address::Address;
use crate::content_session::SessionManager;
use crate::outer_session::{CryptoAuth, OuterSessionRegistry};
use crate::router::RouterModule;
use crate::switch::SwitchInterface;
use crate::tunnel::TunnelInterface;

/// Tunable knobs for a [`Context`] (§10.5).
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Upper bound on concurrently-tracked outer sessions before the
    /// least-recently-used one is evicted.
    pub max_outer_sessions: usize,
    /// Outer sessions idle longer than this are evicted proactively.
    pub outer_session_idle_timeout: Duration,
    /// Hop-limit [`crate::dispatcher::Dispatcher::send_router_message`]
    /// stamps on an outgoing router-traffic frame. The router-traffic
    /// predicate requires `hop_limit == 0` on arrival, and
    /// [`crate::dispatcher::Dispatcher`]'s own forwarding path drops any
    /// frame whose hop-limit is already zero rather than relaying it, so
    /// `0` restricts router traffic to directly-connected peers. Raise
    /// this if router traffic needs to survive being relayed through
    /// other nodes running this core.
    pub router_traffic_initial_hop_limit: u8,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            max_outer_sessions: 4096,
            outer_session_idle_timeout: Duration::from_secs(300),
            router_traffic_initial_hop_limit: 0,
        }
    }
}

/// The defaults embedders fall back to when no config file overrides
/// them (§10.3); computed once and shared rather than rebuilt per call.
pub static DEFAULT_CONFIG: once_cell::sync::Lazy<DispatcherConfig> =
    once_cell::sync::Lazy::new(DispatcherConfig::default);

/// Running counters for observability (§10.5). Cheap, lock-free,
/// snapshot-able; not a substitute for tracing spans, which carry
/// per-frame detail these aggregate away.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    pub frames_from_switch: AtomicU64,
    pub frames_to_switch: AtomicU64,
    pub frames_for_me: AtomicU64,
    pub frames_from_tun: AtomicU64,
    pub frames_to_tun: AtomicU64,
    pub router_traffic_in: AtomicU64,
    pub router_traffic_out: AtomicU64,
    pub switch_control_frames: AtomicU64,
    pub decrypt_failures: AtomicU64,
    pub binding_failures: AtomicU64,
    pub route_misses: AtomicU64,
    pub hop_limit_exceeded: AtomicU64,
}

/// A point-in-time copy of [`DispatcherStats`], for logging/metrics
/// exporters that want a plain value rather than atomics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    pub frames_from_switch: u64,
    pub frames_to_switch: u64,
    pub frames_for_me: u64,
    pub frames_from_tun: u64,
    pub frames_to_tun: u64,
    pub router_traffic_in: u64,
    pub router_traffic_out: u64,
    pub switch_control_frames: u64,
    pub decrypt_failures: u64,
    pub binding_failures: u64,
    pub route_misses: u64,
    pub hop_limit_exceeded: u64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_from_switch: self.frames_from_switch.load(Ordering::Relaxed),
            frames_to_switch: self.frames_to_switch.load(Ordering::Relaxed),
            frames_for_me: self.frames_for_me.load(Ordering::Relaxed),
            frames_from_tun: self.frames_from_tun.load(Ordering::Relaxed),
            frames_to_tun: self.frames_to_tun.load(Ordering::Relaxed),
            router_traffic_in: self.router_traffic_in.load(Ordering::Relaxed),
            router_traffic_out: self.router_traffic_out.load(Ordering::Relaxed),
            switch_control_frames: self.switch_control_frames.load(Ordering::Relaxed),
            decrypt_failures: self.decrypt_failures.load(Ordering::Relaxed),
            binding_failures: self.binding_failures.load(Ordering::Relaxed),
            route_misses: self.route_misses.load(Ordering::Relaxed),
            hop_limit_exceeded: self.hop_limit_exceeded.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Renders the snapshot as JSON, for the same kind of status-endpoint
    /// embedders of this crate have historically exposed.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The node's collaborators and registries, shared (via `Arc`) between
/// the [`crate::dispatcher::Dispatcher`] and anything else that needs to
/// originate traffic (e.g. a router module calling back in).
pub struct Context {
    pub our_address: Address,
    pub switch: Arc<dyn SwitchInterface>,
    pub tunnel: Arc<dyn TunnelInterface>,
    pub router: Arc<dyn RouterModule>,
    pub content_sessions: Arc<dyn SessionManager>,
    pub outer_sessions: OuterSessionRegistry,
    pub stats: DispatcherStats,
    pub router_traffic_initial_hop_limit: u8,
}

impl Context {
    pub fn new(
        our_address: Address,
        crypto_auth: Arc<dyn CryptoAuth>,
        switch: Arc<dyn SwitchInterface>,
        tunnel: Arc<dyn TunnelInterface>,
        router: Arc<dyn RouterModule>,
        content_sessions: Arc<dyn SessionManager>,
        config: DispatcherConfig,
    ) -> Self {
        Context {
            our_address,
            switch,
            tunnel,
            router,
            content_sessions,
            outer_sessions: OuterSessionRegistry::new(
                crypto_auth,
                config.max_outer_sessions,
                config.outer_session_idle_timeout,
            ),
            stats: DispatcherStats::default(),
            router_traffic_initial_hop_limit: config.router_traffic_initial_hop_limit,
        }
    }
}
