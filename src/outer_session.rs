//! The peer-to-peer (outer) CryptoAuth layer and the registry that maps
//! switch labels to sessions (§4.2, §6).
//!
//! The handshake protocol itself is an external collaborator (§1: "the
//! symmetric crypto primitive itself" is out of scope) — what lives here
//! is the *registry* plumbing the spec actually asks this crate to own,
//! plus a [`CryptoAuth`]/[`OuterSession`] trait pair a real handshake
//! implementation plugs into, and a test-only concrete implementation
//! (`tests/` fakes build on [`crate::crypto::Block`]) used to exercise
//! the dispatcher end-to-end.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::Result;
use crate::frame::Frame;

/// Lifecycle of an outer session (§4.6): `Negotiating` until the
/// handshake completes, then `Established` for the rest of its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Negotiating,
    Established,
}

/// A single peer-to-peer authenticated-encryption session, keyed by the
/// peer's public key. A concrete implementation owns whatever handshake
/// state it needs; this crate only needs to drive `decrypt`/`encrypt`
/// and read back the now-known peer key.
pub trait OuterSession: Send + Sync {
    /// Decrypts `frame` in place. On the first successful decryption
    /// from a previously-unpinned session, the implementation learns
    /// the peer's public key; it is available afterward via
    /// [`peer_public_key`](Self::peer_public_key).
    fn decrypt(&self, frame: &mut Frame) -> Result<()>;

    /// Encrypts `frame` in place for transmission to this session's peer.
    fn encrypt(&self, frame: &mut Frame) -> Result<()>;

    /// The peer's public key, once known (after the first successful
    /// handshake step in either direction). `None` before that.
    fn peer_public_key(&self) -> Option<[u8; 32]>;

    fn state(&self) -> SessionState;
}

/// Factory for outer sessions, given our private key (§6 `CryptoAuth`).
pub trait CryptoAuth: Send + Sync {
    fn our_public_key(&self) -> [u8; 32];

    /// Creates a session toward `peer_key` if known, or an unpinned
    /// session that will learn the peer's key during handshake.
    fn wrap(&self, peer_key: Option<[u8; 32]>) -> std::sync::Arc<dyn OuterSession>;
}

struct RegistryEntry {
    session: std::sync::Arc<dyn OuterSession>,
    last_used: Instant,
}

/// Maps switch label -> outer session (§4.2). At most one session per
/// label (invariant 5, §8); a bounded idle-eviction policy is layered on
/// top of the spec's bare registry to bound memory under an adversary
/// that floods unknown labels (§9 "Session eviction", §10.5).
pub struct OuterSessionRegistry {
    sessions: RwLock<HashMap<u64, RegistryEntry>>,
    crypto_auth: std::sync::Arc<dyn CryptoAuth>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl OuterSessionRegistry {
    pub fn new(crypto_auth: std::sync::Arc<dyn CryptoAuth>, max_sessions: usize, idle_timeout: Duration) -> Self {
        OuterSessionRegistry {
            sessions: RwLock::new(HashMap::new()),
            crypto_auth,
            max_sessions,
            idle_timeout,
        }
    }

    /// Returns the session for `label`, lazily creating one pinned to
    /// `peer_key` (or unpinned if `None`, learning the key during
    /// handshake) if absent.
    pub fn get(&self, label: u64, peer_key: Option<[u8; 32]>) -> std::sync::Arc<dyn OuterSession> {
        self.evict_idle();

        {
            let mut guard = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = guard.get_mut(&label) {
                entry.last_used = Instant::now();
                return entry.session.clone();
            }
            let session = self.crypto_auth.wrap(peer_key);
            guard.insert(
                label,
                RegistryEntry { session: session.clone(), last_used: Instant::now() },
            );
            if guard.len() > self.max_sessions {
                Self::evict_lru_locked(&mut guard);
            }
            session
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_idle(&self) {
        let mut guard = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let timeout = self.idle_timeout;
        guard.retain(|_, entry| now.duration_since(entry.last_used) < timeout);
    }

    fn evict_lru_locked(guard: &mut HashMap<u64, RegistryEntry>) {
        if let Some((&lru_label, _)) = guard.iter().min_by_key(|(_, entry)| entry.last_used) {
            tracing::debug!("outer session registry full, evicting label {:#x}", lru_label);
            guard.remove(&lru_label);
        }
    }
}
