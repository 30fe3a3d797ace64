//! The content (inner) crypto layer, keyed by remote overlay IPv6 rather
//! than by switch label (§4.3): a peer's path through the switch fabric
//! can change without disturbing its end-to-end session.

use crate::Result;

/// The inner, content-layer session manager (§6 `SessionManager`). A
/// concrete implementation owns per-peer keys negotiated out of band
/// (e.g. piggybacked on the outer handshake) and this crate only drives
/// encrypt/decrypt by remote address.
pub trait SessionManager: Send + Sync {
    /// Pins a session key for `remote_ip6`, replacing any prior key.
    fn set_key(&self, remote_ip6: [u8; 16], key: [u8; 32]);

    /// Encrypts `plaintext` for `remote_ip6`. Fails if no key is pinned.
    fn encrypt_for(&self, remote_ip6: &[u8; 16], plaintext: &mut Vec<u8>) -> Result<()>;

    /// Decrypts `ciphertext` from `remote_ip6`. Fails if no key is pinned.
    fn decrypt_from(&self, remote_ip6: &[u8; 16], ciphertext: &mut Vec<u8>) -> Result<()>;

    fn has_key(&self, remote_ip6: &[u8; 16]) -> bool;
}

/// An in-memory [`SessionManager`] backed by [`crate::crypto::Block`]
/// ciphers, one per peer, for tests and simple embedders that don't need
/// a real out-of-band key exchange.
pub struct KeyedSessionManager {
    keys: std::sync::RwLock<std::collections::HashMap<[u8; 16], [u8; 32]>>,
    cipher_config: crate::crypto::CryptoConfig,
}

impl KeyedSessionManager {
    pub fn new(cipher_config: crate::crypto::CryptoConfig) -> Self {
        KeyedSessionManager {
            keys: std::sync::RwLock::new(std::collections::HashMap::new()),
            cipher_config,
        }
    }

    fn block_for(&self, remote_ip6: &[u8; 16]) -> Result<Box<dyn crate::crypto::Block>> {
        let guard = self.keys.read().unwrap_or_else(|e| e.into_inner());
        let key = guard
            .get(remote_ip6)
            .ok_or_else(|| -> crate::Error { "no content session key for peer".into() })?;
        Ok(match &self.cipher_config {
            crate::crypto::CryptoConfig::Aes256(_) => {
                Box::new(crate::crypto::aes256::Aes256Block::new(key))
            }
            crate::crypto::CryptoConfig::ChaCha20Poly1305(_) => {
                Box::new(crate::crypto::chacha20::ChaCha20Poly1305Block::new(key))
            }
            crate::crypto::CryptoConfig::Xor(_) => Box::new(crate::crypto::xor::XorBlock::new(key)),
            crate::crypto::CryptoConfig::Plain => Box::new(crate::crypto::plain::PlainBlock::new()),
        })
    }
}

impl SessionManager for KeyedSessionManager {
    fn set_key(&self, remote_ip6: [u8; 16], key: [u8; 32]) {
        self.keys.write().unwrap_or_else(|e| e.into_inner()).insert(remote_ip6, key);
    }

    fn encrypt_for(&self, remote_ip6: &[u8; 16], plaintext: &mut Vec<u8>) -> Result<()> {
        self.block_for(remote_ip6)?.encrypt(plaintext)
    }

    fn decrypt_from(&self, remote_ip6: &[u8; 16], ciphertext: &mut Vec<u8>) -> Result<()> {
        self.block_for(remote_ip6)?.decrypt(ciphertext)
    }

    fn has_key(&self, remote_ip6: &[u8; 16]) -> bool {
        self.keys.read().unwrap_or_else(|e| e.into_inner()).contains_key(remote_ip6)
    }
}
