//! On-disk node configuration (§10.3): cipher choice for the content
//! layer and the registry tuning knobs, loaded from TOML the way this
//! codebase's binaries have always configured themselves.

use anyhow::Context;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::context::DispatcherConfig;
use crate::crypto::CryptoConfig;

/// Top-level node configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Base64-encoded 32-byte static public key identifying this node.
    pub public_key: String,
    /// Cipher used for the content (inner) crypto layer.
    pub content_cipher: CryptoConfig,
    #[serde(default = "default_max_outer_sessions")]
    pub max_outer_sessions: usize,
    #[serde(default = "default_outer_session_idle_timeout_secs")]
    pub outer_session_idle_timeout_secs: u64,
    /// See [`crate::context::DispatcherConfig::router_traffic_initial_hop_limit`].
    #[serde(default = "default_router_traffic_initial_hop_limit")]
    pub router_traffic_initial_hop_limit: u8,
}

fn default_max_outer_sessions() -> usize {
    crate::context::DEFAULT_CONFIG.max_outer_sessions
}

fn default_outer_session_idle_timeout_secs() -> u64 {
    crate::context::DEFAULT_CONFIG.outer_session_idle_timeout.as_secs()
}

fn default_router_traffic_initial_hop_limit() -> u8 {
    crate::context::DEFAULT_CONFIG.router_traffic_initial_hop_limit
}

pub fn load(path: &str) -> anyhow::Result<NodeConfig> {
    let content = fs::read_to_string(path)?;
    let config: NodeConfig = toml::from_str(&content)?;
    Ok(config)
}

impl NodeConfig {
    /// Decodes [`public_key`](Self::public_key) into raw bytes.
    pub fn public_key_bytes(&self) -> anyhow::Result<[u8; 32]> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&self.public_key)
            .context("public_key is not valid base64")?;
        decoded
            .try_into()
            .map_err(|v: Vec<u8>| anyhow::anyhow!("public_key decodes to {} bytes, expected 32", v.len()))
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            max_outer_sessions: self.max_outer_sessions,
            outer_session_idle_timeout: Duration::from_secs(self.outer_session_idle_timeout_secs),
            router_traffic_initial_hop_limit: self.router_traffic_initial_hop_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let key = base64::engine::general_purpose::STANDARD.encode([0x2a; 32]);
        let toml = format!(
            r#"
            public_key = "{key}"

            [content_cipher]
            chacha20poly1305 = "secret"
            "#
        );
        let cfg: NodeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(cfg.max_outer_sessions, DispatcherConfig::default().max_outer_sessions);
        assert_eq!(cfg.public_key_bytes().unwrap(), [0x2a; 32]);
    }

    #[test]
    fn rejects_invalid_base64() {
        let cfg = NodeConfig {
            public_key: "not base64!!".to_string(),
            content_cipher: CryptoConfig::Plain,
            max_outer_sessions: 1,
            outer_session_idle_timeout_secs: 1,
            router_traffic_initial_hop_limit: 0,
        };
        assert!(cfg.public_key_bytes().is_err());
    }
}
