//! Node registration: wires collaborators and configuration into a
//! running [`crate::dispatcher::Dispatcher`] (§6, §10.5).

use std::fmt;
use std::sync::Arc;

use crate::address::{Address, AddressError};
use crate::context::{Context, DispatcherConfig};
use crate::content_session::SessionManager;
use crate::dispatcher::Dispatcher;
use crate::outer_session::CryptoAuth;
use crate::router::RouterModule;
use crate::switch::SwitchInterface;
use crate::tunnel::TunnelInterface;

/// Everything [`register`] needs to bring a node's dispatcher up.
pub struct RegisterArgs {
    pub public_key: [u8; 32],
    pub network_address: u64,
    pub crypto_auth: Arc<dyn CryptoAuth>,
    pub switch: Arc<dyn SwitchInterface>,
    pub tunnel: Arc<dyn TunnelInterface>,
    pub router: Arc<dyn RouterModule>,
    pub content_sessions: Arc<dyn SessionManager>,
    pub config: DispatcherConfig,
}

/// Why [`register`] refused to bring a node up.
#[derive(Debug)]
pub enum RegisterError {
    InvalidIdentity(AddressError),
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::InvalidIdentity(_) => "node identity failed to validate".fmt(f),
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegisterError::InvalidIdentity(err) => Some(err),
        }
    }
}

/// Derives this node's own [`Address`] from its public key and builds a
/// [`Dispatcher`] ready to drive the six boundary-crossing entry points.
pub fn register(args: RegisterArgs) -> Result<Arc<Dispatcher>, RegisterError> {
    let our_address = Address::from_authenticated_key(args.public_key, args.network_address)
        .map_err(RegisterError::InvalidIdentity)?;

    tracing::info!(ip6 = ?our_address.ip6, "registering node dispatcher");

    let ctx = Context::new(
        our_address,
        args.crypto_auth,
        args.switch,
        args.tunnel,
        args.router,
        args.content_sessions,
        args.config,
    );

    Ok(crate::dispatcher::new_dispatcher(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_session::KeyedSessionManager;
    use crate::crypto::CryptoConfig;
    use crate::outer_session::OuterSession;
    use crate::router::test_support::RecordingRouter;
    use crate::tunnel::test_support::RecordingTunnel;

    struct NullSession;
    impl OuterSession for NullSession {
        fn decrypt(&self, _frame: &mut crate::frame::Frame) -> crate::Result<()> {
            Ok(())
        }
        fn encrypt(&self, _frame: &mut crate::frame::Frame) -> crate::Result<()> {
            Ok(())
        }
        fn peer_public_key(&self) -> Option<[u8; 32]> {
            None
        }
        fn state(&self) -> crate::outer_session::SessionState {
            crate::outer_session::SessionState::Negotiating
        }
    }

    struct NullCryptoAuth;
    impl CryptoAuth for NullCryptoAuth {
        fn our_public_key(&self) -> [u8; 32] {
            [0u8; 32]
        }
        fn wrap(&self, _peer_key: Option<[u8; 32]>) -> Arc<dyn OuterSession> {
            Arc::new(NullSession)
        }
    }

    struct NullSwitch;
    impl SwitchInterface for NullSwitch {
        fn send_message(&self, _frame: crate::frame::Frame) -> crate::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn register_rejects_all_zero_key() {
        let args = RegisterArgs {
            public_key: [0u8; 32],
            network_address: 0,
            crypto_auth: Arc::new(NullCryptoAuth),
            switch: Arc::new(NullSwitch),
            tunnel: Arc::new(RecordingTunnel::default()),
            router: Arc::new(RecordingRouter::default()),
            content_sessions: Arc::new(KeyedSessionManager::new(CryptoConfig::Plain)),
            config: DispatcherConfig::default(),
        };
        assert!(matches!(register(args), Err(RegisterError::InvalidIdentity(_))));
    }

    #[test]
    fn register_succeeds_for_valid_key() {
        let args = RegisterArgs {
            public_key: [42u8; 32],
            network_address: 7,
            crypto_auth: Arc::new(NullCryptoAuth),
            switch: Arc::new(NullSwitch),
            tunnel: Arc::new(RecordingTunnel::default()),
            router: Arc::new(RecordingRouter::default()),
            content_sessions: Arc::new(KeyedSessionManager::new(CryptoConfig::Plain)),
            config: DispatcherConfig::default(),
        };
        let dispatcher = register(args).unwrap();
        assert_eq!(dispatcher.stats().frames_from_switch, 0);
    }
}
