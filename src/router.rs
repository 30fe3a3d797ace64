//! The in-band routing module collaborator (§4.1, §6): DHT-style control
//! traffic distinguished from ordinary data by the router-traffic
//! predicate in [`crate::ipv6`] and handed off wholesale rather than
//! parsed here — the routing protocol itself is out of scope (§1).

use crate::Result;
use crate::address::Address;

/// A routing-module control message, opaque to this crate beyond the
/// sender it arrived from / the recipient it is destined to.
#[derive(Debug, Clone)]
pub struct DhtMessage {
    pub peer: Address,
    pub payload: Vec<u8>,
}

/// A route: the switch label to reach a peer, plus the public key the
/// router authenticated it under (needed to pin the outer session — the
/// dispatcher otherwise only ever learns a peer's key from an inbound
/// handshake, never from initiating one itself).
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub label: u64,
    pub peer_public_key: [u8; 32],
}

/// The routing/DHT module (§6 `RouterModule`). Supplies path lookups for
/// outgoing traffic and consumes router-traffic frames the dispatcher
/// peels off the inbound path.
pub trait RouterModule: Send + Sync {
    /// Best known route toward `destination_ip6`, if any.
    fn get_best(&self, destination_ip6: &[u8; 16]) -> Option<Route>;

    /// Informs the router a peer has been observed, in case it wants to
    /// add it to its routing table.
    fn add_node(&self, peer: Address, label: u64);

    /// Informs the router that `label` no longer reaches its peer (e.g.
    /// a switch-layer error control frame arrived referencing it).
    fn broken_path(&self, label: u64);

    /// Delivers an in-band routing message received from the network.
    fn handle_incoming(&self, message: DhtMessage) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::RwLock;

    #[derive(Default)]
    pub struct RecordingRouter {
        pub routes: RwLock<std::collections::HashMap<[u8; 16], Route>>,
        pub broken: RwLock<Vec<u64>>,
        pub received: RwLock<Vec<DhtMessage>>,
    }

    impl RouterModule for RecordingRouter {
        fn get_best(&self, destination_ip6: &[u8; 16]) -> Option<Route> {
            self.routes.read().unwrap().get(destination_ip6).copied()
        }

        fn add_node(&self, peer: Address, label: u64) {
            self.routes.write().unwrap().insert(peer.ip6, Route { label, peer_public_key: peer.public_key });
        }

        fn broken_path(&self, label: u64) {
            self.broken.write().unwrap().push(label);
        }

        fn handle_incoming(&self, message: DhtMessage) -> Result<()> {
            self.received.write().unwrap().push(message);
            Ok(())
        }
    }
}
