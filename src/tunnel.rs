//! The local tunnel-device collaborator (§4.6, §6): delivery of plaintext
//! IPv6 packets to and from the host's network stack. The device itself
//! (opening a TUN interface, routing table plumbing) is out of scope
//! (§1); this crate only needs somewhere to hand decoded packets to and
//! pull encoded ones from.

use crate::Result;
use crate::frame::Frame;

/// The local tunnel device, as seen from the core.
pub trait TunnelInterface: Send + Sync {
    /// Delivers a fully-decrypted IPv6 packet addressed to this node to
    /// the host network stack.
    fn deliver(&self, frame: Frame) -> Result<()>;
}
