//! The small, typed outcome surfaced back across the dispatcher's
//! external boundaries (§7) — distinct from the internal-only errors
//! ([`crate::ipv6::Ipv6Error`], [`crate::frame::ShiftOutOfBounds`], ...)
//! that get logged and dropped without ever reaching a caller.

use std::fmt;

/// Why a boundary-crossing call ([`crate::dispatcher::Dispatcher::ip6_from_tun`],
/// [`crate::dispatcher::Dispatcher::send_router_message`]) could not be
/// completed. Most per-frame failures deeper in the dispatch chain are
/// recovered locally (logged, frame dropped, `Ok(())` returned) per §7's
/// policy; this type is only for the subset of failures a caller
/// actually needs to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The frame itself was malformed or failed a binding check.
    Invalid,
    /// The frame was well-formed but could not be delivered (no route,
    /// hop-limit exhausted, no tunnel configured).
    Undeliverable,
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Invalid => "frame is invalid".fmt(f),
            DispatchOutcome::Undeliverable => "frame is undeliverable".fmt(f),
        }
    }
}

impl std::error::Error for DispatchOutcome {}
