//! Peer identity: public key, derived IPv6 address, and switch label.
//!
//! The IPv6 address of every peer on this overlay is not assigned by any
//! authority; it is a one-way function of that peer's public key. This
//! binds identity to address cryptographically and is the single most
//! important invariant in this crate (see [`Address::prefix_of`]).

use sha2::{Digest, Sha512};
use std::fmt;

/// The only valid top-level IPv6 range for this overlay: `fc00::/8`.
pub const ADDRESS_PREFIX_BYTE: u8 = 0xfc;

/// A peer identity: public key, the IPv6 address derived from it, and the
/// switch-fabric label currently used to reach it.
///
/// Constructed once per peer (on first observation) and immutable after
/// that — the label may go stale if the peer moves in the switch fabric,
/// but that is handled by re-deriving a fresh `Address`, not mutating this
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub public_key: [u8; 32],
    pub ip6: [u8; 16],
    pub network_address: u64,
}

/// Why an `Address` failed to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    ZeroKey,
    PrefixMismatch,
    NotInOverlayRange,
}

impl std::error::Error for AddressError {}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::ZeroKey => "public key is all-zero".fmt(f),
            AddressError::PrefixMismatch => "ip6 does not equal prefix(public_key)".fmt(f),
            AddressError::NotInOverlayRange => "ip6 does not begin with 0xfc".fmt(f),
        }
    }
}

impl Address {
    /// Derives the 16-byte overlay address for a public key: the first 16
    /// bytes of `sha512(sha512(public_key))`, with the first byte forced
    /// to `0xfc`.
    ///
    /// Double-hashing and the leading-byte stamp mirror the strategy
    /// overlay public keys are customarily ground (a "vanity" search for
    /// a key whose derived address already starts with `0xfc`) against:
    /// the derivation is required to produce `0xfc` only for keys chosen
    /// to satisfy it, and any key that doesn't is simply not a valid
    /// identity on this network.
    pub fn prefix_of(public_key: &[u8; 32]) -> [u8; 16] {
        let first = Sha512::digest(public_key);
        let second = Sha512::digest(first);
        let mut ip6 = [0u8; 16];
        ip6.copy_from_slice(&second[..16]);
        ip6[0] = ADDRESS_PREFIX_BYTE;
        ip6
    }

    /// Builds an `Address` from an authenticated public key and the label
    /// it was reached at, validating the key/address binding.
    ///
    /// The `0xfc` stamp in [`prefix_of`](Self::prefix_of) means this can
    /// never fail on `NotInOverlayRange` for a key produced by
    /// `prefix_of` itself; this constructor exists for the case where the
    /// caller is validating a claimed `ip6` against a key it authenticated
    /// independently (the dispatcher's binding check, §4.4 of the spec).
    pub fn from_authenticated_key(
        public_key: [u8; 32],
        network_address: u64,
    ) -> Result<Self, AddressError> {
        if public_key == [0u8; 32] {
            return Err(AddressError::ZeroKey);
        }
        let ip6 = Self::prefix_of(&public_key);
        if ip6[0] != ADDRESS_PREFIX_BYTE {
            return Err(AddressError::NotInOverlayRange);
        }
        Ok(Address {
            public_key,
            ip6,
            network_address,
        })
    }

    /// Validates that `claimed_ip6` is in fact `prefix_of(public_key)`.
    ///
    /// This is the address/key binding check (spec §4.4): the sole gate
    /// that prevents a peer from claiming an IPv6 address it does not
    /// control the private key for.
    pub fn verify_binding(public_key: &[u8; 32], claimed_ip6: &[u8; 16]) -> Result<(), AddressError> {
        if *public_key == [0u8; 32] {
            return Err(AddressError::ZeroKey);
        }
        if claimed_ip6[0] != ADDRESS_PREFIX_BYTE {
            return Err(AddressError::NotInOverlayRange);
        }
        if Self::prefix_of(public_key) != *claimed_ip6 {
            return Err(AddressError::PrefixMismatch);
        }
        Ok(())
    }
}
