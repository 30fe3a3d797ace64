//! The 40-byte IPv6 header this overlay tunnels over, and the minimal
//! UDP header used to carry in-band routing-module traffic (§3, §4.4).

use crate::address::ADDRESS_PREFIX_BYTE;
use crate::frame::Frame;

pub const IPV6_HEADER_LEN: usize = 40;
pub const UDP_HEADER_LEN: usize = 8;

pub const NEXT_HEADER_UDP: u8 = 17;

/// A parsed IPv6 header. Only the fields the dispatcher actually reads
/// or mutates are modelled; everything else (flow label, traffic class)
/// is preserved opaquely in the raw bytes the header was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Header {
    pub payload_length: u16,
    pub next_header: u8,
    pub hop_limit: u8,
    pub source: [u8; 16],
    pub destination: [u8; 16],
}

/// Why a candidate IPv6 header was rejected (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv6Error {
    TooShort,
    PayloadLengthMismatch,
    SourceNotInOverlayRange,
    DestinationNotInOverlayRange,
}

impl std::fmt::Display for Ipv6Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ipv6Error::TooShort => "frame too short for an ipv6 header".fmt(f),
            Ipv6Error::PayloadLengthMismatch => "ipv6 payload-length field does not match frame length".fmt(f),
            Ipv6Error::SourceNotInOverlayRange => "ipv6 source address is not in fc00::/8".fmt(f),
            Ipv6Error::DestinationNotInOverlayRange => "ipv6 destination address is not in fc00::/8".fmt(f),
        }
    }
}

impl std::error::Error for Ipv6Error {}

impl Ipv6Header {
    /// Parses and validates the header at the front of `frame` without
    /// consuming it (the dispatcher decides separately when to shift
    /// past the header, since some paths re-read it multiple times).
    ///
    /// Enforces the binding-check invariants from §4.4 that don't depend
    /// on a public key: both addresses begin with `0xfc`, and
    /// payload-length equals `frame.len() - 40`.
    pub fn parse(frame: &Frame) -> Result<Self, Ipv6Error> {
        let bytes = frame.bytes();
        if bytes.len() < IPV6_HEADER_LEN {
            return Err(Ipv6Error::TooShort);
        }
        let payload_length = u16::from_be_bytes([bytes[4], bytes[5]]);
        let next_header = bytes[6];
        let hop_limit = bytes[7];
        let mut source = [0u8; 16];
        source.copy_from_slice(&bytes[8..24]);
        let mut destination = [0u8; 16];
        destination.copy_from_slice(&bytes[24..40]);

        if source[0] != ADDRESS_PREFIX_BYTE {
            return Err(Ipv6Error::SourceNotInOverlayRange);
        }
        if destination[0] != ADDRESS_PREFIX_BYTE {
            return Err(Ipv6Error::DestinationNotInOverlayRange);
        }
        if payload_length as usize != bytes.len() - IPV6_HEADER_LEN {
            return Err(Ipv6Error::PayloadLengthMismatch);
        }

        Ok(Ipv6Header {
            payload_length,
            next_header,
            hop_limit,
            source,
            destination,
        })
    }

    /// Serialises this header, overwriting only the fields this crate
    /// models; version/traffic-class/flow-label are written as zero
    /// since the core never needs to preserve them across a hop (the
    /// header is reconstructed fresh on every prepend).
    pub fn encode(&self) -> [u8; IPV6_HEADER_LEN] {
        let mut buf = [0u8; IPV6_HEADER_LEN];
        buf[0] = 0x60; // version 6, traffic class/flow label high nibble zero
        buf[4..6].copy_from_slice(&self.payload_length.to_be_bytes());
        buf[6] = self.next_header;
        buf[7] = self.hop_limit;
        buf[8..24].copy_from_slice(&self.source);
        buf[24..40].copy_from_slice(&self.destination);
        buf
    }

    /// Prepends this header's wire encoding to `frame`.
    pub fn prepend_to(&self, frame: &mut Frame) -> Result<(), crate::frame::ShiftOutOfBounds> {
        frame.prepend(&self.encode())
    }

    pub fn is_for(&self, our_ip6: &[u8; 16]) -> bool {
        self.destination == *our_ip6
    }
}

/// The zero-ported UDP header used to carry routing-module traffic
/// end-to-end inside the inner crypto layer (§4.1 router-traffic
/// predicate). Checksum is not validated, matching the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub length: u16,
}

impl UdpHeader {
    pub fn zero_ported(length: u16) -> Self {
        UdpHeader { length }
    }

    pub fn encode(&self) -> [u8; UDP_HEADER_LEN] {
        let mut buf = [0u8; UDP_HEADER_LEN];
        buf[4..6].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    pub fn prepend_to(&self, frame: &mut Frame) -> Result<(), crate::frame::ShiftOutOfBounds> {
        frame.prepend(&self.encode())
    }

    /// Parses a UDP header off the front of `bytes`, requiring both ports
    /// to be zero (the router-traffic marker).
    pub fn parse_zero_ported(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < UDP_HEADER_LEN {
            return None;
        }
        let src_port = u16::from_be_bytes([bytes[0], bytes[1]]);
        let dst_port = u16::from_be_bytes([bytes[2], bytes[3]]);
        if src_port != 0 || dst_port != 0 {
            return None;
        }
        let length = u16::from_be_bytes([bytes[4], bytes[5]]);
        Some(UdpHeader { length })
    }
}

/// The router-traffic predicate (§4.1): a frame is in-band routing-module
/// traffic iff its IPv6 header has `next_header == UDP` and `hop_limit ==
/// 0`, and the UDP header that follows has both ports zero with a length
/// field matching the remaining payload.
pub fn is_router_traffic(ip6: &Ipv6Header, payload_after_ip6: &[u8]) -> bool {
    if ip6.next_header != NEXT_HEADER_UDP || ip6.hop_limit != 0 {
        return false;
    }
    match UdpHeader::parse_zero_ported(payload_after_ip6) {
        Some(udp) => udp.length as usize == payload_after_ip6.len() - UDP_HEADER_LEN,
        None => false,
    }
}
