//! The switch-fabric header and the collaborator interface the core uses
//! to talk to it. Routing labels between peers is the switch's job, not
//! ours (§1, out of scope); we only need to read/write its header.

use crate::Result;
use crate::frame::Frame;

pub const SWITCH_HEADER_LEN: usize = 9;

/// Distinguishes data traffic (destined for the crypto layers) from
/// switch-fabric control traffic (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Data,
    Control,
}

impl MessageType {
    fn from_byte(b: u8) -> Self {
        if b & 0x01 != 0 { MessageType::Control } else { MessageType::Data }
    }

    fn to_byte(self) -> u8 {
        match self {
            MessageType::Data => 0,
            MessageType::Control => 1,
        }
    }
}

/// The fixed-size prefix every frame carries while inside the switch
/// fabric: an 8-byte label plus one byte of type bits.
///
/// The label arrives **bit-reversed** on ingress — an artifact of how the
/// switch fabric packs labels for its own routing decisions — and must be
/// un-reversed before the core uses it as a registry key or compares it
/// to anything. [`SwitchHeader::label`] already stores the label
/// un-reversed; [`encode`](Self::encode) re-reverses it for egress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchHeader {
    pub label: u64,
    pub message_type: MessageType,
}

impl SwitchHeader {
    /// Reverses the bit order of a 64-bit label. Applying this twice is
    /// the identity (§8 round-trip property).
    pub fn bit_reverse(label: u64) -> u64 {
        label.reverse_bits()
    }

    /// Parses a switch header off the front of `frame`, un-reversing the
    /// label, and advances the frame past it.
    pub fn decode(frame: &mut Frame) -> Result<Self> {
        if frame.len() < SWITCH_HEADER_LEN {
            return Err("frame too short for switch header".into());
        }
        let bytes = frame.bytes();
        let mut label_bytes = [0u8; 8];
        label_bytes.copy_from_slice(&bytes[0..8]);
        let wire_label = u64::from_be_bytes(label_bytes);
        let message_type = MessageType::from_byte(bytes[8]);
        frame.shift(SWITCH_HEADER_LEN as isize)?;
        Ok(SwitchHeader {
            label: Self::bit_reverse(wire_label),
            message_type,
        })
    }

    /// Serialises this header for the wire, re-reversing the label, and
    /// prepends it to `frame`.
    pub fn encode_into(&self, frame: &mut Frame) -> Result<()> {
        let mut buf = [0u8; SWITCH_HEADER_LEN];
        buf[0..8].copy_from_slice(&Self::bit_reverse(self.label).to_be_bytes());
        buf[8] = self.message_type.to_byte();
        frame.prepend(&buf)?;
        Ok(())
    }

    pub fn data(label: u64) -> Self {
        SwitchHeader { label, message_type: MessageType::Data }
    }

    pub fn control(label: u64) -> Self {
        SwitchHeader { label, message_type: MessageType::Control }
    }
}

/// Switch-fabric error reasons this core understands (§4.5). Other error
/// types are logged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchErrorType {
    MalformedAddress,
    Other(u8),
}

impl SwitchErrorType {
    fn from_byte(b: u8) -> Self {
        match b {
            1 => SwitchErrorType::MalformedAddress,
            other => SwitchErrorType::Other(other),
        }
    }
}

/// A parsed switch-layer control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFrame {
    Error { cause_label: u64, error_type: SwitchErrorType },
    Unknown,
}

impl ControlFrame {
    /// Parses the payload following a control-type [`SwitchHeader`]: an
    /// 8-byte cause label followed by a 1-byte error type, or anything
    /// else (logged and discarded by the caller).
    pub fn parse(payload: &[u8]) -> Self {
        if payload.len() < 9 {
            return ControlFrame::Unknown;
        }
        let mut cause_bytes = [0u8; 8];
        cause_bytes.copy_from_slice(&payload[0..8]);
        ControlFrame::Error {
            cause_label: u64::from_be_bytes(cause_bytes),
            error_type: SwitchErrorType::from_byte(payload[8]),
        }
    }
}

/// The switch fabric, as seen from the core (§6). The core registers
/// [`crate::dispatcher::Dispatcher::incoming_from_switch`] as this
/// interface's inbound handler and calls `send_message` to emit frames
/// outward; the fabric itself (routing labels between peers) is an
/// external collaborator.
pub trait SwitchInterface: Send + Sync {
    fn send_message(&self, frame: Frame) -> Result<()>;
}
