//! The shared byte buffer every dispatch entry point operates on.
//!
//! Header layering is done by shifting a logical window over one buffer,
//! never by copying into a new one: "the frame is aligned on the
//! beginning of X" means `frame.bytes()` starts exactly at header X.
//! Reserved head padding absorbs the worst case of switch + IPv6 +
//! outer-crypto + inner-crypto + UDP headers being prepended one after
//! another as a frame travels from the tunnel out to the switch.

/// Head padding large enough for switch header + IPv6 header + UDP header
/// + generous crypto-layer overhead on both the outer and inner sessions.
/// Mirrors the slack the 16 KiB per-message scratch arena (§6) provides.
pub const HEAD_ROOM: usize = 512;

/// A mutable byte buffer with a movable window and reserved head/tail
/// padding, used as scratch memory for exactly one dispatch call.
#[derive(Debug, Clone)]
pub struct Frame {
    storage: Vec<u8>,
    start: usize,
    len: usize,
}

/// A [`Frame::shift`] asked to move the window somewhere that would run
/// off the front or back of the underlying storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOutOfBounds {
    pub requested: isize,
    pub available_head: usize,
    pub available_tail: usize,
}

impl std::fmt::Display for ShiftOutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "shift({}) out of bounds (head room {}, tail room {})",
            self.requested, self.available_head, self.available_tail
        )
    }
}

impl std::error::Error for ShiftOutOfBounds {}

impl Frame {
    /// Wraps `payload` as a frame whose window starts after `HEAD_ROOM`
    /// bytes of reserved head padding, ready for headers to be prepended.
    pub fn from_payload(payload: &[u8]) -> Self {
        Self::with_head_room(payload, HEAD_ROOM)
    }

    /// Like [`from_payload`](Self::from_payload) with an explicit amount
    /// of head room, for callers (tests, `handle_outgoing`) that need
    /// more or less than the default.
    pub fn with_head_room(payload: &[u8], head_room: usize) -> Self {
        let mut storage = vec![0u8; head_room + payload.len()];
        storage[head_room..].copy_from_slice(payload);
        Frame {
            storage,
            start: head_room,
            len: payload.len(),
        }
    }

    /// Wraps an already-framed buffer (e.g. a datagram straight off the
    /// switch interface) with no head room: the window covers the whole
    /// buffer and any further `shift(-n)` will fail until storage grows.
    ///
    /// Collaborators that deliver data to us (switch, tunnel) are
    /// expected to give us buffers with slack already reserved the way
    /// `with_head_room` does; this constructor exists for tests that
    /// assert exact boundary behaviour.
    pub fn exact(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Frame {
            storage: bytes,
            start: 0,
            len,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        let end = self.start + self.len;
        &mut self.storage[self.start..end]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Moves the window by `delta`: negative grows the window backward
    /// (exposing previously-hidden head bytes, e.g. to prepend a header
    /// that was already written into the padding), positive shrinks it
    /// forward (stripping a header that has been consumed).
    ///
    /// A negative shift does not zero the newly-exposed bytes; callers
    /// write the header into them immediately afterward (see
    /// [`prepend`](Self::prepend)).
    pub fn shift(&mut self, delta: isize) -> Result<(), ShiftOutOfBounds> {
        if delta < 0 {
            let grow = (-delta) as usize;
            if grow > self.start {
                return Err(ShiftOutOfBounds {
                    requested: delta,
                    available_head: self.start,
                    available_tail: self.storage.len() - self.start - self.len,
                });
            }
            self.start -= grow;
            self.len += grow;
        } else {
            let shrink = delta as usize;
            if shrink > self.len {
                return Err(ShiftOutOfBounds {
                    requested: delta,
                    available_head: self.start,
                    available_tail: self.storage.len() - self.start - self.len,
                });
            }
            self.start += shrink;
            self.len -= shrink;
        }
        Ok(())
    }

    /// Shifts backward by `header.len()` and copies `header` into the
    /// newly-exposed space in one step — the common "prepend a header"
    /// operation used throughout the dispatcher.
    pub fn prepend(&mut self, header: &[u8]) -> Result<(), ShiftOutOfBounds> {
        self.shift(-(header.len() as isize))?;
        self.bytes_mut()[..header.len()].copy_from_slice(header);
        Ok(())
    }

    /// Strips `n` bytes from the front of the window and returns them,
    /// shifting the window forward past them.
    pub fn strip_front(&mut self, n: usize) -> Result<Vec<u8>, ShiftOutOfBounds> {
        if n > self.len {
            return Err(ShiftOutOfBounds {
                requested: n as isize,
                available_head: self.start,
                available_tail: self.storage.len() - self.start - self.len,
            });
        }
        let taken = self.bytes()[..n].to_vec();
        self.shift(n as isize)?;
        Ok(taken)
    }

    /// Replaces the window's contents with `payload`, keeping the window
    /// position but resizing it — used when a crypto layer replaces
    /// plaintext with ciphertext of a different length (or vice versa)
    /// in place.
    pub fn set_payload(&mut self, payload: &[u8]) {
        let end = self.start + self.len;
        self.storage.splice(self.start..end, payload.iter().copied());
        self.len = payload.len();
    }
}
