//! The `length || endpoint || payload` reassembly state machine.
//!
//! Serial and PULSE transports hand back arbitrary byte runs — not
//! necessarily one whole frame, and possibly several glued together — so
//! something has to turn that stream back into discrete frames before the
//! registry ever sees a payload. This is that something, grounded on
//! `ethercrab`'s PDU response parser: accumulate into a buffer, try to peel
//! one frame off the front, and loop until the buffer stops yielding
//! anything.

use pebble_wire::WireError;

const HEADER_LEN: usize = 4;

/// One fully-framed message pulled off the wire: its endpoint id and the
/// payload bytes that followed it (header not included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub endpoint: u16,
    pub payload: Vec<u8>,
}

/// Accumulates raw transport bytes and yields complete frames as they
/// become available. Not `Send`-constrained on its own; callers hold one
/// per `Connection`.
#[derive(Default)]
pub struct Reassembler {
    buf: Vec<u8>,
}

/// What [`Reassembler::poll`] found at the front of the buffer.
enum Peek {
    /// Not enough bytes buffered yet for even the length header.
    NeedMore,
    /// A zero-length frame: `length == 0`. Spec §4.2 has this surfaced once
    /// and then ends the decode loop for that read, to avoid spinning if a
    /// peer keeps emitting them.
    ZeroLength(usize),
    /// A complete frame, plus how many bytes of `buf` it occupied.
    Frame(Frame, usize),
}

/// One [`Reassembler::poll`] outcome.
pub enum Polled {
    /// Not enough bytes yet; caller should stop and wait for more.
    NeedMore,
    /// A frame, with `endpoint` and `payload` (possibly a zero-length
    /// terminator, `payload` empty). `terminator` is set when this was a
    /// declared-length-0 frame: the decode loop for this read must stop
    /// after it, even if more bytes remain buffered.
    Frame { frame: Frame, terminator: bool },
}

impl Reassembler {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Appends newly-read bytes to the internal buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn peek(&self) -> Peek {
        if self.buf.len() < HEADER_LEN {
            return Peek::NeedMore;
        }
        let length = u16::from_be_bytes([self.buf[0], self.buf[1]]) as usize;
        let endpoint = u16::from_be_bytes([self.buf[2], self.buf[3]]);
        let total = HEADER_LEN + length;
        if self.buf.len() < total {
            return Peek::NeedMore;
        }
        if length == 0 {
            return Peek::ZeroLength(total);
        }
        let payload = self.buf[HEADER_LEN..total].to_vec();
        Peek::Frame(Frame { endpoint, payload }, total)
    }

    /// Pulls the next complete frame out of the buffer, if any. Returns
    /// `Ok(Polled::NeedMore)` when more bytes are needed before another
    /// frame is available — not an error, just "keep reading". A
    /// zero-length frame (spec §4.2) is consumed and returned with an empty
    /// payload and `terminator: true`: it is emitted once, and the caller
    /// must stop draining for this read even if bytes remain buffered,
    /// rather than spin on it.
    pub fn poll(&mut self) -> Result<Polled, WireError> {
        match self.peek() {
            Peek::NeedMore => Ok(Polled::NeedMore),
            Peek::ZeroLength(consumed) => {
                let endpoint = u16::from_be_bytes([self.buf[2], self.buf[3]]);
                self.buf.drain(0..consumed);
                Ok(Polled::Frame {
                    frame: Frame { endpoint, payload: Vec::new() },
                    terminator: true,
                })
            }
            Peek::Frame(frame, consumed) => {
                self.buf.drain(0..consumed);
                Ok(Polled::Frame { frame, terminator: false })
            }
        }
    }

    /// Drains complete frames currently buffered, stopping after a
    /// zero-length terminator frame (spec §4.2) even if bytes remain.
    pub fn drain_frames(&mut self) -> Result<Vec<Frame>, WireError> {
        let mut frames = Vec::new();
        loop {
            match self.poll()? {
                Polled::NeedMore => return Ok(frames),
                Polled::Frame { frame, terminator } => {
                    frames.push(frame);
                    if terminator {
                        return Ok(frames);
                    }
                }
            }
        }
    }
}

/// Encodes `endpoint`/`payload` into one wire frame, header included.
pub fn frame(endpoint: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(&endpoint.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_frame_yields_nothing_until_complete() {
        let mut r = Reassembler::new();
        let whole = frame(0x000b, b"hello");
        r.feed(&whole[..3]);
        assert!(matches!(r.poll().unwrap(), Polled::NeedMore));
        r.feed(&whole[3..]);
        match r.poll().unwrap() {
            Polled::Frame { frame, terminator } => {
                assert!(!terminator);
                assert_eq!(frame.endpoint, 0x000b);
                assert_eq!(frame.payload, b"hello");
            }
            Polled::NeedMore => panic!("expected a frame"),
        }
    }

    #[test]
    fn byte_by_byte_feed_eventually_yields_the_frame() {
        let mut r = Reassembler::new();
        let whole = frame(0x0010, b"abc");
        for (i, byte) in whole.iter().enumerate() {
            r.feed(std::slice::from_ref(byte));
            match r.poll().unwrap() {
                Polled::NeedMore => assert!(i + 1 < whole.len()),
                Polled::Frame { frame, .. } => {
                    assert_eq!(i + 1, whole.len());
                    assert_eq!(frame.endpoint, 0x0010);
                    assert_eq!(frame.payload, b"abc");
                }
            }
        }
    }

    #[test]
    fn two_glued_frames_both_come_out_in_order() {
        let mut r = Reassembler::new();
        let mut both = frame(0x0011, b"one");
        both.extend_from_slice(&frame(0x0012, b"two"));
        r.feed(&both);
        let frames = r.drain_frames().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].endpoint, 0x0011);
        assert_eq!(frames[0].payload, b"one");
        assert_eq!(frames[1].endpoint, 0x0012);
        assert_eq!(frames[1].payload, b"two");
    }

    #[test]
    fn zero_length_frame_is_emitted_once_and_ends_the_read() {
        let mut r = Reassembler::new();
        r.feed(&[0, 0, 0x07, 0x70]);
        r.feed(&frame(0x0011, b"x"));
        // The zero-length frame is surfaced (endpoint 0x0770, empty
        // payload) and the drain stops there, leaving the second frame
        // buffered for the next read rather than decoding it in this pass.
        let frames = r.drain_frames().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].endpoint, 0x0770);
        assert!(frames[0].payload.is_empty());

        let frames = r.drain_frames().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].endpoint, 0x0011);
        assert_eq!(frames[0].payload, b"x");
    }

    #[test]
    fn empty_buffer_needs_more() {
        let mut r = Reassembler::new();
        assert!(matches!(r.poll().unwrap(), Polled::NeedMore));
    }
}
