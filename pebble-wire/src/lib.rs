//! The field kernel: deterministic encode/decode of Pebble Protocol packets
//! against their schema.
//!
//! `pebble-wire` is the lowest layer of `pebble-protocol` — it knows nothing
//! about endpoints, transports, or connections, only how to turn one
//! packet's fields into bytes and back. [`Reader`]/[`Writer`] are the
//! primitive cursor types every packet's hand-written (or
//! [`WireEnum`]-derived) codec is built from.

mod bitfield;
mod endian;
mod error;
mod reader;
mod writer;

pub use bitfield::{BitReader, BitWriter};
pub use endian::Endian;
pub use error::{WireEncodeError, WireError};
pub use pebble_wire_derive::WireEnum;
pub use reader::Reader;
pub use writer::Writer;

/// A fixed-width integer enum that can appear as a field, a bitfield, or a
/// union tag. Implemented by [`macro@WireEnum`] for the common case of a
/// fieldless `#[repr(uN)]` enum; implemented by hand for enums with
/// non-contiguous or externally-fixed discriminants.
pub trait WireEnum: Sized + Copy {
    /// The backing integer type this enum is read from / written to.
    type Repr: Copy;

    /// Name used in [`WireError::InvalidEnum`] diagnostics.
    const NAME: &'static str;

    fn to_repr(&self) -> Self::Repr;
    fn from_repr(raw: Self::Repr) -> Option<Self>;
}

/// A packet: an ordered sequence of fields that can be serialized to, and
/// parsed from, a byte buffer under a declared default endianness.
pub trait Packet: Sized {
    /// Endianness this packet's fields resolve to unless a field overrides
    /// it locally. Big-endian unless the packet declares itself `<`.
    const DEFAULT_ENDIAN: Endian;

    fn encode(&self, w: &mut Writer);

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError>;

    /// Convenience: encode into a freshly allocated buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode(&mut w);
        w.into_vec()
    }

    /// Convenience: decode a whole buffer, erroring if trailing bytes remain
    /// are expected to have been consumed. Packets with trailing
    /// rest-of-buffer fields naturally consume everything.
    fn from_bytes(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(buf);
        Self::decode(&mut r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
    #[repr(u8)]
    enum Flavour {
        Sweet = 0,
        Sour = 1,
        Bitter = 3,
    }

    #[test]
    fn enum_round_trips_known_values() {
        for f in [Flavour::Sweet, Flavour::Sour, Flavour::Bitter] {
            let mut w = Writer::new();
            w.write_enum_u8(&f);
            let bytes = w.into_vec();

            let mut r = Reader::new(&bytes);
            let back: Flavour = r.read_enum_u8().unwrap();
            assert_eq!(back, f);
        }
    }

    #[test]
    fn enum_rejects_unknown_value() {
        let mut r = Reader::new(&[2]);
        let res: Result<Flavour, _> = r.read_enum_u8();
        assert_eq!(
            res,
            Err(WireError::InvalidEnum {
                name: "Flavour",
                value: 2
            })
        );
    }

    #[test]
    fn pascal_string_length_byte_excludes_uncounted_terminator() {
        let s = "a".repeat(255);
        let mut w = Writer::new();
        w.write_pascal_string(&s, true, false);
        let bytes = w.into_vec();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 1 + 255 + 1);

        let mut r = Reader::new(&bytes);
        let back = r.read_pascal_string(true, false).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn pascal_string_longer_than_255_bytes_is_truncated_not_rejected() {
        let s = "a".repeat(300);
        let mut w = Writer::new();
        w.write_pascal_string(&s, false, false);
        let bytes = w.into_vec();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 1 + 255);
    }

    #[test]
    fn null_terminated_pascal_string_truncates_to_254_when_terminator_counted() {
        let s = "a".repeat(300);
        let mut w = Writer::new();
        w.write_pascal_string(&s, true, true);
        let bytes = w.into_vec();
        // 254 content bytes + 1 counted NUL = 255, the encodable maximum.
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 1 + 254 + 1);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn incomplete_buffer_does_not_panic() {
        let mut r = Reader::new(&[0x00]);
        assert_eq!(r.read_u16(Endian::Big), Err(WireError::UnexpectedEof));
    }
}
