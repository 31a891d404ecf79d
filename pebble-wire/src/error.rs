//! Field-kernel error types.
//!
//! These sit one level below the connection-facing [`crate::error::Error`] in
//! `pebble-protocol` (a separate, larger enum that also carries transport and
//! timeout errors). `WireError` only ever reports what a single field or
//! packet failed to do.

use core::fmt;

/// A field or packet could not be decoded from its byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended before every declared field could be read.
    UnexpectedEof,
    /// An enum's backing integer did not match any declared variant.
    InvalidEnum {
        /// Name of the enum type, for diagnostics.
        name: &'static str,
        /// The integer value on the wire, widened for display.
        value: i64,
    },
    /// A union's tag sibling did not match any declared variant, and the
    /// union is not marked to tolerate unknown tags.
    InvalidTag {
        /// The tag value on the wire, widened for display.
        value: i64,
    },
    /// A null-terminated string ran off the end of the buffer before a 0x00
    /// byte was found.
    UnterminatedString,
    /// Bytes were not valid UTF-8 where a string field required it.
    Utf8,
    /// A bitfield group's declared widths did not sum to its storage size.
    /// This is a schema error, not a data error, but it can only be detected
    /// once the group is actually assembled.
    BitfieldWidthMismatch {
        /// Sum of the group's declared bit widths.
        sum: u32,
        /// Width, in bits, of the storage integer.
        storage: u32,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "buffer ended before all fields were read"),
            Self::InvalidEnum { name, value } => {
                write!(f, "{value} is not a valid discriminant for {name}")
            }
            Self::InvalidTag { value } => write!(f, "{value} is not a recognised union tag"),
            Self::UnterminatedString => write!(f, "null-terminated string has no terminator"),
            Self::Utf8 => write!(f, "field is not valid UTF-8"),
            Self::BitfieldWidthMismatch { sum, storage } => write!(
                f,
                "bitfield group widths sum to {sum} bits but storage is {storage} bits"
            ),
        }
    }
}

impl std::error::Error for WireError {}

/// A field or packet could not be encoded into its byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEncodeError {
    /// An embedded sub-packet's serialization exceeded its declared length
    /// bound.
    EmbeddedOverflow {
        /// Declared maximum length, in bytes.
        max: usize,
        /// Actual serialized length, in bytes.
        actual: usize,
    },
    /// A union field had no selected variant, and the union is not marked
    /// `accept_missing`.
    MissingUnionVariant,
}

impl fmt::Display for WireEncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmbeddedOverflow { max, actual } => write!(
                f,
                "embedded packet serialized to {actual} bytes, exceeding its {max}-byte bound"
            ),
            Self::MissingUnionVariant => {
                write!(f, "union has no selected variant and does not accept a missing one")
            }
        }
    }
}

impl std::error::Error for WireEncodeError {}
