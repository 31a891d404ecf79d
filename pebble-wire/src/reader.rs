use crate::endian::Endian;
use crate::error::WireError;
use crate::WireEnum;

/// A cursor over an in-memory buffer that decodes one field at a time.
///
/// This is the decode half of the field kernel. Each `read_*` call both
/// returns a value and advances the cursor, so that later fields can use
/// already-decoded sibling values (a tag picking a union variant, a length
/// bounding a byte array) just by having been computed first, in ordinary
/// sequential Rust, rather than through a separate lookup table. Decoders
/// never consume bytes on failure: every `read_*` either advances past a
/// fully-read field or returns an error with the cursor untouched.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self, endian: Endian) -> Result<u16, WireError> {
        let b: [u8; 2] = self.take(2)?.try_into().unwrap();
        Ok(match endian {
            Endian::Big => u16::from_be_bytes(b),
            Endian::Little => u16::from_le_bytes(b),
        })
    }

    pub fn read_i16(&mut self, endian: Endian) -> Result<i16, WireError> {
        Ok(self.read_u16(endian)? as i16)
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32, WireError> {
        let b: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(match endian {
            Endian::Big => u32::from_be_bytes(b),
            Endian::Little => u32::from_le_bytes(b),
        })
    }

    pub fn read_i32(&mut self, endian: Endian) -> Result<i32, WireError> {
        Ok(self.read_u32(endian)? as i32)
    }

    pub fn read_u64(&mut self, endian: Endian) -> Result<u64, WireError> {
        let b: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(match endian {
            Endian::Big => u64::from_be_bytes(b),
            Endian::Little => u64::from_le_bytes(b),
        })
    }

    pub fn read_i64(&mut self, endian: Endian) -> Result<i64, WireError> {
        Ok(self.read_u64(endian)? as i64)
    }

    /// UUIDs are raw 16 bytes, insensitive to the packet's endianness.
    pub fn read_uuid(&mut self) -> Result<[u8; 16], WireError> {
        Ok(self.take(16)?.try_into().unwrap())
    }

    pub fn read_padding(&mut self, n: usize) -> Result<(), WireError> {
        self.take(n)?;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        self.take(n)
    }

    /// Consumes and returns every remaining byte — used by trailing arrays
    /// and embedded packets with no declared length.
    pub fn read_bytes_to_end(&mut self) -> &'a [u8] {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice
    }

    /// Splits off a bounded sub-reader over the next `len` bytes, for
    /// length-linked unions and embedded sub-packets.
    pub fn sub_reader(&mut self, len: usize) -> Result<Reader<'a>, WireError> {
        Ok(Reader::new(self.take(len)?))
    }

    /// Splits off a sub-reader over every remaining byte, for an embedded
    /// sub-packet with no declared length bound.
    pub fn rest_as_reader(&mut self) -> Reader<'a> {
        Reader::new(self.read_bytes_to_end())
    }

    pub fn read_cstring(&mut self) -> Result<String, WireError> {
        let nul = self.buf[self.pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(WireError::UnterminatedString)?;
        let s = std::str::from_utf8(&self.buf[self.pos..self.pos + nul])
            .map_err(|_| WireError::Utf8)?
            .to_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Pascal string: one length-prefix byte, then `length` bytes of
    /// content, optionally including a trailing NUL inside that length.
    pub fn read_pascal_string(
        &mut self,
        null_terminated: bool,
        counts_terminator: bool,
    ) -> Result<String, WireError> {
        let declared_len = self.read_u8()? as usize;
        let total = if null_terminated && !counts_terminator {
            declared_len + 1
        } else {
            declared_len
        };
        let raw = self.take(total)?;
        let content = if null_terminated {
            let (body, term) = raw.split_at(raw.len().saturating_sub(1));
            if term != [0] {
                return Err(WireError::UnterminatedString);
            }
            body
        } else {
            raw
        };
        std::str::from_utf8(content)
            .map(str::to_owned)
            .map_err(|_| WireError::Utf8)
    }

    /// Fixed-width UTF-8 string: exactly `width` bytes, trailing NUL padding
    /// trimmed off.
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String, WireError> {
        let raw = self.take(width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        std::str::from_utf8(&raw[..end])
            .map(str::to_owned)
            .map_err(|_| WireError::Utf8)
    }

    /// Decodes an enum whose repr is `u8`.
    pub fn read_enum_u8<T>(&mut self) -> Result<T, WireError>
    where
        T: WireEnum<Repr = u8>,
    {
        let raw = self.read_u8()?;
        T::from_repr(raw).ok_or(WireError::InvalidEnum {
            name: T::NAME,
            value: raw as i64,
        })
    }

    /// Decodes an enum whose repr is `u16`.
    pub fn read_enum_u16<T>(&mut self, endian: Endian) -> Result<T, WireError>
    where
        T: WireEnum<Repr = u16>,
    {
        let raw = self.read_u16(endian)?;
        T::from_repr(raw).ok_or(WireError::InvalidEnum {
            name: T::NAME,
            value: raw as i64,
        })
    }

    /// Decodes an enum whose repr is `u32`.
    pub fn read_enum_u32<T>(&mut self, endian: Endian) -> Result<T, WireError>
    where
        T: WireEnum<Repr = u32>,
    {
        let raw = self.read_u32(endian)?;
        T::from_repr(raw).ok_or(WireError::InvalidEnum {
            name: T::NAME,
            value: raw as i64,
        })
    }

    /// An `Optional<T>` field: absent once the buffer has no more bytes,
    /// otherwise decoded normally.
    pub fn read_optional<T>(
        &mut self,
        decode: impl FnOnce(&mut Self) -> Result<T, WireError>,
    ) -> Result<Option<T>, WireError> {
        if self.at_end() {
            return Ok(None);
        }
        decode(self).map(Some)
    }
}
