use crate::endian::Endian;
use crate::WireEnum;

/// Largest `&str` prefix of `s` that is at most `max_bytes` long and still a
/// valid UTF-8 boundary.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// The encode half of the field kernel.
///
/// A packet's `encode` method writes its fields in declaration order into a
/// `Writer`. Because Rust evaluates statements in order, the "prepare pass"
/// (computing a length/count/tag sibling) and the "emit pass" (writing
/// bytes) collapse into a single straight-line function: the sibling is
/// simply computed (e.g. `body.len() as u16`) and written before the field
/// it describes is written, which the borrow checker and the packet's own
/// field order already guarantee.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16, endian: Endian) {
        self.buf.extend_from_slice(&match endian {
            Endian::Big => v.to_be_bytes(),
            Endian::Little => v.to_le_bytes(),
        });
    }

    pub fn write_i16(&mut self, v: i16, endian: Endian) {
        self.write_u16(v as u16, endian);
    }

    pub fn write_u32(&mut self, v: u32, endian: Endian) {
        self.buf.extend_from_slice(&match endian {
            Endian::Big => v.to_be_bytes(),
            Endian::Little => v.to_le_bytes(),
        });
    }

    pub fn write_i32(&mut self, v: i32, endian: Endian) {
        self.write_u32(v as u32, endian);
    }

    pub fn write_u64(&mut self, v: u64, endian: Endian) {
        self.buf.extend_from_slice(&match endian {
            Endian::Big => v.to_be_bytes(),
            Endian::Little => v.to_le_bytes(),
        });
    }

    pub fn write_i64(&mut self, v: i64, endian: Endian) {
        self.write_u64(v as u64, endian);
    }

    pub fn write_uuid(&mut self, v: &[u8; 16]) {
        self.buf.extend_from_slice(v);
    }

    pub fn write_padding(&mut self, n: usize) {
        self.buf.extend(std::iter::repeat(0u8).take(n));
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// Binary array with a fixed or sibling-declared length: truncates or
    /// zero-pads `v` to exactly `len` bytes.
    pub fn write_bytes_fixed(&mut self, v: &[u8], len: usize) {
        if v.len() >= len {
            self.buf.extend_from_slice(&v[..len]);
        } else {
            self.buf.extend_from_slice(v);
            self.write_padding(len - v.len());
        }
    }

    pub fn write_cstring(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }

    /// Pascal string: one length-prefix byte (clamped to 255), then the
    /// content, optionally followed by a NUL counted in that length byte.
    ///
    /// A string longer than the length prefix can express is truncated, not
    /// rejected — matching `PascalString.value_to_buffer`'s `value[:255]`
    /// (and, when null-terminated, `value[:254] + '\x00'`) in the original
    /// `libpebble2` source. Truncation lands on a `char` boundary so the
    /// written bytes stay valid UTF-8. Only truncated down to 254 when the
    /// terminator is counted in the length prefix; when it isn't, the
    /// content itself may use the full 255 (the terminator then sits past
    /// what the length byte describes).
    pub fn write_pascal_string(&mut self, s: &str, null_terminated: bool, counts_terminator: bool) {
        let max_content = if null_terminated && counts_terminator { 254 } else { 255 };
        let content = truncate_utf8(s, max_content);

        let declared_len = if null_terminated && counts_terminator {
            content.len() + 1
        } else {
            content.len()
        };

        self.write_u8(declared_len as u8);
        self.write_bytes(content.as_bytes());
        if null_terminated {
            self.write_u8(0);
        }
    }

    /// Fixed-width UTF-8 string: pads or truncates to exactly `width` bytes.
    pub fn write_fixed_string(&mut self, s: &str, width: usize) {
        self.write_bytes_fixed(s.as_bytes(), width);
    }

    pub fn write_enum_u8<T>(&mut self, v: &T)
    where
        T: WireEnum<Repr = u8>,
    {
        self.write_u8(v.to_repr());
    }

    pub fn write_enum_u16<T>(&mut self, v: &T, endian: Endian)
    where
        T: WireEnum<Repr = u16>,
    {
        self.write_u16(v.to_repr(), endian);
    }

    pub fn write_enum_u32<T>(&mut self, v: &T, endian: Endian)
    where
        T: WireEnum<Repr = u32>,
    {
        self.write_u32(v.to_repr(), endian);
    }
}
