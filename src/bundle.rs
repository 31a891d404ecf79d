//! Bundle/manifest utilities: the persisted on-watch settings file codec
//! (spec §6) and the small watch-info helpers `crate::connection` builds on.
//! This is the "8th layer" SPEC_FULL.md §2 adds — thin, self-contained, and
//! not part of the Pebble Protocol wire format itself, but budgeted by the
//! distilled spec's own component-share table ("bundle/manifest and
//! utilities", 5%). The PBW zip/manifest reader itself stays out of scope
//! (spec §1): this module only covers the settings file, which is a flat
//! record format, not a zip member.

use pebble_wire::{BitReader, BitWriter, Reader, Writer};

const MAGIC: u32 = 0x0074_6573;
const VERSION: u16 = 1;
const UNSET_FLAGS: u16 = 0xFFFF;
const HEADER_LEN: usize = 8;
const RECORD_FIXED_LEN: usize = 4 + 1 + 3; // last_modified + crc8 + packed flags/lengths

/// Errors specific to the settings file container, distinct from
/// `pebble_wire::WireError` since this is a host-local file format rather
/// than a watch-facing wire packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsFileError {
    TooShort,
    BadMagic { found: u32 },
    UnsupportedVersion { found: u16 },
    Truncated,
    Utf8,
    /// A record's stored `crc8(key)` did not match the key bytes that
    /// followed it — the file is corrupt, or this record's length fields
    /// desynced from the real record boundaries.
    KeyCrcMismatch { offset: usize, expected: u8, found: u8 },
}

impl std::fmt::Display for SettingsFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => write!(f, "buffer is shorter than the 8-byte settings header"),
            Self::BadMagic { found } => write!(f, "bad settings file magic: {found:#010x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported settings file version {found}"),
            Self::Truncated => write!(f, "settings record truncated before its declared key/value length"),
            Self::Utf8 => write!(f, "settings key is not valid UTF-8"),
            Self::KeyCrcMismatch { offset, expected, found } => write!(
                f,
                "settings record at offset {offset}: stored key crc8 {found:#04x} does not match computed {expected:#04x}"
            ),
        }
    }
}

impl std::error::Error for SettingsFileError {}

/// One key/value record. `flags` is a 6-bit per-record flag field whose
/// individual bit meanings are not part of the wire contract this crate
/// owns (spec treats the on-watch settings consumer as the authority on
/// them); callers that care can mask `flags` themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    pub last_modified: u32,
    pub flags: u8,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// A CRC-8 checksum of a record's key, stored alongside it so a reader can
/// detect key corruption without re-deriving the key's position.
///
/// Ported from `examples/original_source/libpebble2/util/stm32_crc.py`'s
/// `crc8` — the same nibble-lookup algorithm `settings_file.py` uses for its
/// `key_hash`, not a generic table-driven CRC-8 variant. It processes `key`
/// back to front, one nibble at a time (high nibble of the last byte
/// first), folding each nibble through a 16-entry lookup table.
fn crc8(key: &[u8]) -> u8 {
    const LOOKUP: [u8; 16] = [
        0, 47, 94, 113, 188, 147, 226, 205, 87, 120, 9, 38, 235, 196, 181, 154,
    ];

    let len = key.len();
    let mut crc: u8 = 0;
    for i in 0..len * 2 {
        let byte = key[len - (i / 2) - 1];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte };
        let index = (nibble ^ (crc >> 4)) & 0x0f;
        crc = LOOKUP[index as usize] ^ ((crc << 4) & 0xf0);
    }
    crc
}

/// Parses every record out of a settings file buffer, stopping at the
/// first `0xFF`-fill (end-of-records marker) or the end of the buffer,
/// whichever comes first.
pub fn read_settings_file(buf: &[u8]) -> Result<Vec<SettingsRecord>, SettingsFileError> {
    if buf.len() < HEADER_LEN {
        return Err(SettingsFileError::TooShort);
    }
    let mut r = Reader::new(buf);
    let magic = r.read_u32(pebble_wire::Endian::Little).map_err(|_| SettingsFileError::TooShort)?;
    if magic != MAGIC {
        return Err(SettingsFileError::BadMagic { found: magic });
    }
    let version = r.read_u16(pebble_wire::Endian::Little).unwrap();
    if version != VERSION {
        return Err(SettingsFileError::UnsupportedVersion { found: version });
    }
    let _flags = r.read_u16(pebble_wire::Endian::Little).unwrap();

    let mut records = Vec::new();
    loop {
        if r.remaining() < RECORD_FIXED_LEN {
            break;
        }
        // A fully 0xFF-filled record header is the end-of-records marker.
        let peek_start = r.position();
        let last_modified = r.read_u32(pebble_wire::Endian::Little).unwrap();
        let stored_crc = r.read_u8().unwrap();
        let packed = r.read_bytes(3).unwrap();
        if last_modified == u32::MAX && stored_crc == 0xFF && packed == [0xFF, 0xFF, 0xFF] {
            break;
        }
        let word = u32::from_le_bytes([packed[0], packed[1], packed[2], 0]);
        let mut bits = BitReader::new(word as u64, 24);
        let flags = bits.pull(6) as u8;
        let key_len = bits.pull(7) as usize;
        let value_len = bits.pull(11) as usize;
        bits.finish().expect("24-bit group always sums to 24");

        if r.remaining() < key_len + value_len {
            return Err(SettingsFileError::Truncated);
        }
        let key = r.read_bytes(key_len).unwrap().to_vec();
        let value = r.read_bytes(value_len).unwrap().to_vec();

        let computed_crc = crc8(&key);
        if computed_crc != stored_crc {
            return Err(SettingsFileError::KeyCrcMismatch {
                offset: peek_start,
                expected: computed_crc,
                found: stored_crc,
            });
        }

        records.push(SettingsRecord {
            last_modified,
            flags,
            key,
            value,
        });
    }
    Ok(records)
}

/// Serializes `records` into a fresh settings file buffer. Does not append
/// an explicit trailing 0xFF-fill terminator record — callers writing to a
/// fixed-size flash region pad the remainder with `0xFF` themselves; a
/// buffer with no trailing bytes is itself a valid (empty-tail) file since
/// `read_settings_file` also stops at the end of the buffer.
pub fn write_settings_file(records: &[SettingsRecord]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u32(MAGIC, pebble_wire::Endian::Little);
    w.write_u16(VERSION, pebble_wire::Endian::Little);
    w.write_u16(UNSET_FLAGS, pebble_wire::Endian::Little);

    for record in records {
        w.write_u32(record.last_modified, pebble_wire::Endian::Little);
        w.write_u8(crc8(&record.key));

        let mut bits = BitWriter::new(24);
        bits.push(record.flags as u64, 6);
        bits.push(record.key.len() as u64, 7);
        bits.push(record.value.len() as u64, 11);
        let word = bits.finish().expect("6+7+11 always sums to 24") as u32;
        w.write_bytes(&word.to_le_bytes()[..3]);

        w.write_bytes(&record.key);
        w.write_bytes(&record.value);
    }
    w.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc8_matches_a_hand_traced_run_of_the_ported_algorithm() {
        // Traced by hand against `stm32_crc.py`'s `crc8`, one nibble at a
        // time, for the single-byte key b"A" (0x41):
        // i=0: nibble = 0x41 >> 4 = 0x04, index = 4, crc = LOOKUP[4] = 0xBC
        // i=1: nibble = 0x41, index = (0x41 ^ (0xBC >> 4)) & 0xf = 0xA,
        //      crc = LOOKUP[0xA] ^ ((0xBC << 4) & 0xf0) = 0x09 ^ 0xC0 = 0xC9
        assert_eq!(crc8(b"A"), 0xC9);
    }

    #[test]
    fn empty_file_round_trips() {
        let bytes = write_settings_file(&[]);
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(read_settings_file(&bytes).unwrap(), vec![]);
    }

    #[test]
    fn one_record_round_trips() {
        let records = vec![SettingsRecord {
            last_modified: 0x1000_0000,
            flags: 0b10_1010,
            key: b"bt_address".to_vec(),
            value: vec![1, 2, 3, 4, 5, 6],
        }];
        let bytes = write_settings_file(&records);
        assert_eq!(read_settings_file(&bytes).unwrap(), records);
    }

    #[test]
    fn multiple_records_round_trip_in_order() {
        let records = vec![
            SettingsRecord {
                last_modified: 1,
                flags: 0,
                key: b"a".to_vec(),
                value: b"1".to_vec(),
            },
            SettingsRecord {
                last_modified: 2,
                flags: 0x3f,
                key: b"bb".to_vec(),
                value: vec![],
            },
        ];
        let bytes = write_settings_file(&records);
        assert_eq!(read_settings_file(&bytes).unwrap(), records);
    }

    #[test]
    fn trailing_0xff_fill_terminates_decoding() {
        let mut bytes = write_settings_file(&[SettingsRecord {
            last_modified: 9,
            flags: 1,
            key: b"k".to_vec(),
            value: b"v".to_vec(),
        }]);
        bytes.extend(std::iter::repeat(0xFFu8).take(64));
        let records = read_settings_file(&bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, b"k");
    }

    #[test]
    fn corrupted_key_crc_is_rejected_in_release_and_debug_builds() {
        let mut bytes = write_settings_file(&[SettingsRecord {
            last_modified: 9,
            flags: 1,
            key: b"bt_address".to_vec(),
            value: b"v".to_vec(),
        }]);
        // The stored crc8 byte is the 5th byte of the record, right after
        // the header and the 4-byte `last_modified`.
        bytes[HEADER_LEN + 4] ^= 0xff;
        assert!(matches!(
            read_settings_file(&bytes),
            Err(SettingsFileError::KeyCrcMismatch { .. })
        ));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = write_settings_file(&[]);
        bytes[0] = 0;
        assert!(matches!(
            read_settings_file(&bytes),
            Err(SettingsFileError::BadMagic { .. })
        ));
    }
}
