//! `0x000b` time: get/set local time, set UTC time with a timezone name.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum TimeMessageKind {
    GetTime = 0x00,
    SetLocalTime = 0x01,
    GetTimeResponse = 0x02,
    SetUtc = 0x03,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeMessage {
    GetTime,
    SetLocalTime { unix_time: u32 },
    GetTimeResponse { unix_time: u32 },
    SetUtc {
        unix_time: u32,
        /// Minutes east of UTC.
        utc_offset: i16,
        /// IANA timezone name, e.g. `"Etc/GMT+8"`.
        tz_name: String,
    },
}

impl TimeMessage {
    fn kind(&self) -> TimeMessageKind {
        match self {
            Self::GetTime => TimeMessageKind::GetTime,
            Self::SetLocalTime { .. } => TimeMessageKind::SetLocalTime,
            Self::GetTimeResponse { .. } => TimeMessageKind::GetTimeResponse,
            Self::SetUtc { .. } => TimeMessageKind::SetUtc,
        }
    }
}

impl Packet for TimeMessage {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.kind());
        match self {
            Self::GetTime => {}
            Self::SetLocalTime { unix_time } | Self::GetTimeResponse { unix_time } => {
                w.write_u32(*unix_time, Self::DEFAULT_ENDIAN);
            }
            Self::SetUtc {
                unix_time,
                utc_offset,
                tz_name,
            } => {
                w.write_u32(*unix_time, Self::DEFAULT_ENDIAN);
                w.write_i16(*utc_offset, Self::DEFAULT_ENDIAN);
                // The name is not null-terminated; its length byte is the
                // whole of the string.
                w.write_pascal_string(tz_name, false, false);
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let kind: TimeMessageKind = r.read_enum_u8()?;
        Ok(match kind {
            TimeMessageKind::GetTime => Self::GetTime,
            TimeMessageKind::SetLocalTime => Self::SetLocalTime {
                unix_time: r.read_u32(Self::DEFAULT_ENDIAN)?,
            },
            TimeMessageKind::GetTimeResponse => Self::GetTimeResponse {
                unix_time: r.read_u32(Self::DEFAULT_ENDIAN)?,
            },
            TimeMessageKind::SetUtc => {
                let unix_time = r.read_u32(Self::DEFAULT_ENDIAN)?;
                let utc_offset = r.read_i16(Self::DEFAULT_ENDIAN)?;
                let tz_name = r.read_pascal_string(false, false)?;
                Self::SetUtc {
                    unix_time,
                    utc_offset,
                    tz_name,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_utc_matches_the_documented_wire_shape() {
        let msg = TimeMessage::SetUtc {
            unix_time: 0x5F00_0000,
            utc_offset: -480,
            tz_name: "Etc/GMT+8".to_owned(),
        };

        let bytes = msg.to_bytes();
        assert_eq!(
            bytes,
            [
                0x03, 0x5F, 0x00, 0x00, 0x00, 0xFE, 0x20, 0x09, b'E', b't', b'c', b'/', b'G',
                b'M', b'T', b'+', b'8',
            ]
        );

        assert_eq!(TimeMessage::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn rejects_unknown_kind() {
        let mut r = Reader::new(&[0xff]);
        assert!(TimeMessage::decode(&mut r).is_err());
    }
}
