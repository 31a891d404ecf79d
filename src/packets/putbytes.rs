//! `0xbeef` PutBytes (little-endian): the chunked binary uploader used for
//! firmware, app resources, app binaries, workers and files. Not
//! registered for dispatch (the response shares the endpoint with a
//! distinct `PutBytesResponse` type that is registered).
//!
//! `Init` has two incompatible shapes on the wire, disambiguated by the
//! high bit of the `object_type` byte: classic sessions (bank + filename)
//! leave it clear, app-install sessions (an app id) set it. Rather than
//! out-of-band knowledge of which firmware generation is talking, decoding
//! reads that bit directly off the wire into `app_install`.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum ObjectType {
    Firmware = 1,
    Recovery = 2,
    SystemResources = 3,
    AppResources = 4,
    AppBinary = 5,
    Worker = 6,
    File = 7,
    Coredump = 8,
}

const APP_INSTALL_BIT: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutBytesTarget {
    Classic { bank: u8, filename: String },
    App { app_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutBytesInit {
    pub object_size: u32,
    pub object_type: ObjectType,
    pub target: PutBytesTarget,
}

impl PutBytesInit {
    fn app_install(&self) -> bool {
        matches!(self.target, PutBytesTarget::App { .. })
    }

    fn encode(&self, w: &mut Writer) {
        w.write_u32(self.object_size, Endian::Little);
        // object_type is written as a plain byte, not via write_enum_u8,
        // so the app-install bit can be folded into the same byte.
        let mut object_type_byte = self.object_type.to_repr();
        if self.app_install() {
            object_type_byte |= APP_INSTALL_BIT;
        }
        w.write_u8(object_type_byte);
        match &self.target {
            PutBytesTarget::Classic { bank, filename } => {
                w.write_u8(*bank);
                w.write_cstring(filename);
            }
            PutBytesTarget::App { app_id } => {
                w.write_u32(*app_id, Endian::Little);
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let object_size = r.read_u32(Endian::Little)?;
        let object_type_byte = r.read_u8()?;
        let app_install = object_type_byte & APP_INSTALL_BIT != 0;
        let object_type = ObjectType::from_repr(object_type_byte & !APP_INSTALL_BIT).ok_or(
            WireError::InvalidEnum {
                name: "ObjectType",
                value: object_type_byte as i64,
            },
        )?;
        let target = if app_install {
            PutBytesTarget::App {
                app_id: r.read_u32(Endian::Little)?,
            }
        } else {
            PutBytesTarget::Classic {
                bank: r.read_u8()?,
                filename: r.read_cstring()?,
            }
        };
        Ok(Self {
            object_size,
            object_type,
            target,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutBytesPut {
    pub cookie: u32,
    pub payload: Vec<u8>,
}

impl PutBytesPut {
    fn encode(&self, w: &mut Writer) {
        w.write_u32(self.cookie, Endian::Little);
        w.write_u32(self.payload.len() as u32, Endian::Little);
        w.write_bytes(&self.payload);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let cookie = r.read_u32(Endian::Little)?;
        let payload_size = r.read_u32(Endian::Little)? as usize;
        let payload = r.read_bytes(payload_size)?.to_vec();
        Ok(Self { cookie, payload })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutBytesCommit {
    pub cookie: u32,
    pub object_crc: u32,
}

impl PutBytesCommit {
    fn encode(&self, w: &mut Writer) {
        w.write_u32(self.cookie, Endian::Little);
        w.write_u32(self.object_crc, Endian::Little);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            cookie: r.read_u32(Endian::Little)?,
            object_crc: r.read_u32(Endian::Little)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutBytesAbort {
    pub cookie: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutBytesInstall {
    pub cookie: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutBytesBody {
    Init(PutBytesInit),
    Put(PutBytesPut),
    Commit(PutBytesCommit),
    Abort(PutBytesAbort),
    Install(PutBytesInstall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutBytes {
    pub body: PutBytesBody,
}

impl PutBytes {
    fn command(&self) -> u8 {
        match &self.body {
            PutBytesBody::Init(_) => 0x01,
            PutBytesBody::Put(_) => 0x02,
            PutBytesBody::Commit(_) => 0x03,
            PutBytesBody::Abort(_) => 0x04,
            PutBytesBody::Install(_) => 0x05,
        }
    }
}

impl Packet for PutBytes {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command());
        match &self.body {
            PutBytesBody::Init(b) => b.encode(w),
            PutBytesBody::Put(b) => b.encode(w),
            PutBytesBody::Commit(b) => b.encode(w),
            PutBytesBody::Abort(b) => w.write_u32(b.cookie, Endian::Little),
            PutBytesBody::Install(b) => w.write_u32(b.cookie, Endian::Little),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command = r.read_u8()?;
        let body = match command {
            0x01 => PutBytesBody::Init(PutBytesInit::decode(r)?),
            0x02 => PutBytesBody::Put(PutBytesPut::decode(r)?),
            0x03 => PutBytesBody::Commit(PutBytesCommit::decode(r)?),
            0x04 => PutBytesBody::Abort(PutBytesAbort {
                cookie: r.read_u32(Endian::Little)?,
            }),
            0x05 => PutBytesBody::Install(PutBytesInstall {
                cookie: r.read_u32(Endian::Little)?,
            }),
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { body })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum PutBytesResult {
    Ack = 0x01,
    Nack = 0x02,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutBytesResponse {
    pub result: PutBytesResult,
    pub cookie: u32,
}

impl Packet for PutBytesResponse {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.result);
        w.write_u32(self.cookie, Endian::Little);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            result: r.read_enum_u8()?,
            cookie: r.read_u32(Endian::Little)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_init_round_trips() {
        let msg = PutBytes {
            body: PutBytesBody::Init(PutBytesInit {
                object_size: 4096,
                object_type: ObjectType::AppResources,
                target: PutBytesTarget::Classic {
                    bank: 0,
                    filename: "app_resources.pbpack".to_owned(),
                },
            }),
        };
        assert_eq!(PutBytes::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn app_init_round_trips() {
        let msg = PutBytes {
            body: PutBytesBody::Init(PutBytesInit {
                object_size: 8192,
                object_type: ObjectType::AppBinary,
                target: PutBytesTarget::App { app_id: 7 },
            }),
        };
        assert_eq!(PutBytes::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn put_round_trips() {
        let msg = PutBytes {
            body: PutBytesBody::Put(PutBytesPut {
                cookie: 55,
                payload: vec![1, 2, 3, 4],
            }),
        };
        assert_eq!(PutBytes::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn response_round_trips() {
        let msg = PutBytesResponse {
            result: PutBytesResult::Nack,
            cookie: 99,
        };
        assert_eq!(PutBytesResponse::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
