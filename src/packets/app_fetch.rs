//! `0x1771` app fetch (little-endian): watch-initiated request for an app
//! resource pack it doesn't have cached, answered by the host driving a
//! `crate::packets::putbytes` session. `AppFetchRequest` is watch→host and
//! registered; `AppFetchResponse` shares the same endpoint id but is
//! host→watch and unregistered, so dispatch is by direction, not by a
//! shared tag.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};
use uuid::Uuid;

/// Watch→host, registered for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppFetchRequest {
    pub uuid: Uuid,
    pub app_id: i32,
}

impl Packet for AppFetchRequest {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(0x01);
        w.write_uuid(self.uuid.as_bytes());
        w.write_i32(self.app_id, Endian::Little);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _command = r.read_u8()?;
        Ok(Self {
            uuid: Uuid::from_bytes(r.read_uuid()?),
            app_id: r.read_i32(Endian::Little)?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum AppFetchStatus {
    Start = 0x01,
    Busy = 0x02,
    InvalidUuid = 0x03,
    NoData = 0x04,
}

/// Host→watch, not registered for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppFetchResponse {
    pub response: AppFetchStatus,
}

impl Packet for AppFetchResponse {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(0x01);
        w.write_enum_u8(&self.response);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _command = r.read_u8()?;
        Ok(Self {
            response: r.read_enum_u8()?,
        })
    }
}

/// Row layout of the on-watch app database, exchanged as BlobDB values
/// rather than over its own endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMetadata {
    pub uuid: Uuid,
    pub flags: u32,
    pub icon: u32,
    pub app_version_major: u8,
    pub app_version_minor: u8,
    pub sdk_version_major: u8,
    pub sdk_version_minor: u8,
    pub app_face_bg_color: u8,
    pub app_face_template_id: u8,
    pub app_name: String,
}

const APP_NAME_LEN: usize = 96;

impl AppMetadata {
    pub fn encode(&self, w: &mut Writer) {
        w.write_uuid(self.uuid.as_bytes());
        w.write_u32(self.flags, Endian::Little);
        w.write_u32(self.icon, Endian::Little);
        w.write_u8(self.app_version_major);
        w.write_u8(self.app_version_minor);
        w.write_u8(self.sdk_version_major);
        w.write_u8(self.sdk_version_minor);
        w.write_u8(self.app_face_bg_color);
        w.write_u8(self.app_face_template_id);
        w.write_fixed_string(&self.app_name, APP_NAME_LEN);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            uuid: Uuid::from_bytes(r.read_uuid()?),
            flags: r.read_u32(Endian::Little)?,
            icon: r.read_u32(Endian::Little)?,
            app_version_major: r.read_u8()?,
            app_version_minor: r.read_u8()?,
            sdk_version_major: r.read_u8()?,
            sdk_version_minor: r.read_u8()?,
            app_face_bg_color: r.read_u8()?,
            app_face_template_id: r.read_u8()?,
            app_name: r.read_fixed_string(APP_NAME_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        let msg = AppFetchRequest {
            uuid: Uuid::from_u128(5),
            app_id: -1,
        };
        assert_eq!(AppFetchRequest::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn response_round_trips() {
        let msg = AppFetchResponse {
            response: AppFetchStatus::Busy,
        };
        assert_eq!(AppFetchResponse::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn metadata_round_trips() {
        let msg = AppMetadata {
            uuid: Uuid::from_u128(1),
            flags: 0,
            icon: 0,
            app_version_major: 1,
            app_version_minor: 0,
            sdk_version_major: 4,
            sdk_version_minor: 3,
            app_face_bg_color: 0,
            app_face_template_id: 0,
            app_name: "Clay".to_owned(),
        };
        let mut w = Writer::new();
        msg.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(AppMetadata::decode(&mut Reader::new(&bytes)).unwrap(), msg);
    }
}
