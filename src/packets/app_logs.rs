//! `0x07d6` app logs: two variants sharing one endpoint, disambiguated by
//! direction — `AppLogShippingControl` is host→watch and not registered
//! for dispatch; `AppLogMessage` is watch→host and is.

use pebble_wire::{Endian, Packet, Reader, WireError, Writer};
use uuid::Uuid;

/// Host→watch: enable/disable app log shipping. Not registered for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLogShippingControl {
    pub enable: bool,
}

impl Packet for AppLogShippingControl {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_bool(self.enable);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self { enable: r.read_bool()? })
    }
}

/// Watch→host, registered for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLogMessage {
    pub uuid: Uuid,
    pub timestamp: u32,
    pub level: u8,
    pub line_number: u16,
    pub filename: String,
    pub message: String,
}

const FILENAME_LEN: usize = 16;

impl Packet for AppLogMessage {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_uuid(self.uuid.as_bytes());
        w.write_u32(self.timestamp, Endian::Big);
        w.write_u8(self.level);
        if self.message.len() > 255 {
            panic!("app log message exceeds 255 bytes");
        }
        w.write_u8(self.message.len() as u8);
        w.write_u16(self.line_number, Endian::Big);
        w.write_fixed_string(&self.filename, FILENAME_LEN);
        w.write_bytes(self.message.as_bytes());
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let uuid = Uuid::from_bytes(r.read_uuid()?);
        let timestamp = r.read_u32(Endian::Big)?;
        let level = r.read_u8()?;
        let length = r.read_u8()? as usize;
        let line_number = r.read_u16(Endian::Big)?;
        let filename = r.read_fixed_string(FILENAME_LEN)?;
        let message = std::str::from_utf8(r.read_bytes(length)?)
            .map_err(|_| WireError::Utf8)?
            .to_owned();
        Ok(Self {
            uuid,
            timestamp,
            level,
            line_number,
            filename,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_control_round_trips() {
        let msg = AppLogShippingControl { enable: true };
        assert_eq!(AppLogShippingControl::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn app_log_message_round_trips() {
        let msg = AppLogMessage {
            uuid: Uuid::from_u128(3),
            timestamp: 100,
            level: 2,
            line_number: 10,
            filename: "app.c".to_owned(),
            message: "boot".to_owned(),
        };
        assert_eq!(AppLogMessage::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
