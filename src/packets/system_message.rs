//! `0x0012` system message (little-endian): firmware-update sub-protocol,
//! plus reconnection and phone Bluetooth-MAP hints.
//!
//! `extra_data` is a union on `message_type` that tolerates unknown tags:
//! everything except `FirmwareUpdateStartResponse` carries no body, so an
//! unrecognised `message_type` simply yields an empty `Unparsed` remainder
//! instead of a decode error.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum SystemMessageKind {
    NewFirmwareAvailable = 0x00,
    FirmwareUpdateStart = 0x01,
    FirmwareUpdateComplete = 0x02,
    FirmwareUpdateFailed = 0x03,
    FirmwareUpToDate = 0x04,
    StopReconnecting = 0x06,
    StartReconnecting = 0x07,
    BluetoothMapDisabled = 0x08,
    BluetoothMapEnabled = 0x09,
    FirmwareUpdateStartResponse = 0x0a,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemMessageBody {
    FirmwareUpdateStartResponse { response: u8 },
    /// Every other kind carries no body on the wire; the (empty) remainder
    /// is kept verbatim rather than rejected.
    Empty(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMessage {
    pub kind: SystemMessageKind,
    pub body: SystemMessageBody,
}

impl Packet for SystemMessage {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(0x00); // command, always zero on this endpoint
        w.write_enum_u8(&self.kind);
        match &self.body {
            SystemMessageBody::FirmwareUpdateStartResponse { response } => w.write_u8(*response),
            SystemMessageBody::Empty(raw) => w.write_bytes(raw),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _command = r.read_u8()?;
        let kind: SystemMessageKind = r.read_enum_u8()?;
        let body = if kind == SystemMessageKind::FirmwareUpdateStartResponse {
            SystemMessageBody::FirmwareUpdateStartResponse {
                response: r.read_u8()?,
            }
        } else {
            SystemMessageBody::Empty(r.read_bytes_to_end().to_vec())
        };
        Ok(Self { kind, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_up_to_date_has_no_body() {
        let msg = SystemMessage {
            kind: SystemMessageKind::FirmwareUpToDate,
            body: SystemMessageBody::Empty(Vec::new()),
        };
        assert_eq!(msg.to_bytes(), [0x00, 0x04]);
        assert_eq!(SystemMessage::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn firmware_update_start_response_round_trips() {
        let msg = SystemMessage {
            kind: SystemMessageKind::FirmwareUpdateStartResponse,
            body: SystemMessageBody::FirmwareUpdateStartResponse { response: 1 },
        };
        assert_eq!(SystemMessage::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
