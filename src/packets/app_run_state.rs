//! `0x0034` app run state (little-endian): start/stop/request, 3.x and
//! later only (2.x uses `crate::packets::legacy_app_launch` instead).

use pebble_wire::{Endian, Packet, Reader, WireError, Writer};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Start { uuid: Uuid },
    Stop { uuid: Uuid },
    Request,
}

impl AppRunState {
    fn command(&self) -> u8 {
        match self {
            Self::Start { .. } => 0x01,
            Self::Stop { .. } => 0x02,
            Self::Request => 0x03,
        }
    }
}

impl Packet for AppRunState {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command());
        match self {
            Self::Start { uuid } | Self::Stop { uuid } => w.write_uuid(uuid.as_bytes()),
            Self::Request => {}
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command = r.read_u8()?;
        Ok(match command {
            0x01 => Self::Start {
                uuid: Uuid::from_bytes(r.read_uuid()?),
            },
            0x02 => Self::Stop {
                uuid: Uuid::from_bytes(r.read_uuid()?),
            },
            0x03 => Self::Request,
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_round_trips() {
        let msg = AppRunState::Start { uuid: Uuid::from_u128(9) };
        assert_eq!(AppRunState::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn request_has_no_body() {
        assert_eq!(AppRunState::Request.to_bytes(), [0x03]);
    }
}
