//! `0x0031` legacy app launch (2.x firmware only; little-endian).
//!
//! 2.x firmware has no `AppRunState` endpoint (`0x0034` is a 3.x addition);
//! instead the app's run state is toggled with a single-tuple `AppMessage`
//! sent to this endpoint with a custom message type. This packet models
//! that one tuple directly rather than going through the general
//! `AppMessageTuple` machinery, since 2.x only ever uses it for this one
//! purpose. No authoritative wire sample for this endpoint was available;
//! the shape here is a reasonable reconstruction (see DESIGN.md).

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum LegacyRunState {
    Stopped = 0,
    Running = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyAppLaunch {
    pub uuid: Uuid,
    pub run_state: LegacyRunState,
}

impl Packet for LegacyAppLaunch {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_uuid(self.uuid.as_bytes());
        w.write_enum_u8(&self.run_state);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            uuid: Uuid::from_bytes(r.read_uuid()?),
            run_state: r.read_enum_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let msg = LegacyAppLaunch {
            uuid: Uuid::from_u128(7),
            run_state: LegacyRunState::Running,
        };
        assert_eq!(LegacyAppLaunch::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
