//! `0x07d3` reset (little-endian): host→watch only, not registered for
//! dispatch. Four variants recovered from `original_source` (the distilled
//! spec left this as a bare "reset" packet with no command shape).

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum ResetCommand {
    Reset = 0x00,
    DumpCore = 0x01,
    FactoryReset = 0x02,
    Prf = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reset {
    pub command: ResetCommand,
}

impl Packet for Reset {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.command);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            command: r.read_enum_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_command() {
        for command in [
            ResetCommand::Reset,
            ResetCommand::DumpCore,
            ResetCommand::FactoryReset,
            ResetCommand::Prf,
        ] {
            let msg = Reset { command };
            assert_eq!(Reset::from_bytes(&msg.to_bytes()).unwrap(), msg);
        }
    }
}
