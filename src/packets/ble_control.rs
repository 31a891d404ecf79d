//! `0x0033` BLE control (little-endian): toggles classic-Bluetooth
//! discoverability for a limited duration, used during the pairing flow.

use pebble_wire::{Endian, Packet, Reader, WireError, Writer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleControl {
    pub discoverable: bool,
    pub duration_secs: u16,
}

const OPCODE: u8 = 0x04;

impl Packet for BleControl {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(OPCODE);
        w.write_bool(self.discoverable);
        w.write_u16(self.duration_secs, Endian::Little);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _opcode = r.read_u8()?;
        Ok(Self {
            discoverable: r.read_bool()?,
            duration_secs: r.read_u16(Endian::Little)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let msg = BleControl {
            discoverable: true,
            duration_secs: 120,
        };
        assert_eq!(BleControl::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
