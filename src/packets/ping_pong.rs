//! `0x1770` ping/pong: a single cookie-keyed round trip used to detect a
//! live link.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum PingPongKind {
    Ping = 0,
    Pong = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingPong {
    pub kind: PingPongKind,
    pub cookie: u32,
}

impl Packet for PingPong {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.kind);
        w.write_u32(self.cookie, Endian::Big);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            kind: r.read_enum_u8()?,
            cookie: r.read_u32(Endian::Big)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let p = PingPong {
            kind: PingPongKind::Pong,
            cookie: 0xdead_beef,
        };
        assert_eq!(PingPong::from_bytes(&p.to_bytes()).unwrap(), p);
    }
}
