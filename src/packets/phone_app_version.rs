//! `0x0011` phone-app-version handshake.
//!
//! Demonstrates the union field kind's "accept unknown tags" mode: the
//! watch's request carries a tag the host's response-shaped union doesn't
//! recognise, so it decodes to an opaque [`PhoneAppVersionBody::Unparsed`]
//! remainder rather than failing.

use bitflags::bitflags;
use pebble_wire::{Endian, Packet, Reader, WireError, Writer};

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct SessionCaps: u32 {
        const GAMMA_RAY = 0x8000_0000;
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PlatformFlags: u32 {
        const BTLE = 0x0000_0010;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneAppVersionBody {
    /// The one body shape this side knows how to produce: the canned
    /// "generous capabilities" response the connection core's handshake
    /// handler sends back.
    Response {
        protocol_version: u32,
        session_caps: SessionCaps,
        platform_flags: PlatformFlags,
        response_version: u8,
        major_version: u8,
        minor_version: u8,
        bugfix_version: u8,
        protocol_caps: [u8; 8],
    },
    /// Tag didn't match the known response shape: carried through verbatim
    /// instead of failing to decode.
    Unparsed(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneAppVersion {
    pub tag: u8,
    pub body: PhoneAppVersionBody,
}

const RESPONSE_TAG: u8 = 0x00;

impl Packet for PhoneAppVersion {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.tag);
        match &self.body {
            PhoneAppVersionBody::Response {
                protocol_version,
                session_caps,
                platform_flags,
                response_version,
                major_version,
                minor_version,
                bugfix_version,
                protocol_caps,
            } => {
                w.write_u32(*protocol_version, Endian::Big);
                w.write_u32(session_caps.bits(), Endian::Big);
                w.write_u32(platform_flags.bits(), Endian::Big);
                w.write_u8(*response_version);
                w.write_u8(*major_version);
                w.write_u8(*minor_version);
                w.write_u8(*bugfix_version);
                w.write_bytes(protocol_caps);
            }
            PhoneAppVersionBody::Unparsed(raw) => w.write_bytes(raw),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let tag = r.read_u8()?;
        let body = if tag == RESPONSE_TAG {
            PhoneAppVersionBody::Response {
                protocol_version: r.read_u32(Endian::Big)?,
                session_caps: SessionCaps::from_bits_truncate(r.read_u32(Endian::Big)?),
                platform_flags: PlatformFlags::from_bits_truncate(r.read_u32(Endian::Big)?),
                response_version: r.read_u8()?,
                major_version: r.read_u8()?,
                minor_version: r.read_u8()?,
                bugfix_version: r.read_u8()?,
                protocol_caps: r.read_bytes(8)?.try_into().unwrap(),
            }
        } else {
            PhoneAppVersionBody::Unparsed(r.read_bytes_to_end().to_vec())
        };
        Ok(Self { tag, body })
    }
}

/// The canned handshake reply: `must_initialize` transports register a
/// handler for [`PhoneAppVersion`] requests and answer with this.
pub fn generous_capabilities_response() -> PhoneAppVersion {
    PhoneAppVersion {
        tag: RESPONSE_TAG,
        body: PhoneAppVersionBody::Response {
            protocol_version: 0xFFFF_FFFF,
            session_caps: SessionCaps::GAMMA_RAY,
            platform_flags: PlatformFlags::BTLE,
            response_version: 2,
            major_version: 3,
            minor_version: 0,
            bugfix_version: 0,
            protocol_caps: [0xff; 8],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_with_unknown_tag_decodes_to_unparsed() {
        // length=2, endpoint 0x11, payload `01 00`.
        let payload = [0x01, 0x00];
        let decoded = PhoneAppVersion::from_bytes(&payload).unwrap();
        assert_eq!(decoded.tag, 0x01);
        assert_eq!(decoded.body, PhoneAppVersionBody::Unparsed(vec![0x00]));
    }

    #[test]
    fn response_round_trips() {
        let msg = generous_capabilities_response();
        let bytes = msg.to_bytes();
        assert_eq!(PhoneAppVersion::from_bytes(&bytes).unwrap(), msg);
    }
}
