//! `0x0bb8` screenshot request/response. The response comes back as a
//! stream of frames sharing this one endpoint: the first carries a
//! [`ScreenshotHeader`] describing the image, subsequent ones are raw
//! continuation bytes. `crate::services::screenshot` reassembles them.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

/// Host→watch: no body beyond the implicit command byte. Not registered
/// for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenshotRequest;

impl Packet for ScreenshotRequest {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(0x00);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _command = r.read_u8()?;
        Ok(Self)
    }
}

/// Watch→host, registered for dispatch. Every frame on this endpoint
/// decodes to one of these; only the first carries [`ScreenshotHeader`]
/// fields (spec: `crate::services::screenshot` is the one that knows which
/// frame is first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotResponse {
    pub data: Vec<u8>,
}

impl Packet for ScreenshotResponse {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_bytes(&self.data);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            data: r.read_bytes_to_end().to_vec(),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum ScreenshotResponseCode {
    Ok = 0,
    MalformedCommand = 1,
    OutOfMemory = 2,
    AlreadyInProgress = 3,
}

/// Layout of the first response frame's payload: not an endpoint of its
/// own — it's `ScreenshotResponse::data`'s own schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotHeader {
    pub response_code: ScreenshotResponseCode,
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ScreenshotHeader {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            response_code: r.read_enum_u8()?,
            version: r.read_u32(Endian::Big)?,
            width: r.read_u32(Endian::Big)?,
            height: r.read_u32(Endian::Big)?,
            data: r.read_bytes_to_end().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        assert_eq!(ScreenshotRequest.to_bytes(), [0x00]);
        assert_eq!(ScreenshotRequest::from_bytes(&[0x00]).unwrap(), ScreenshotRequest);
    }

    #[test]
    fn header_parses_out_of_a_response_frame() {
        let mut header_bytes = vec![0x00];
        header_bytes.extend_from_slice(&2u32.to_be_bytes());
        header_bytes.extend_from_slice(&144u32.to_be_bytes());
        header_bytes.extend_from_slice(&168u32.to_be_bytes());
        header_bytes.extend_from_slice(&[1, 2, 3]);

        let resp = ScreenshotResponse::from_bytes(&header_bytes).unwrap();
        let mut r = Reader::new(&resp.data);
        let header = ScreenshotHeader::decode(&mut r).unwrap();
        assert_eq!(header.response_code, ScreenshotResponseCode::Ok);
        assert_eq!(header.width, 144);
        assert_eq!(header.data, vec![1, 2, 3]);
    }
}
