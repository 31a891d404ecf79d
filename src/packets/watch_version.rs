//! `0x0010` watch version: request/response.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum HardwarePlatform {
    Unknown = 0,
    Tintin = 1,
    Bigboard = 2,
    Snowy = 6,
    Spalding = 7,
    Silk = 8,
    Robert = 9,
    Asterix = 10,
    Obelix = 11,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub timestamp: u32,
    /// Human-readable version tag, e.g. `"v4.3"`. Stored on the wire as a
    /// fixed 32-byte, NUL-padded field.
    pub version_tag: String,
    /// Short commit hash, fixed 8 bytes.
    pub commit_hash: String,
    pub is_recovery: bool,
    pub hardware_platform: HardwarePlatform,
    pub metadata_version: u8,
}

const VERSION_TAG_LEN: usize = 32;
const COMMIT_HASH_LEN: usize = 8;

impl FirmwareVersion {
    fn encode(&self, w: &mut Writer) {
        w.write_u32(self.timestamp, Endian::Big);
        w.write_fixed_string(&self.version_tag, VERSION_TAG_LEN);
        w.write_fixed_string(&self.commit_hash, COMMIT_HASH_LEN);
        w.write_bool(self.is_recovery);
        w.write_enum_u8(&self.hardware_platform);
        w.write_u8(self.metadata_version);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            timestamp: r.read_u32(Endian::Big)?,
            version_tag: r.read_fixed_string(VERSION_TAG_LEN)?,
            commit_hash: r.read_fixed_string(COMMIT_HASH_LEN)?,
            is_recovery: r.read_bool()?,
            hardware_platform: r.read_enum_u8()?,
            metadata_version: r.read_u8()?,
        })
    }
}

/// Host→watch: no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchVersionRequest;

impl Packet for WatchVersionRequest {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, _w: &mut Writer) {}

    fn decode(_r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self)
    }
}

/// Watch→host, registered for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchVersionResponse {
    pub running: FirmwareVersion,
    pub recovery: FirmwareVersion,
    pub bootloader_timestamp: u32,
    /// Board revision string, e.g. `"EVT2"`.
    pub hw_version: String,
    pub language_name: String,
    pub language_version: u16,
}

const HW_VERSION_LEN: usize = 9;

impl Packet for WatchVersionResponse {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        self.running.encode(w);
        self.recovery.encode(w);
        w.write_u32(self.bootloader_timestamp, Endian::Big);
        w.write_fixed_string(&self.hw_version, HW_VERSION_LEN);
        w.write_pascal_string(&self.language_name, false, false);
        w.write_u16(self.language_version, Endian::Big);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let running = FirmwareVersion::decode(r)?;
        let recovery = FirmwareVersion::decode(r)?;
        let bootloader_timestamp = r.read_u32(Endian::Big)?;
        let hw_version = r.read_fixed_string(HW_VERSION_LEN)?;
        let language_name = r.read_pascal_string(false, false)?;
        let language_version = r.read_u16(Endian::Big)?;
        Ok(Self {
            running,
            recovery,
            bootloader_timestamp,
            hw_version,
            language_name,
            language_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fw() -> FirmwareVersion {
        FirmwareVersion {
            timestamp: 0x1234_5678,
            version_tag: "v4.3".to_owned(),
            commit_hash: "deadbeef".to_owned(),
            is_recovery: false,
            hardware_platform: HardwarePlatform::Snowy,
            metadata_version: 1,
        }
    }

    #[test]
    fn response_round_trips() {
        let resp = WatchVersionResponse {
            running: sample_fw(),
            recovery: sample_fw(),
            bootloader_timestamp: 0xAABB_CCDD,
            hw_version: "EVT2".to_owned(),
            language_name: "en_US".to_owned(),
            language_version: 1,
        };

        let bytes = resp.to_bytes();
        assert_eq!(WatchVersionResponse::from_bytes(&bytes).unwrap(), resp);
    }

    #[test]
    fn request_has_no_body() {
        assert!(WatchVersionRequest.to_bytes().is_empty());
    }
}
