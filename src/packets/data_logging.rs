//! `0x1a7a` data logging (little-endian): despooling of on-watch log
//! sessions plus a small enable/disable side-channel, all tagged by one
//! `command` byte on a shared endpoint.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOpenSessions {
    pub sessions: Vec<u8>,
}

impl ReportOpenSessions {
    fn encode(&self, w: &mut Writer) {
        w.write_bytes(&self.sessions);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            sessions: r.read_bytes_to_end().to_vec(),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum DataLoggingItemType {
    ByteArray = 0x00,
    UnsignedInt = 0x02,
    SignedInt = 0x03,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DespoolOpenSession {
    pub session_id: u8,
    pub app_uuid: Uuid,
    pub timestamp: u32,
    pub log_tag: u32,
    pub data_item_type: DataLoggingItemType,
    pub data_item_size: u16,
}

impl DespoolOpenSession {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.session_id);
        w.write_uuid(self.app_uuid.as_bytes());
        w.write_u32(self.timestamp, Endian::Little);
        w.write_u32(self.log_tag, Endian::Little);
        w.write_enum_u8(&self.data_item_type);
        w.write_u16(self.data_item_size, Endian::Little);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            session_id: r.read_u8()?,
            app_uuid: Uuid::from_bytes(r.read_uuid()?),
            timestamp: r.read_u32(Endian::Little)?,
            log_tag: r.read_u32(Endian::Little)?,
            data_item_type: r.read_enum_u8()?,
            data_item_size: r.read_u16(Endian::Little)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DespoolSendData {
    pub session_id: u8,
    pub items_left: u32,
    pub crc: u32,
    pub data: Vec<u8>,
}

impl DespoolSendData {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.session_id);
        w.write_u32(self.items_left, Endian::Little);
        w.write_u32(self.crc, Endian::Little);
        w.write_bytes(&self.data);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            session_id: r.read_u8()?,
            items_left: r.read_u32(Endian::Little)?,
            crc: r.read_u32(Endian::Little)?,
            data: r.read_bytes_to_end().to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLoggingBody {
    DespoolOpenSession(DespoolOpenSession),
    DespoolSendData(DespoolSendData),
    CloseSession { session_id: u8 },
    ReportOpenSessions(ReportOpenSessions),
    Ack { session_id: u8 },
    Nack { session_id: u8 },
    Timeout,
    EmptySession { session_id: u8 },
    GetSendEnableRequest,
    GetSendEnableResponse { enabled: bool },
    SetSendEnable { enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLogging {
    pub body: DataLoggingBody,
}

impl DataLogging {
    fn command(&self) -> u8 {
        match &self.body {
            DataLoggingBody::DespoolOpenSession(_) => 0x01,
            DataLoggingBody::DespoolSendData(_) => 0x02,
            DataLoggingBody::CloseSession { .. } => 0x03,
            DataLoggingBody::ReportOpenSessions(_) => 0x84,
            DataLoggingBody::Ack { .. } => 0x85,
            DataLoggingBody::Nack { .. } => 0x86,
            DataLoggingBody::Timeout => 0x07,
            DataLoggingBody::EmptySession { .. } => 0x88,
            DataLoggingBody::GetSendEnableRequest => 0x89,
            DataLoggingBody::GetSendEnableResponse { .. } => 0x0a,
            DataLoggingBody::SetSendEnable { .. } => 0x8b,
        }
    }
}

impl Packet for DataLogging {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command());
        match &self.body {
            DataLoggingBody::DespoolOpenSession(b) => b.encode(w),
            DataLoggingBody::DespoolSendData(b) => b.encode(w),
            DataLoggingBody::CloseSession { session_id }
            | DataLoggingBody::Ack { session_id }
            | DataLoggingBody::Nack { session_id }
            | DataLoggingBody::EmptySession { session_id } => w.write_u8(*session_id),
            DataLoggingBody::ReportOpenSessions(b) => b.encode(w),
            DataLoggingBody::Timeout | DataLoggingBody::GetSendEnableRequest => {}
            DataLoggingBody::GetSendEnableResponse { enabled } | DataLoggingBody::SetSendEnable { enabled } => {
                w.write_bool(*enabled);
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command = r.read_u8()?;
        let body = match command {
            0x01 => DataLoggingBody::DespoolOpenSession(DespoolOpenSession::decode(r)?),
            0x02 => DataLoggingBody::DespoolSendData(DespoolSendData::decode(r)?),
            0x03 => DataLoggingBody::CloseSession { session_id: r.read_u8()? },
            0x84 => DataLoggingBody::ReportOpenSessions(ReportOpenSessions::decode(r)?),
            0x85 => DataLoggingBody::Ack { session_id: r.read_u8()? },
            0x86 => DataLoggingBody::Nack { session_id: r.read_u8()? },
            0x07 => DataLoggingBody::Timeout,
            0x88 => DataLoggingBody::EmptySession { session_id: r.read_u8()? },
            0x89 => DataLoggingBody::GetSendEnableRequest,
            0x0a => DataLoggingBody::GetSendEnableResponse { enabled: r.read_bool()? },
            0x8b => DataLoggingBody::SetSendEnable { enabled: r.read_bool()? },
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despool_send_data_round_trips() {
        let msg = DataLogging {
            body: DataLoggingBody::DespoolSendData(DespoolSendData {
                session_id: 3,
                items_left: 10,
                crc: 0xdead_beef,
                data: vec![9, 9, 9],
            }),
        };
        assert_eq!(DataLogging::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn report_open_sessions_round_trips() {
        let msg = DataLogging {
            body: DataLoggingBody::ReportOpenSessions(ReportOpenSessions { sessions: vec![1, 2, 3] }),
        };
        assert_eq!(DataLogging::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn set_send_enable_round_trips() {
        let msg = DataLogging {
            body: DataLoggingBody::SetSendEnable { enabled: true },
        };
        assert_eq!(DataLogging::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
