//! `0xb1db` BlobDB (little-endian): a token-correlated key/value store
//! exposed on the watch for pins, reminders, notifications and the app
//! glance. `BlobCommand` is host→watch and not registered for dispatch;
//! `BlobResponse` is watch→host and is, correlated back to the request by
//! `token`. `crate::services::blobdb` owns token generation and retries.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertCommand {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl InsertCommand {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.key.len() as u8);
        w.write_bytes(&self.key);
        w.write_u16(self.value.len() as u16, Endian::Little);
        w.write_bytes(&self.value);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let key_size = r.read_u8()? as usize;
        let key = r.read_bytes(key_size)?.to_vec();
        let value_size = r.read_u16(Endian::Little)? as usize;
        let value = r.read_bytes(value_size)?.to_vec();
        Ok(Self { key, value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCommand {
    pub key: Vec<u8>,
}

impl DeleteCommand {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.key.len() as u8);
        w.write_bytes(&self.key);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let key_size = r.read_u8()? as usize;
        Ok(Self {
            key: r.read_bytes(key_size)?.to_vec(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearCommand;

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum BlobDatabaseId {
    Test = 0,
    Pin = 1,
    App = 2,
    Reminder = 3,
    Notification = 4,
    Weather = 5,
    AppGlance = 6,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobCommandBody {
    Insert(InsertCommand),
    Delete(DeleteCommand),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobCommand {
    pub token: u16,
    pub database: BlobDatabaseId,
    pub body: BlobCommandBody,
}

impl BlobCommand {
    fn command(&self) -> u8 {
        match &self.body {
            BlobCommandBody::Insert(_) => 0x01,
            BlobCommandBody::Delete(_) => 0x04,
            BlobCommandBody::Clear => 0x05,
        }
    }
}

impl Packet for BlobCommand {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command());
        w.write_u16(self.token, Endian::Little);
        w.write_enum_u8(&self.database);
        match &self.body {
            BlobCommandBody::Insert(b) => b.encode(w),
            BlobCommandBody::Delete(b) => b.encode(w),
            BlobCommandBody::Clear => {}
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command = r.read_u8()?;
        let token = r.read_u16(Endian::Little)?;
        let database = r.read_enum_u8()?;
        let body = match command {
            0x01 => BlobCommandBody::Insert(InsertCommand::decode(r)?),
            0x04 => BlobCommandBody::Delete(DeleteCommand::decode(r)?),
            0x05 => BlobCommandBody::Clear,
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { token, database, body })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum BlobStatus {
    Success = 0x01,
    GeneralFailure = 0x02,
    InvalidOperation = 0x03,
    InvalidDatabaseId = 0x04,
    InvalidData = 0x05,
    KeyDoesNotExist = 0x06,
    DatabaseFull = 0x07,
    DataStale = 0x08,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobResponse {
    pub token: u16,
    pub response: BlobStatus,
}

impl Packet for BlobResponse {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.token, Endian::Little);
        w.write_enum_u8(&self.response);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            token: r.read_u16(Endian::Little)?,
            response: r.read_enum_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_round_trips() {
        let msg = BlobCommand {
            token: 42,
            database: BlobDatabaseId::Pin,
            body: BlobCommandBody::Insert(InsertCommand {
                key: vec![1, 2, 3],
                value: vec![4, 5, 6, 7],
            }),
        };
        assert_eq!(BlobCommand::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn clear_round_trips() {
        let msg = BlobCommand {
            token: 7,
            database: BlobDatabaseId::AppGlance,
            body: BlobCommandBody::Clear,
        };
        assert_eq!(BlobCommand::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn response_round_trips() {
        let msg = BlobResponse {
            token: 42,
            response: BlobStatus::Success,
        };
        assert_eq!(BlobResponse::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
