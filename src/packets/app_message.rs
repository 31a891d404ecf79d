//! `0x0030` app message (little-endian): push a typed tuple dictionary to
//! or from an app, acked/nacked by a shared `transaction_id`.
//!
//! `AppMessagePush`'s dictionary is encoded as a pascal list: a one-byte
//! element count followed by tuples that are each length-prefixed by
//! their own `length` field. A variant that instead count-prefixes the
//! whole dictionary with a leading `u8` and no per-tuple pascal framing
//! is not implemented (see DESIGN.md).

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum TupleType {
    ByteArray = 0,
    CString = 1,
    Uint = 2,
    Int = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMessageTuple {
    pub key: u32,
    pub kind: TupleType,
    pub data: Vec<u8>,
}

const E: Endian = Endian::Little;

impl AppMessageTuple {
    fn encode(&self, w: &mut Writer) {
        w.write_u32(self.key, E);
        w.write_enum_u8(&self.kind);
        if self.data.len() > u16::MAX as usize {
            panic!("app message tuple data exceeds u16 length");
        }
        w.write_u16(self.data.len() as u16, E);
        w.write_bytes(&self.data);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let key = r.read_u32(E)?;
        let kind = r.read_enum_u8()?;
        let length = r.read_u16(E)? as usize;
        let data = r.read_bytes(length)?.to_vec();
        Ok(Self { key, kind, data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMessagePush {
    pub uuid: Uuid,
    pub dictionary: Vec<AppMessageTuple>,
}

impl AppMessagePush {
    fn encode(&self, w: &mut Writer) {
        w.write_uuid(self.uuid.as_bytes());
        if self.dictionary.len() > 255 {
            panic!("app message dictionary has more than 255 tuples");
        }
        w.write_u8(self.dictionary.len() as u8);
        for t in &self.dictionary {
            t.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let uuid = Uuid::from_bytes(r.read_uuid()?);
        let count = r.read_u8()? as usize;
        let mut dictionary = Vec::with_capacity(count);
        for _ in 0..count {
            dictionary.push(AppMessageTuple::decode(r)?);
        }
        Ok(Self { uuid, dictionary })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessageBody {
    Push(AppMessagePush),
    Ack,
    Nack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMessage {
    pub transaction_id: u8,
    pub body: AppMessageBody,
}

impl AppMessage {
    fn command(&self) -> u8 {
        match &self.body {
            AppMessageBody::Push(_) => 0x01,
            AppMessageBody::Ack => 0x03,
            AppMessageBody::Nack => 0x04,
        }
    }
}

impl Packet for AppMessage {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command());
        w.write_u8(self.transaction_id);
        if let AppMessageBody::Push(push) = &self.body {
            push.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command = r.read_u8()?;
        let transaction_id = r.read_u8()?;
        let body = match command {
            0x01 => AppMessageBody::Push(AppMessagePush::decode(r)?),
            0x03 => AppMessageBody::Ack,
            0x04 => AppMessageBody::Nack,
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { transaction_id, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_round_trips() {
        let msg = AppMessage {
            transaction_id: 5,
            body: AppMessageBody::Ack,
        };
        assert_eq!(msg.to_bytes(), [0x03, 0x05]);
        assert_eq!(AppMessage::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn push_with_mixed_tuple_types_round_trips() {
        let msg = AppMessage {
            transaction_id: 1,
            body: AppMessageBody::Push(AppMessagePush {
                uuid: Uuid::from_u128(1),
                dictionary: vec![
                    AppMessageTuple {
                        key: 0,
                        kind: TupleType::CString,
                        data: b"hello\0".to_vec(),
                    },
                    AppMessageTuple {
                        key: 1,
                        kind: TupleType::Uint,
                        data: vec![42],
                    },
                ],
            }),
        };
        assert_eq!(AppMessage::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
