//! `0x0021` phone notification: call control requests from the watch and
//! call-state pushes from the phone, tagged by a `command_id` byte with a
//! `cookie` correlating a call across its lifecycle.

use pebble_wire::{Endian, Packet, Reader, WireError, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCall {
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedCall {
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStateItem {
    pub cookie: u32,
    pub item: CallStateItemBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStateItemBody {
    IncomingCall(IncomingCall),
    OutgoingCall,
    CallStart,
}

impl CallStateItem {
    fn command_id(&self) -> u8 {
        match &self.item {
            CallStateItemBody::IncomingCall(_) => 0x04,
            CallStateItemBody::OutgoingCall => 0x05,
            CallStateItemBody::CallStart => 0x08,
        }
    }

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command_id());
        w.write_u32(self.cookie, Endian::Big);
        if let CallStateItemBody::IncomingCall(c) = &self.item {
            w.write_pascal_string(&c.number, false, false);
            w.write_pascal_string(&c.name, false, false);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command_id = r.read_u8()?;
        let cookie = r.read_u32(Endian::Big)?;
        let item = match command_id {
            0x04 => CallStateItemBody::IncomingCall(IncomingCall {
                number: r.read_pascal_string(false, false)?,
                name: r.read_pascal_string(false, false)?,
            }),
            0x05 => CallStateItemBody::OutgoingCall,
            0x08 => CallStateItemBody::CallStart,
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { cookie, item })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneNotificationBody {
    AnswerCall,
    HangUpCall,
    PhoneStateRequest,
    PhoneStateResponse { items: Vec<CallStateItem> },
    IncomingCall(IncomingCall),
    OutgoingCall,
    MissedCall(MissedCall),
    Ring,
    CallStart,
    CallEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNotification {
    pub cookie: u32,
    pub body: PhoneNotificationBody,
}

impl PhoneNotification {
    fn command_id(&self) -> u8 {
        match &self.body {
            PhoneNotificationBody::AnswerCall => 0x01,
            PhoneNotificationBody::HangUpCall => 0x02,
            PhoneNotificationBody::PhoneStateRequest => 0x03,
            PhoneNotificationBody::IncomingCall(_) => 0x04,
            PhoneNotificationBody::OutgoingCall => 0x05,
            PhoneNotificationBody::MissedCall(_) => 0x06,
            PhoneNotificationBody::Ring => 0x07,
            PhoneNotificationBody::CallStart => 0x08,
            PhoneNotificationBody::CallEnd => 0x09,
            PhoneNotificationBody::PhoneStateResponse { .. } => 0x83,
        }
    }
}

impl Packet for PhoneNotification {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command_id());
        w.write_u32(self.cookie, Endian::Big);
        match &self.body {
            PhoneNotificationBody::AnswerCall
            | PhoneNotificationBody::HangUpCall
            | PhoneNotificationBody::PhoneStateRequest
            | PhoneNotificationBody::OutgoingCall
            | PhoneNotificationBody::Ring
            | PhoneNotificationBody::CallStart
            | PhoneNotificationBody::CallEnd => {}
            PhoneNotificationBody::IncomingCall(c) => {
                w.write_pascal_string(&c.number, false, false);
                w.write_pascal_string(&c.name, false, false);
            }
            PhoneNotificationBody::MissedCall(c) => {
                w.write_pascal_string(&c.number, false, false);
                w.write_pascal_string(&c.name, false, false);
            }
            PhoneNotificationBody::PhoneStateResponse { items } => {
                if items.len() > 255 {
                    panic!("more than 255 call-state items");
                }
                w.write_u8(items.len() as u8);
                for item in items {
                    item.encode(w);
                }
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command_id = r.read_u8()?;
        let cookie = r.read_u32(Endian::Big)?;
        let body = match command_id {
            0x01 => PhoneNotificationBody::AnswerCall,
            0x02 => PhoneNotificationBody::HangUpCall,
            0x03 => PhoneNotificationBody::PhoneStateRequest,
            0x83 => {
                let count = r.read_u8()? as usize;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(CallStateItem::decode(r)?);
                }
                PhoneNotificationBody::PhoneStateResponse { items }
            }
            0x04 => PhoneNotificationBody::IncomingCall(IncomingCall {
                number: r.read_pascal_string(false, false)?,
                name: r.read_pascal_string(false, false)?,
            }),
            0x05 => PhoneNotificationBody::OutgoingCall,
            0x06 => PhoneNotificationBody::MissedCall(MissedCall {
                number: r.read_pascal_string(false, false)?,
                name: r.read_pascal_string(false, false)?,
            }),
            0x07 => PhoneNotificationBody::Ring,
            0x08 => PhoneNotificationBody::CallStart,
            0x09 => PhoneNotificationBody::CallEnd,
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { cookie, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_call_round_trips() {
        let msg = PhoneNotification {
            cookie: 42,
            body: PhoneNotificationBody::IncomingCall(IncomingCall {
                number: "+15551234".to_owned(),
                name: "Alice".to_owned(),
            }),
        };
        assert_eq!(PhoneNotification::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn phone_state_response_with_multiple_items_round_trips() {
        let msg = PhoneNotification {
            cookie: 7,
            body: PhoneNotificationBody::PhoneStateResponse {
                items: vec![
                    CallStateItem {
                        cookie: 1,
                        item: CallStateItemBody::CallStart,
                    },
                    CallStateItem {
                        cookie: 2,
                        item: CallStateItemBody::OutgoingCall,
                    },
                ],
            },
        };
        assert_eq!(PhoneNotification::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn unknown_command_id_is_a_decode_error() {
        let mut r = pebble_wire::Reader::new(&[0xff, 0, 0, 0, 0]);
        assert!(PhoneNotification::decode(&mut r).is_err());
    }
}
