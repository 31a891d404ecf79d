//! `0x2cb0` timeline action (little-endian).
//!
//! No message on this endpoint is present in the retrieved reference
//! sources — only the *stored* [`TimelineAction`]/[`TimelineAttribute`]
//! blob layout (the shape a `TimelineItem` serializes into for BlobDB) is.
//! The invoke request/response below reuses that attribute encoding,
//! which is the one piece of concrete evidence available for what a watch
//! asking the host to run an action looks like on the wire. Treat the
//! exact tag layout as a documented best-effort rather than a verified
//! firmware contract.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineAttribute {
    pub attribute_id: u8,
    pub content: Vec<u8>,
}

impl TimelineAttribute {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.attribute_id);
        w.write_u16(self.content.len() as u16, Endian::Little);
        w.write_bytes(&self.content);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let attribute_id = r.read_u8()?;
        let length = r.read_u16(Endian::Little)? as usize;
        Ok(Self {
            attribute_id,
            content: r.read_bytes(length)?.to_vec(),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum TimelineActionType {
    AncsDismiss = 0x01,
    Generic = 0x02,
    Response = 0x03,
    Dismiss = 0x04,
    Http = 0x05,
    Snooze = 0x06,
    OpenWatchapp = 0x07,
    Empty = 0x08,
}

/// The stored form of an action inside a [`TimelineItem`]'s blob, grounded
/// on `examples/original_source/libpebble2/protocol/timeline.py`'s
/// `TimelineAction`: an 8-bit id, an 8-bit type, and a count-prefixed list
/// of attributes. Distinct from [`TimelineActionInvoke`], which is the
/// watch's later *use* of one of these actions, not its storage shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineAction {
    pub action_id: u8,
    pub action_type: TimelineActionType,
    pub attributes: Vec<TimelineAttribute>,
}

impl TimelineAction {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.action_id);
        w.write_enum_u8(&self.action_type);
        assert!(self.attributes.len() <= 255, "timeline action exceeds 255 attributes");
        w.write_u8(self.attributes.len() as u8);
        for attr in &self.attributes {
            attr.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let action_id = r.read_u8()?;
        let action_type = r.read_enum_u8()?;
        let count = r.read_u8()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            attributes.push(TimelineAttribute::decode(r)?);
        }
        Ok(Self {
            action_id,
            action_type,
            attributes,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum TimelineItemType {
    Notification = 1,
    Pin = 2,
    Reminder = 3,
}

/// A BlobDB `Notification`/`Pin`/`Reminder` database row: the value half
/// of an `insert(database, item_id, TimelineItem::to_bytes())` call, per
/// `examples/original_source/libpebble2/protocol/timeline.py`'s
/// `TimelineItem`. `attributes` and `actions` are each a fixed list bounded
/// by both a count and a shared byte-length field — the two lists are
/// concatenated and `data_length` covers both of them together, not one
/// each (spec §3's "bounded by both a count field and a byte-length
/// field").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineItem {
    pub item_id: uuid::Uuid,
    pub parent_id: uuid::Uuid,
    pub timestamp: u32,
    pub duration: u16,
    pub item_type: TimelineItemType,
    pub flags: u16,
    pub layout: u8,
    pub attributes: Vec<TimelineAttribute>,
    pub actions: Vec<TimelineAction>,
}

impl Packet for TimelineItem {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_uuid(self.item_id.as_bytes());
        w.write_uuid(self.parent_id.as_bytes());
        w.write_u32(self.timestamp, Endian::Little);
        w.write_u16(self.duration, Endian::Little);
        w.write_enum_u8(&self.item_type);
        w.write_u16(self.flags, Endian::Little);
        w.write_u8(self.layout);

        let mut data = Writer::new();
        for attr in &self.attributes {
            attr.encode(&mut data);
        }
        for action in &self.actions {
            action.encode(&mut data);
        }
        let data = data.into_vec();

        assert!(data.len() <= u16::MAX as usize, "timeline item payload exceeds 65535 bytes");
        assert!(self.attributes.len() <= 255, "timeline item exceeds 255 attributes");
        assert!(self.actions.len() <= 255, "timeline item exceeds 255 actions");
        w.write_u16(data.len() as u16, Endian::Little);
        w.write_u8(self.attributes.len() as u8);
        w.write_u8(self.actions.len() as u8);
        w.write_bytes(&data);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let item_id = uuid::Uuid::from_bytes(r.read_uuid()?);
        let parent_id = uuid::Uuid::from_bytes(r.read_uuid()?);
        let timestamp = r.read_u32(Endian::Little)?;
        let duration = r.read_u16(Endian::Little)?;
        let item_type = r.read_enum_u8()?;
        let flags = r.read_u16(Endian::Little)?;
        let layout = r.read_u8()?;
        let data_length = r.read_u16(Endian::Little)? as usize;
        let attribute_count = r.read_u8()?;
        let action_count = r.read_u8()?;

        let mut data = r.sub_reader(data_length)?;
        let mut attributes = Vec::with_capacity(attribute_count as usize);
        for _ in 0..attribute_count {
            attributes.push(TimelineAttribute::decode(&mut data)?);
        }
        let mut actions = Vec::with_capacity(action_count as usize);
        for _ in 0..action_count {
            actions.push(TimelineAction::decode(&mut data)?);
        }

        Ok(Self {
            item_id,
            parent_id,
            timestamp,
            duration,
            item_type,
            flags,
            layout,
            attributes,
            actions,
        })
    }
}

/// Watch→host: the user picked an action on a timeline item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineActionInvoke {
    pub item_id: Uuid,
    pub action_id: u8,
    pub action_type: TimelineActionType,
    pub attributes: Vec<TimelineAttribute>,
}

impl Packet for TimelineActionInvoke {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(0x02);
        w.write_uuid(self.item_id.as_bytes());
        w.write_u8(self.action_id);
        w.write_enum_u8(&self.action_type);
        if self.attributes.len() > 255 {
            panic!("timeline action invoke exceeds 255 attributes");
        }
        w.write_u8(self.attributes.len() as u8);
        for attr in &self.attributes {
            attr.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _command = r.read_u8()?;
        let item_id = Uuid::from_bytes(r.read_uuid()?);
        let action_id = r.read_u8()?;
        let action_type = r.read_enum_u8()?;
        let count = r.read_u8()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            attributes.push(TimelineAttribute::decode(r)?);
        }
        Ok(Self {
            item_id,
            action_id,
            action_type,
            attributes,
        })
    }
}

/// Host→watch: result of running the action, not registered for dispatch
/// (correlated to the invoke by `item_id` rather than a token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineActionResult {
    pub item_id: Uuid,
    pub success: bool,
    pub attributes: Vec<TimelineAttribute>,
}

impl Packet for TimelineActionResult {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(0x11);
        w.write_uuid(self.item_id.as_bytes());
        w.write_bool(self.success);
        if self.attributes.len() > 255 {
            panic!("timeline action result exceeds 255 attributes");
        }
        w.write_u8(self.attributes.len() as u8);
        for attr in &self.attributes {
            attr.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _command = r.read_u8()?;
        let item_id = Uuid::from_bytes(r.read_uuid()?);
        let success = r.read_bool()?;
        let count = r.read_u8()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            attributes.push(TimelineAttribute::decode(r)?);
        }
        Ok(Self {
            item_id,
            success,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_round_trips() {
        let msg = TimelineActionInvoke {
            item_id: Uuid::from_u128(1),
            action_id: 0,
            action_type: TimelineActionType::Dismiss,
            attributes: vec![TimelineAttribute {
                attribute_id: 0x01,
                content: b"Dismiss".to_vec(),
            }],
        };
        assert_eq!(TimelineActionInvoke::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn timeline_item_with_attributes_and_actions_round_trips() {
        let msg = TimelineItem {
            item_id: Uuid::from_u128(1),
            parent_id: Uuid::from_u128(0),
            timestamp: 1_700_000_000,
            duration: 0,
            item_type: TimelineItemType::Notification,
            flags: 0,
            layout: 0x01,
            attributes: vec![
                TimelineAttribute { attribute_id: 0x01, content: b"Alice".to_vec() },
                TimelineAttribute { attribute_id: 0x03, content: b"hello".to_vec() },
            ],
            actions: vec![TimelineAction {
                action_id: 0,
                action_type: TimelineActionType::Dismiss,
                attributes: vec![TimelineAttribute { attribute_id: 0x01, content: b"Dismiss".to_vec() }],
            }],
        };
        assert_eq!(TimelineItem::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn timeline_item_with_no_actions_round_trips() {
        let msg = TimelineItem {
            item_id: Uuid::from_u128(2),
            parent_id: Uuid::from_u128(0),
            timestamp: 0,
            duration: 0,
            item_type: TimelineItemType::Pin,
            flags: 0,
            layout: 0,
            attributes: vec![],
            actions: vec![],
        };
        assert_eq!(TimelineItem::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn result_round_trips() {
        let msg = TimelineActionResult {
            item_id: Uuid::from_u128(1),
            success: true,
            attributes: vec![],
        };
        assert_eq!(TimelineActionResult::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
