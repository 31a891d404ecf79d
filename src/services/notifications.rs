//! Phone notifications (spec §4.7's sibling service), grounded in
//! `examples/original_source/libpebble2/services/notifications.py`'s
//! `Notifications.send_notification`. Only the modern (3.x+) path —
//! `_send_modern_notification`, a `TimelineItem` inserted into the
//! `Notification` BlobDB table — is implemented; the legacy path needs a
//! `LegacyNotification` packet this crate hasn't ported (see DESIGN.md,
//! same scoping call as `crate::services::app_install`).

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::error::Error;
use crate::packets::blobdb::BlobDatabaseId;
pub use crate::packets::blobdb::BlobStatus as NotificationStatus;
use crate::packets::timeline_action::{
    TimelineAction, TimelineActionType, TimelineAttribute, TimelineItem, TimelineItemType,
};
use crate::services::blobdb::BlobDbClient;

/// Mirrors `NotificationSource`'s numeric mapping in the original
/// (`source_map`): an opaque per-source icon id the watch looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSource {
    Email,
    Facebook,
    Sms,
    Twitter,
}

impl NotificationSource {
    fn icon_id(source: Option<Self>) -> u32 {
        match source {
            None => 1,
            Some(Self::Email) => 19,
            Some(Self::Facebook) => 11,
            Some(Self::Sms) => 45,
            Some(Self::Twitter) => 6,
        }
    }
}

const ATTR_SENDER: u8 = 0x01;
const ATTR_SUBJECT: u8 = 0x02;
const ATTR_MESSAGE: u8 = 0x03;
const ATTR_ICON: u8 = 0x04;

pub struct NotificationClient {
    blobdb: BlobDbClient,
}

impl NotificationClient {
    pub fn new(blobdb: BlobDbClient) -> Self {
        Self { blobdb }
    }

    /// Sends a notification, blocking until the watch acks or nacks the
    /// BlobDB insert. `actions` are appended after the implicit Dismiss
    /// action every notification gets, matching `additional_actions`.
    pub async fn send_notification(
        &self,
        subject: &str,
        message: &str,
        sender: &str,
        source: Option<NotificationSource>,
        actions: Vec<TimelineAction>,
    ) -> Result<NotificationStatus, Error> {
        let mut attributes = vec![
            TimelineAttribute {
                attribute_id: ATTR_SENDER,
                content: sender.as_bytes().to_vec(),
            },
            TimelineAttribute {
                attribute_id: ATTR_ICON,
                content: NotificationSource::icon_id(source).to_le_bytes().to_vec(),
            },
        ];
        if !message.is_empty() {
            attributes.push(TimelineAttribute {
                attribute_id: ATTR_MESSAGE,
                content: message.as_bytes().to_vec(),
            });
        }
        attributes.push(TimelineAttribute {
            attribute_id: ATTR_SUBJECT,
            content: subject.as_bytes().to_vec(),
        });

        let mut all_actions = vec![TimelineAction {
            action_id: 0,
            action_type: TimelineActionType::Dismiss,
            attributes: vec![TimelineAttribute {
                attribute_id: ATTR_SENDER,
                content: b"Dismiss".to_vec(),
            }],
        }];
        all_actions.extend(actions);

        let item_id = Uuid::new_v4();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        let item = TimelineItem {
            item_id,
            parent_id: Uuid::from_u128(0),
            timestamp,
            duration: 0,
            item_type: TimelineItemType::Notification,
            flags: 0,
            layout: 0x01,
            attributes,
            actions: all_actions,
        };

        self.blobdb
            .insert(BlobDatabaseId::Notification, item_id.as_bytes().to_vec(), item.to_bytes())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_id_matches_known_sources() {
        assert_eq!(NotificationSource::icon_id(None), 1);
        assert_eq!(NotificationSource::icon_id(Some(NotificationSource::Email)), 19);
        assert_eq!(NotificationSource::icon_id(Some(NotificationSource::Facebook)), 11);
        assert_eq!(NotificationSource::icon_id(Some(NotificationSource::Sms)), 45);
        assert_eq!(NotificationSource::icon_id(Some(NotificationSource::Twitter)), 6);
    }
}
