//! Data logging (spec §6, endpoint `0x1a7a`): listing and downloading
//! on-watch log sessions, plus the send-enable side channel. Grounded on
//! `examples/original_source/libpebble2/services/data_logging.py`'s
//! `DataLoggingService` — its `list`/`download` open an endpoint queue
//! before sending the triggering request, the same race-avoidance pattern
//! this crate's other services get from `wait_for_event`, expressed here
//! with a queue since a session scan can see any number of reports before
//! it's considered finished.

use tokio::time::Duration;

use crate::connection::Connection;
use crate::endpoint;
use crate::error::Error;
use crate::event_bus::Event;
use crate::packets::data_logging::{
    DataLogging, DataLoggingBody, DataLoggingItemType, DespoolOpenSession, ReportOpenSessions,
};
use crate::registry::{PacketKind, WatchEvent};
use uuid::Uuid;

/// One session reported by `ReportOpenSessions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: u8,
    pub app_uuid: Uuid,
    pub timestamp: u32,
    pub log_tag: u32,
    pub data_item_type: DataLoggingItemType,
    pub data_item_size: u16,
}

impl From<DespoolOpenSession> for SessionInfo {
    fn from(s: DespoolOpenSession) -> Self {
        Self {
            session_id: s.session_id,
            app_uuid: s.app_uuid,
            timestamp: s.timestamp,
            log_tag: s.log_tag,
            data_item_type: s.data_item_type,
            data_item_size: s.data_item_size,
        }
    }
}

pub struct DataLoggingClient {
    conn: Connection,
}

impl DataLoggingClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    async fn send(&self, body: DataLoggingBody) -> Result<(), Error> {
        self.conn.send_packet(endpoint::DATA_LOGGING, &DataLogging { body }).await
    }

    /// Lists every currently open session, acking each `DespoolOpenSession`
    /// report as it arrives (an unacked report is retransmitted by the
    /// watch, per the original). The scan ends once `scan_timeout` passes
    /// with nothing further reported.
    pub async fn list(&self, scan_timeout: Duration) -> Result<Vec<SessionInfo>, Error> {
        let mut queue = self.conn.get_endpoint_queue(PacketKind::DataLogging);
        self.send(DataLoggingBody::ReportOpenSessions(ReportOpenSessions { sessions: Vec::new() }))
            .await?;

        let mut sessions = Vec::new();
        loop {
            let event = match queue.get(scan_timeout).await {
                Ok(event) => event,
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            };
            let Event::Watch(WatchEvent::DataLogging(msg)) = event else { continue };
            if let DataLoggingBody::DespoolOpenSession(open) = msg.body {
                self.send(DataLoggingBody::Ack { session_id: open.session_id }).await?;
                sessions.push(open.into());
            }
        }
        queue.close();
        Ok(sessions)
    }

    /// Downloads one session's accumulated log data: scans for it among the
    /// open sessions, then repeatedly requests an empty-out until two
    /// consecutive scan timeouts pass with nothing further sent (the
    /// original's `timeout_count >= 2` give-up threshold). Returns `None`
    /// if the session was never reported open.
    pub async fn download(
        &self,
        session_id: u8,
        scan_timeout: Duration,
    ) -> Result<Option<(SessionInfo, Vec<u8>)>, Error> {
        let mut queue = self.conn.get_endpoint_queue(PacketKind::DataLogging);
        self.send(DataLoggingBody::ReportOpenSessions(ReportOpenSessions { sessions: Vec::new() }))
            .await?;

        let mut session = None;
        loop {
            let event = match queue.get(scan_timeout).await {
                Ok(event) => event,
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            };
            let Event::Watch(WatchEvent::DataLogging(msg)) = event else { continue };
            if let DataLoggingBody::DespoolOpenSession(open) = msg.body {
                self.send(DataLoggingBody::Ack { session_id: open.session_id }).await?;
                if session.is_none() && open.session_id == session_id {
                    session = Some(SessionInfo::from(open));
                }
            }
        }

        let Some(session) = session else {
            queue.close();
            return Ok(None);
        };

        self.send(DataLoggingBody::EmptySession { session_id }).await?;
        let mut data: Option<Vec<u8>> = None;
        let mut consecutive_timeouts = 0;
        loop {
            let event = match queue.get(scan_timeout).await {
                Ok(event) => {
                    consecutive_timeouts = 0;
                    event
                }
                Err(Error::Timeout) => {
                    consecutive_timeouts += 1;
                    if consecutive_timeouts >= 2 {
                        break;
                    }
                    self.send(DataLoggingBody::EmptySession { session_id }).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let Event::Watch(WatchEvent::DataLogging(msg)) = event else { continue };
            if let DataLoggingBody::DespoolSendData(send) = msg.body {
                if send.session_id != session_id {
                    self.send(DataLoggingBody::Nack { session_id: send.session_id }).await?;
                } else {
                    data.get_or_insert_with(Vec::new).extend_from_slice(&send.data);
                    self.send(DataLoggingBody::Ack { session_id }).await?;
                }
            }
        }
        queue.close();
        Ok(Some((session, data.unwrap_or_default())))
    }

    /// Blocks until the watch answers whether sending is enabled.
    pub async fn get_send_enable(&self, timeout: Duration) -> Result<bool, Error> {
        let mut queue = self.conn.get_endpoint_queue(PacketKind::DataLogging);
        self.send(DataLoggingBody::GetSendEnableRequest).await?;
        loop {
            let event = queue.get(timeout).await?;
            let Event::Watch(WatchEvent::DataLogging(msg)) = event else { continue };
            if let DataLoggingBody::GetSendEnableResponse { enabled } = msg.body {
                queue.close();
                return Ok(enabled);
            }
        }
    }

    pub async fn set_send_enable(&self, enabled: bool) -> Result<(), Error> {
        self.send(DataLoggingBody::SetSendEnable { enabled }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_info_carries_open_session_fields_through() {
        let open = DespoolOpenSession {
            session_id: 3,
            app_uuid: Uuid::from_u128(9),
            timestamp: 100,
            log_tag: 7,
            data_item_type: DataLoggingItemType::UnsignedInt,
            data_item_size: 4,
        };
        let info = SessionInfo::from(open.clone());
        assert_eq!(info.session_id, open.session_id);
        assert_eq!(info.app_uuid, open.app_uuid);
        assert_eq!(info.data_item_size, open.data_item_size);
    }
}
