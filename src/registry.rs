//! The endpoint → packet-kind dispatch table.
//!
//! The source registers each "register"-flagged packet class into a global
//! table at class-definition time; here that becomes an explicit `match` in
//! [`decode`], built once at compile time rather than populated at runtime.
//! [`PacketKind`] is the compile-time enum of dispatchable packet kinds the
//! connection core keys its watch-endpoint events on (`crate::event_bus`'s
//! `EventKey::Watch` variant), in place of the source's duck-typed
//! `(endpoint, class)` tuples.

use pebble_wire::{Packet, WireError};

use crate::endpoint;
use crate::packets::{
    app_fetch::AppFetchRequest,
    app_logs::AppLogMessage,
    app_message::AppMessage,
    app_run_state::AppRunState,
    blobdb::BlobResponse,
    data_logging::DataLogging,
    legacy_app_launch::LegacyAppLaunch,
    logs::LogShipping,
    music_control::MusicControl,
    phone_app_version::PhoneAppVersion,
    phone_notification::PhoneNotification,
    ping_pong::PingPong,
    putbytes::PutBytesResponse,
    screenshot::ScreenshotResponse,
    system_message::SystemMessage,
    time::TimeMessage,
    timeline_action::TimelineActionInvoke,
    voice_control::VoiceControlCommand,
    watch_version::WatchVersionResponse,
};

/// One variant per endpoint registered for watch→host dispatch. Used as the
/// `Watch` half of [`crate::event_bus::EventKey`]; never constructed
/// directly by callers, only matched on events they've subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Time,
    WatchVersion,
    PhoneAppVersion,
    SystemMessage,
    MusicControl,
    PhoneNotification,
    AppMessage,
    LegacyAppLaunch,
    AppRunState,
    Logs,
    AppLogMessage,
    Screenshot,
    AppFetchRequest,
    DataLogging,
    VoiceControlCommand,
    TimelineActionInvoke,
    PingPong,
    BlobResponse,
    PutBytesResponse,
}

/// A decoded watch-bound packet, tagged by the endpoint it arrived on.
/// `crate::connection::Connection::dispatch` wraps one of these into
/// `Event::Watch` and broadcasts it keyed by its `PacketKind`.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Time(TimeMessage),
    WatchVersion(WatchVersionResponse),
    PhoneAppVersion(PhoneAppVersion),
    SystemMessage(SystemMessage),
    MusicControl(MusicControl),
    PhoneNotification(PhoneNotification),
    AppMessage(AppMessage),
    LegacyAppLaunch(LegacyAppLaunch),
    AppRunState(AppRunState),
    Logs(LogShipping),
    AppLogMessage(AppLogMessage),
    Screenshot(ScreenshotResponse),
    AppFetchRequest(AppFetchRequest),
    DataLogging(DataLogging),
    VoiceControlCommand(VoiceControlCommand),
    TimelineActionInvoke(TimelineActionInvoke),
    PingPong(PingPong),
    BlobResponse(BlobResponse),
    PutBytesResponse(PutBytesResponse),
}

impl WatchEvent {
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Time(_) => PacketKind::Time,
            Self::WatchVersion(_) => PacketKind::WatchVersion,
            Self::PhoneAppVersion(_) => PacketKind::PhoneAppVersion,
            Self::SystemMessage(_) => PacketKind::SystemMessage,
            Self::MusicControl(_) => PacketKind::MusicControl,
            Self::PhoneNotification(_) => PacketKind::PhoneNotification,
            Self::AppMessage(_) => PacketKind::AppMessage,
            Self::LegacyAppLaunch(_) => PacketKind::LegacyAppLaunch,
            Self::AppRunState(_) => PacketKind::AppRunState,
            Self::Logs(_) => PacketKind::Logs,
            Self::AppLogMessage(_) => PacketKind::AppLogMessage,
            Self::Screenshot(_) => PacketKind::Screenshot,
            Self::AppFetchRequest(_) => PacketKind::AppFetchRequest,
            Self::DataLogging(_) => PacketKind::DataLogging,
            Self::VoiceControlCommand(_) => PacketKind::VoiceControlCommand,
            Self::TimelineActionInvoke(_) => PacketKind::TimelineActionInvoke,
            Self::PingPong(_) => PacketKind::PingPong,
            Self::BlobResponse(_) => PacketKind::BlobResponse,
            Self::PutBytesResponse(_) => PacketKind::PutBytesResponse,
        }
    }
}

/// Looks up `endpoint` in the dispatch table and decodes `payload` against
/// the registered packet kind. `Ok(None)` means the endpoint carries no
/// registered (watch→host) packet kind — the caller logs and drops, per
/// spec §4.4 ("Unknown endpoints are logged and dropped — never fatal").
pub fn decode(endpoint: u16, payload: &[u8]) -> Result<Option<WatchEvent>, WireError> {
    let event = match endpoint {
        endpoint::TIME => WatchEvent::Time(TimeMessage::from_bytes(payload)?),
        endpoint::WATCH_VERSION => WatchEvent::WatchVersion(WatchVersionResponse::from_bytes(payload)?),
        endpoint::PHONE_APP_VERSION => {
            WatchEvent::PhoneAppVersion(PhoneAppVersion::from_bytes(payload)?)
        }
        endpoint::SYSTEM_MESSAGE => WatchEvent::SystemMessage(SystemMessage::from_bytes(payload)?),
        endpoint::MUSIC_CONTROL => WatchEvent::MusicControl(MusicControl::from_bytes(payload)?),
        endpoint::PHONE_NOTIFICATION => {
            WatchEvent::PhoneNotification(PhoneNotification::from_bytes(payload)?)
        }
        endpoint::APP_MESSAGE => WatchEvent::AppMessage(AppMessage::from_bytes(payload)?),
        endpoint::LEGACY_APP_LAUNCH => {
            WatchEvent::LegacyAppLaunch(LegacyAppLaunch::from_bytes(payload)?)
        }
        endpoint::APP_RUN_STATE => WatchEvent::AppRunState(AppRunState::from_bytes(payload)?),
        endpoint::LOGS => WatchEvent::Logs(LogShipping::from_bytes(payload)?),
        endpoint::APP_LOGS => WatchEvent::AppLogMessage(AppLogMessage::from_bytes(payload)?),
        endpoint::SCREENSHOT => WatchEvent::Screenshot(ScreenshotResponse::from_bytes(payload)?),
        // 0x1771 is shared with `AppFetchResponse`, which is host→watch and
        // unregistered; only the watch→host request decodes here.
        endpoint::APP_FETCH => WatchEvent::AppFetchRequest(AppFetchRequest::from_bytes(payload)?),
        endpoint::DATA_LOGGING => WatchEvent::DataLogging(DataLogging::from_bytes(payload)?),
        endpoint::VOICE_CONTROL => {
            WatchEvent::VoiceControlCommand(VoiceControlCommand::from_bytes(payload)?)
        }
        endpoint::TIMELINE_ACTION => {
            WatchEvent::TimelineActionInvoke(TimelineActionInvoke::from_bytes(payload)?)
        }
        endpoint::PING_PONG => WatchEvent::PingPong(PingPong::from_bytes(payload)?),
        endpoint::BLOBDB => WatchEvent::BlobResponse(BlobResponse::from_bytes(payload)?),
        endpoint::PUTBYTES => WatchEvent::PutBytesResponse(PutBytesResponse::from_bytes(payload)?),
        // AUDIO_STREAM, BLE_CONTROL, Reset and the unregistered half of
        // AppFetch/PhoneAppVersion/PutBytes/BlobDB carry no registered
        // watch→host decode.
        _ => return Ok(None),
    };
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::ping_pong::PingPongKind;

    #[test]
    fn unregistered_endpoint_yields_none() {
        assert!(decode(endpoint::BLE_CONTROL, &[]).unwrap().is_none());
    }

    #[test]
    fn registered_endpoint_decodes_and_reports_its_kind() {
        let msg = PingPong {
            kind: PingPongKind::Ping,
            cookie: 7,
        };
        let event = decode(endpoint::PING_PONG, &msg.to_bytes()).unwrap().unwrap();
        assert_eq!(event.kind(), PacketKind::PingPong);
    }
}
