//! Voice session correlation (spec §4.6's sibling service), grounded in
//! `examples/original_source/libpebble2/services/voice.py`'s
//! `VoiceService`. The Python class tracks one session id as mutable
//! instance state guarded implicitly by running on a single event-dispatch
//! thread; here that becomes a `std::sync::Mutex<Option<Session>>` since
//! the event bus can invoke the handler from any task.
//!
//! Audio-frame correlation (`_handle_audio`/`send_stop_audio`) is not
//! implemented: it needs `AudioStream` registered as a dispatchable
//! [`crate::registry::PacketKind`], which it currently is not (see
//! `crate::packets::audio_stream`'s module doc). Session setup and its two
//! host→watch results (`send_session_setup_result`/`send_dictation_result`)
//! don't depend on that and are fully implemented below.

use std::sync::Mutex;

use uuid::Uuid;

use crate::connection::Connection;
use crate::endpoint;
use crate::error::Error;
use crate::event_bus::Event;
use crate::packets::voice_control::{
    flags, Attribute, AttributeData, AttributeList, AttributeType, DictationResult, SentenceList,
    SessionSetupResult, SessionType, Transcription, VoiceControlBody, VoiceControlCommand,
    VoiceControlResult, VoiceControlResultBody, VoiceResult,
};
use crate::registry::{PacketKind, WatchEvent};

const SESSION_ID_INVALID: u16 = 0;

/// A validated, in-progress dictation session: the watch asked to set one
/// up and the request passed every check `_handle_session_setup` makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSession {
    pub session_id: u16,
    pub app_uuid: Option<Uuid>,
}

pub struct VoiceSessionClient {
    conn: Connection,
    session: Mutex<Option<VoiceSession>>,
}

impl VoiceSessionClient {
    /// Registers the session-setup handler and returns the client. A
    /// session setup that fails `_handle_session_setup`'s validation chain
    /// is silently dropped, exactly as the Python original does — there is
    /// no NACK on this endpoint.
    pub fn new(conn: Connection) -> std::sync::Arc<Self> {
        let client = std::sync::Arc::new(Self {
            conn: conn.clone(),
            session: Mutex::new(None),
        });
        let handler_client = client.clone();
        conn.register_endpoint(PacketKind::VoiceControlCommand, move |event| {
            let Event::Watch(WatchEvent::VoiceControlCommand(cmd)) = event else {
                return;
            };
            handler_client.handle_command(cmd);
        });
        client
    }

    fn handle_command(&self, cmd: &VoiceControlCommand) {
        let VoiceControlBody::SessionSetup(setup) = &cmd.body;
        if setup.session_type != SessionType::Dictation
            || setup.session_id == SESSION_ID_INVALID
            || setup.attributes.attributes.is_empty()
        {
            return;
        }
        let Some(AttributeData::SpeexEncoderInfo(_)) = setup.attributes.get(AttributeType::SpeexEncoderInfo) else {
            return;
        };

        if self.session.lock().unwrap().is_some() {
            // A session is already open; spec/original both drop a second
            // setup request rather than replacing it.
            return;
        }

        let app_initiated = cmd.flags & flags::APP_INITIATED != 0;
        let app_uuid = match setup.attributes.get(AttributeType::AppUuid) {
            Some(AttributeData::AppUuid(uuid)) => Some(*uuid),
            _ => None,
        };
        if app_initiated != app_uuid.is_some() {
            return;
        }

        *self.session.lock().unwrap() = Some(VoiceSession {
            session_id: setup.session_id,
            app_uuid,
        });
    }

    /// The currently open session, if any.
    pub fn current_session(&self) -> Option<VoiceSession> {
        self.session.lock().unwrap().clone()
    }

    /// Answers a session setup request. Does not require a session to
    /// currently be open — this is the reply to the setup request itself.
    pub async fn send_session_setup_result(
        &self,
        result: VoiceResult,
        app_uuid: Option<Uuid>,
    ) -> Result<(), Error> {
        let response_flags = if app_uuid.is_some() { flags::APP_INITIATED } else { 0 };
        let packet = VoiceControlResult {
            flags: response_flags,
            body: VoiceControlResultBody::SessionSetup(SessionSetupResult {
                session_type: SessionType::Dictation,
                result,
            }),
        };
        self.conn.send_packet(endpoint::VOICE_CONTROL, &packet).await
    }

    /// Sends the transcribed result for the currently open session and
    /// closes it, matching `send_dictation_result`'s session-id-then-clear
    /// sequencing.
    pub async fn send_dictation_result(
        &self,
        result: VoiceResult,
        sentences: Option<SentenceList>,
        app_uuid: Option<Uuid>,
    ) -> Result<(), Error> {
        let session_id = {
            let mut guard = self.session.lock().unwrap();
            let Some(session) = guard.take() else {
                return Err(Error::NotConnected);
            };
            session.session_id
        };

        let mut attributes = Vec::new();
        if let Some(uuid) = app_uuid {
            attributes.push(Attribute {
                id: AttributeType::AppUuid,
                data: AttributeData::AppUuid(uuid),
            });
        }
        if result == VoiceResult::Success {
            if let Some(sentences) = sentences {
                if !sentences.sentences.is_empty() {
                    attributes.push(Attribute {
                        id: AttributeType::Transcription,
                        data: AttributeData::Transcription(Transcription { sentences }),
                    });
                }
            }
        }

        let response_flags = if app_uuid.is_some() { flags::APP_INITIATED } else { 0 };
        let packet = VoiceControlResult {
            flags: response_flags,
            body: VoiceControlResultBody::Dictation(DictationResult {
                session_id,
                result,
                attributes: AttributeList { attributes },
            }),
        };
        self.conn.send_packet(endpoint::VOICE_CONTROL, &packet).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_invalid_is_zero() {
        assert_eq!(SESSION_ID_INVALID, 0);
    }
}
