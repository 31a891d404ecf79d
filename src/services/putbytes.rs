//! The chunked PutBytes uploader state machine (spec §4.6): one of the two
//! "reference protocol engines that exercise the codec end-to-end" spec.md
//! calls out by name. Drives `Init` → `Put`* → `Commit` → (optionally)
//! `Install` over `crate::packets::putbytes`, one session at a time per
//! connection, grounded in
//! `examples/original_source/libpebble2/services/putbytes.py`'s
//! `_prepare`/`_send_object`/`_commit`/`_install` phases, each of which is a
//! blocking "send and read the matching response" step there and an
//! event-bus wait here (same race-safe register-then-send pattern
//! `crate::connection::Connection::fetch_watch_info` uses).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::Duration;

use crate::connection::Connection;
use crate::crc::stm32_crc32;
use crate::endpoint;
use crate::error::{Error, ProtocolError};
use crate::event_bus::{Event, EventKey};
use crate::packets::putbytes::{
    ObjectType, PutBytes, PutBytesBody, PutBytesCommit, PutBytesInit,
    PutBytesInstall, PutBytesPut, PutBytesResponse, PutBytesResult, PutBytesTarget,
};
use crate::registry::{PacketKind, WatchEvent};

/// Which phase of a session a NACK (or any other local failure) happened
/// in, so callers can tell "the watch rejected this" from "which part".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutBytesPhase {
    Init,
    Put,
    Commit,
    Install,
}

impl fmt::Display for PutBytesPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Put => "put",
            Self::Commit => "commit",
            Self::Install => "install",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutBytesError {
    /// The watch answered a phase with `PutBytesResult::Nack`.
    Nacked(PutBytesPhase),
}

impl fmt::Display for PutBytesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nacked(phase) => write!(f, "watch nacked putbytes {phase} phase"),
        }
    }
}

impl std::error::Error for PutBytesError {}

/// Reported after each chunk is acked, so a caller can drive a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutBytesProgress {
    pub sent: usize,
    pub total: usize,
}

/// Drives PutBytes sessions over a [`Connection`]. Stateless between
/// sessions beyond the busy flag — everything else (cookie, bytes sent) is
/// local to one `upload` call.
#[derive(Clone)]
pub struct PutBytesClient {
    conn: Connection,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag on drop so an early return (error or otherwise)
/// can never leave the client permanently locked.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PutBytesClient {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uploads `data` as one PutBytes object. Only one session may run at a
    /// time per client (spec §4.6: "busy-flag enforced, not queued");
    /// concurrent callers get [`Error::PutBytesBusy`] immediately rather
    /// than waiting in line.
    pub async fn upload(
        &self,
        object_type: ObjectType,
        target: PutBytesTarget,
        data: &[u8],
        timeout: Duration,
        mut on_progress: impl FnMut(PutBytesProgress),
    ) -> Result<(), Error> {
        if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(Error::PutBytesBusy);
        }
        let _guard = BusyGuard(&self.busy);

        self.run_session(object_type, target, data, timeout, &mut on_progress).await
    }

    async fn run_session(
        &self,
        object_type: ObjectType,
        target: PutBytesTarget,
        data: &[u8],
        timeout: Duration,
        on_progress: &mut impl FnMut(PutBytesProgress),
    ) -> Result<(), Error> {
        let init = PutBytesInit {
            object_size: data.len() as u32,
            object_type,
            target,
        };
        let response = self.send_and_wait(PutBytesBody::Init(init), timeout).await?;
        Self::check_ack(response, PutBytesPhase::Init)?;
        let cookie = response.cookie;

        self.put_and_commit(cookie, data, timeout, on_progress).await?;

        let response = self
            .send_and_wait(PutBytesBody::Install(PutBytesInstall { cookie }), timeout)
            .await?;
        Self::check_ack(response, PutBytesPhase::Install)
    }

    async fn put_and_commit(
        &self,
        cookie: u32,
        data: &[u8],
        timeout: Duration,
        on_progress: &mut impl FnMut(PutBytesProgress),
    ) -> Result<(), Error> {
        let chunk_size = self.conn.config().putbytes_chunk_size;
        let total = data.len();
        let mut sent = 0;
        for chunk in data.chunks(chunk_size) {
            let response = self
                .send_and_wait(
                    PutBytesBody::Put(PutBytesPut {
                        cookie,
                        payload: chunk.to_vec(),
                    }),
                    timeout,
                )
                .await?;
            Self::check_ack(response, PutBytesPhase::Put)?;
            sent += chunk.len();
            on_progress(PutBytesProgress { sent, total });
        }

        let response = self
            .send_and_wait(
                PutBytesBody::Commit(PutBytesCommit {
                    cookie,
                    object_crc: stm32_crc32(data),
                }),
                timeout,
            )
            .await?;
        Self::check_ack(response, PutBytesPhase::Commit)
    }

    fn check_ack(response: PutBytesResponse, phase: PutBytesPhase) -> Result<(), Error> {
        match response.result {
            PutBytesResult::Ack => Ok(()),
            PutBytesResult::Nack => {
                Err(ProtocolError::PutBytes(PutBytesError::Nacked(phase)).into())
            }
        }
    }

    /// Registers the wait before sending, per the race-avoidance pattern
    /// `Connection::fetch_watch_info` uses: a response that arrives between
    /// "send" and "start waiting" would otherwise be lost.
    async fn send_and_wait(&self, body: PutBytesBody, timeout: Duration) -> Result<PutBytesResponse, Error> {
        let waiter = self
            .conn
            .event_bus()
            .wait_for_event(EventKey::Watch(PacketKind::PutBytesResponse), timeout);
        self.send(body).await?;
        let event = waiter.await?;
        let Event::Watch(WatchEvent::PutBytesResponse(response)) = event else {
            unreachable!("wait_for_event only returns events matching its key");
        };
        Ok(response)
    }

    async fn send(&self, body: PutBytesBody) -> Result<(), Error> {
        self.conn.send_packet(endpoint::PUTBYTES, &PutBytes { body }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(PutBytesPhase::Commit.to_string(), "commit");
    }

    #[test]
    fn nack_error_names_its_phase() {
        let err = PutBytesError::Nacked(PutBytesPhase::Put);
        assert_eq!(err.to_string(), "watch nacked putbytes put phase");
    }
}
