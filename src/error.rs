//! Top-level error type for `pebble-protocol`.
//!
//! Incomplete reads never reach here (they are handled internally by
//! [`crate::framing`]); malformed decodes and protocol/timeout/transport
//! failures each get their own variant so callers can match on what
//! actually happened.

use core::fmt;

use crate::services::blobdb::BlobDbStatus;

/// An error produced anywhere above the field kernel: framing, transports,
/// the connection core, or a service.
#[derive(Debug)]
pub enum Error {
    /// A packet failed to decode. At the framing layer this causes a
    /// resync; at the service layer it is logged and dropped.
    Wire(pebble_wire::WireError),
    /// A packet failed to encode.
    WireEncode(pebble_wire::WireEncodeError),
    /// The transport reported an I/O failure or a peer close.
    Transport(std::io::Error),
    /// A blocking wait (`wait_for_event`, a queue `get`, `SyncWrapper::wait`)
    /// exceeded its timeout.
    Timeout,
    /// The watch answered a request with an explicit failure status.
    Protocol(ProtocolError),
    /// The connection is not established; the operation requires a live
    /// transport.
    NotConnected,
    /// A PutBytes session was already in progress; only one may run at a
    /// time per connection.
    PutBytesBusy,
}

/// Peer-reported protocol errors: final, never retried.
#[derive(Debug)]
pub enum ProtocolError {
    /// PutBytes NACKed one of its four phases.
    PutBytes(crate::services::putbytes::PutBytesError),
    /// The watch returned a non-success BlobDB status.
    GetBytes(BlobDbStatus),
    /// App installation was rejected.
    AppInstall(String),
    /// The screenshot request failed.
    Screenshot(crate::services::screenshot::ScreenshotError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "decode error: {e}"),
            Self::WireEncode(e) => write!(f, "encode error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::Protocol(e) => write!(f, "protocol error: {e}"),
            Self::NotConnected => write!(f, "not connected to a watch"),
            Self::PutBytesBusy => write!(f, "a PutBytes session is already in progress"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PutBytes(e) => write!(f, "{e}"),
            Self::GetBytes(status) => write!(f, "blobdb request failed with status {status:?}"),
            Self::AppInstall(msg) => write!(f, "app install failed: {msg}"),
            Self::Screenshot(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ProtocolError {}

impl From<pebble_wire::WireError> for Error {
    fn from(e: pebble_wire::WireError) -> Self {
        Self::Wire(e)
    }
}

impl From<pebble_wire::WireEncodeError> for Error {
    fn from(e: pebble_wire::WireEncodeError) -> Self {
        Self::WireEncode(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}
