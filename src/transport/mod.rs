//! The transport abstraction: a uniform `connect`/`read_packet`/`send_packet`
//! interface over the four links a Pebble can be reached on, grounded on
//! `ethercrab`'s per-platform `src/std/*` socket wrappers (there, one
//! `connect`-and-frame interface over raw Ethernet sockets; here, over
//! serial, WebSocket, QEMU and PULSE sockets instead). `ethercrab` itself
//! never needs `async`, since its sole transport is a blocking raw socket
//! read loop driven from its own thread; this crate's four transports are
//! genuinely concurrent I/O, so each is written against `tokio` instead, the
//! "cooperative runtime" realization spec §5 allows.
//!
//! Trait objects (`Box<dyn Transport>`) let `Connection` pick its transport
//! at construction time rather than being generic over it — matching spec
//! §4.3's "all transports implement..." phrasing, which describes one
//! runtime-selectable interface, not four generic instantiations.

mod pulse;
mod qemu;
mod serial;
mod websocket;

pub use pulse::PulseTransport;
pub use qemu::QemuTransport;
pub use serial::SerialTransport;
pub use websocket::WebSocketTransport;

use async_trait::async_trait;

use crate::error::Error;

/// Where a non-watch-origin payload came from. Used as the `Transport` half
/// of `crate::event_bus::EventKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOrigin {
    /// A phone-directed control message relayed over the WebSocket
    /// transport's non-`0x01` sub-endpoints.
    Phone,
    /// A synthetic sensor/control event from the QEMU emulator transport.
    Qemu,
}

/// One read from a transport: either raw watch-bound bytes (fed to the
/// framing/codec layer) or a non-watch event broadcast straight onto the
/// event bus.
#[derive(Debug, Clone)]
pub enum TransportMessage {
    Watch(Vec<u8>),
    Other(TransportOrigin, TransportEvent),
}

/// Discriminant of [`TransportEvent`], used to key `EventKey::Transport`
/// broadcasts without cloning the payload just to match on its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportPayloadKind {
    ConnectionStatusUpdate,
    PhoneInfo,
    InstallStatus,
    TimelinePin,
    Tap,
    Compass,
    Battery,
    Accelerometer,
    Button,
    TimeFormat,
    TimelinePeek,
    ContentSize,
    Vibration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// A non-watch transport event: WebSocket phone-directed control messages,
/// or QEMU synthetic sensor/control events (spec §4.3).
#[derive(Debug, Clone)]
pub enum TransportEvent {
    ConnectionStatusUpdate(ConnectionStatus),
    /// Opaque phone-info control payload; the phone-app-layer schema for
    /// this sub-endpoint is outside the codec core (spec §1's "out of
    /// scope" collaborators).
    PhoneInfo(Vec<u8>),
    InstallStatus(Vec<u8>),
    TimelinePin(Vec<u8>),
    Tap { axis: i8, direction: i8 },
    Compass { heading: u32, calibrated: bool },
    Battery { percent: u8, charging: bool, plugged: bool },
    Accelerometer { samples: Vec<AccelSample> },
    Button { button: u8, pressed: bool },
    TimeFormat { is_24h: bool },
    TimelinePeek { layout: u8, timeout_ms: u32 },
    ContentSize { width: u16, height: u16 },
    /// The `QemuVibration` trailing boolean is present in some firmware
    /// revisions and absent in others (spec §9 Open Question); `on` is
    /// always read, `duration_ms` tolerates either shape.
    Vibration { on: bool, duration_ms: Option<u32> },
}

impl TransportEvent {
    pub fn kind(&self) -> TransportPayloadKind {
        match self {
            Self::ConnectionStatusUpdate(_) => TransportPayloadKind::ConnectionStatusUpdate,
            Self::PhoneInfo(_) => TransportPayloadKind::PhoneInfo,
            Self::InstallStatus(_) => TransportPayloadKind::InstallStatus,
            Self::TimelinePin(_) => TransportPayloadKind::TimelinePin,
            Self::Tap { .. } => TransportPayloadKind::Tap,
            Self::Compass { .. } => TransportPayloadKind::Compass,
            Self::Battery { .. } => TransportPayloadKind::Battery,
            Self::Accelerometer { .. } => TransportPayloadKind::Accelerometer,
            Self::Button { .. } => TransportPayloadKind::Button,
            Self::TimeFormat { .. } => TransportPayloadKind::TimeFormat,
            Self::TimelinePeek { .. } => TransportPayloadKind::TimelinePeek,
            Self::ContentSize { .. } => TransportPayloadKind::ContentSize,
            Self::Vibration { .. } => TransportPayloadKind::Vibration,
        }
    }
}

/// Where an outbound framed message should be delivered. Every transport
/// accepts `Watch`; only [`WebSocketTransport`] additionally accepts
/// `Phone`, routing to a phone-directed control sub-endpoint instead of the
/// `0x01` watch-relay one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTarget {
    Watch,
    /// WebSocket sub-endpoint byte for a phone-directed control write.
    Phone(u8),
}

#[async_trait]
pub trait Transport: Send {
    /// True if the host side must answer the watch's "phone app version"
    /// handshake itself rather than relying on a peer (e.g. a real phone on
    /// the other end of a WebSocket relay) to have already done so.
    ///
    /// A method rather than an associated `const`: `Connection` holds its
    /// transport as `Box<dyn Transport>`, and an associated const would make
    /// the trait object-unsafe.
    fn must_initialize(&self) -> bool;

    async fn connect(&mut self) -> Result<(), Error>;

    fn connected(&self) -> bool;

    /// Blocks until the next message is available. Returns
    /// `TransportMessage::Watch` with whatever raw bytes the link
    /// produced — not necessarily a whole frame — for the connection
    /// core's reassembly buffer to accumulate; or `Other` for an already
    /// fully-parsed non-watch event.
    async fn read_packet(&mut self) -> Result<TransportMessage, Error>;

    /// Sends one fully-framed message. Transports chunk internally as
    /// their link requires (QEMU frame envelope, PULSE MTU splitting);
    /// callers always pass one complete `length || endpoint || payload`
    /// frame.
    async fn send_packet(&mut self, framed: &[u8], target: SendTarget) -> Result<(), Error>;
}
