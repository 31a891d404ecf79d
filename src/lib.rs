//! Host-side library for the Pebble smartwatch's framed binary control
//! protocol ("Pebble Protocol").
//!
//! The crate is layered bottom-up, mirroring `ethercrab`'s split between a
//! wire-format crate (`ethercrab-wire`) and the client/connection crate that
//! builds on it:
//!
//! - [`pebble_wire`] (a separate crate in this workspace) is the field
//!   kernel: per-field encode/decode, endianness resolution, the `Packet`
//!   trait every packet type implements.
//! - [`packets`] is the packet schema layer: one module per endpoint,
//!   hand-written against `pebble_wire::{Reader, Writer}`.
//! - [`registry`] is the endpoint → packet-kind dispatch table.
//! - [`framing`] reassembles a raw byte stream into discrete
//!   `length || endpoint || payload` frames.
//! - [`transport`] is the uniform `connect`/`read_packet`/`send_packet`
//!   interface over serial, WebSocket, QEMU and PULSE links.
//! - [`connection`] is the connection core: pulls bytes off a transport,
//!   reassembles and decodes them, dispatches through [`event_bus`].
//! - [`services`] are the protocol engines built on top of a `Connection`:
//!   PutBytes, BlobDB, screenshots, notifications, voice, data logging, app
//!   installation.

pub mod bundle;
pub mod config;
pub mod connection;
pub mod crc;
pub mod endpoint;
pub mod error;
pub mod event_bus;
pub mod framing;
pub mod packets;
pub mod registry;
pub mod services;
pub mod transport;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{Error, ProtocolError};
pub use event_bus::{Event, EventKey, EventQueue, HandlerId};
pub use registry::{PacketKind, WatchEvent};
