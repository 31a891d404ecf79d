//! QEMU emulator transport: a TCP socket carrying
//! `u16 0xFEED || u16 protocol || u16 length || length bytes || u16 0xBEEF`
//! frames. Protocol `1` carries raw Pebble Protocol bytes; other protocol
//! ids carry synthetic sensor/control events the emulator's UI can inject
//! (tap, compass, battery, ...).
//!
//! The exact numeric protocol ids for the non-watch event kinds are not
//! present in the retrieved reference sources (only their names are, in
//! spec §4.3); the assignment below is a documented best-effort guess, not
//! a verified firmware contract — see DESIGN.md, in the same spirit as
//! `crate::packets::timeline_action`'s equivalent disclaimer.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::Error;
use crate::transport::{
    AccelSample, SendTarget, Transport, TransportEvent, TransportMessage, TransportOrigin,
};

const HEADER_MAGIC: u16 = 0xFEED;
const FOOTER_MAGIC: u16 = 0xBEEF;

const PROTOCOL_SPP: u16 = 1;
const PROTOCOL_TAP: u16 = 2;
const PROTOCOL_BUTTON: u16 = 3;
const PROTOCOL_BATTERY: u16 = 4;
const PROTOCOL_ACCEL: u16 = 5;
const PROTOCOL_VIBRATION: u16 = 6;
const PROTOCOL_COMPASS: u16 = 7;
const PROTOCOL_TIME_FORMAT: u16 = 8;
const PROTOCOL_TIMELINE_PEEK: u16 = 9;
const PROTOCOL_CONTENT_SIZE: u16 = 10;

pub struct QemuTransport {
    addr: String,
    socket: Option<TcpStream>,
}

impl QemuTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            socket: None,
        }
    }

    fn socket_mut(&mut self) -> Result<&mut TcpStream, Error> {
        self.socket.as_mut().ok_or(Error::NotConnected)
    }

    fn decode_event(protocol: u16, body: &[u8]) -> Option<TransportEvent> {
        let mut r = pebble_wire::Reader::new(body);
        use pebble_wire::Endian;
        Some(match protocol {
            PROTOCOL_TAP => TransportEvent::Tap {
                axis: r.read_i8().ok()?,
                direction: r.read_i8().ok()?,
            },
            PROTOCOL_BUTTON => TransportEvent::Button {
                button: r.read_u8().ok()?,
                pressed: r.read_bool().ok()?,
            },
            PROTOCOL_BATTERY => TransportEvent::Battery {
                percent: r.read_u8().ok()?,
                charging: r.read_bool().ok()?,
                plugged: r.read_bool().ok()?,
            },
            PROTOCOL_ACCEL => {
                let mut samples = Vec::new();
                while r.remaining() >= 6 {
                    samples.push(AccelSample {
                        x: r.read_i16(Endian::Big).ok()?,
                        y: r.read_i16(Endian::Big).ok()?,
                        z: r.read_i16(Endian::Big).ok()?,
                    });
                }
                TransportEvent::Accelerometer { samples }
            }
            PROTOCOL_VIBRATION => {
                let on = r.read_bool().ok()?;
                // Some firmware revisions append a duration; others don't.
                let duration_ms = r.read_optional(|r| r.read_u32(Endian::Big)).ok()?;
                TransportEvent::Vibration { on, duration_ms }
            }
            PROTOCOL_COMPASS => TransportEvent::Compass {
                heading: r.read_u32(Endian::Big).ok()?,
                calibrated: r.read_bool().ok()?,
            },
            PROTOCOL_TIME_FORMAT => TransportEvent::TimeFormat {
                is_24h: r.read_bool().ok()?,
            },
            PROTOCOL_TIMELINE_PEEK => TransportEvent::TimelinePeek {
                layout: r.read_u8().ok()?,
                timeout_ms: r.read_u32(Endian::Big).ok()?,
            },
            PROTOCOL_CONTENT_SIZE => TransportEvent::ContentSize {
                width: r.read_u16(Endian::Big).ok()?,
                height: r.read_u16(Endian::Big).ok()?,
            },
            _ => return None,
        })
    }
}

#[async_trait]
impl Transport for QemuTransport {
    fn must_initialize(&self) -> bool {
        true
    }

    async fn connect(&mut self) -> Result<(), Error> {
        self.socket = Some(TcpStream::connect(&self.addr).await?);
        Ok(())
    }

    fn connected(&self) -> bool {
        self.socket.is_some()
    }

    async fn read_packet(&mut self) -> Result<TransportMessage, Error> {
        let socket = self.socket_mut()?;

        let mut prefix = [0u8; 6];
        socket.read_exact(&mut prefix).await?;
        let header_magic = u16::from_be_bytes([prefix[0], prefix[1]]);
        let protocol = u16::from_be_bytes([prefix[2], prefix[3]]);
        let length = u16::from_be_bytes([prefix[4], prefix[5]]) as usize;

        if header_magic != HEADER_MAGIC {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "QEMU frame missing 0xFEED header magic",
            )
            .into());
        }

        let mut body = vec![0u8; length];
        socket.read_exact(&mut body).await?;

        let mut footer = [0u8; 2];
        socket.read_exact(&mut footer).await?;
        if u16::from_be_bytes(footer) != FOOTER_MAGIC {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "QEMU frame missing 0xBEEF footer magic",
            )
            .into());
        }

        if protocol == PROTOCOL_SPP {
            return Ok(TransportMessage::Watch(body));
        }

        match Self::decode_event(protocol, &body) {
            Some(event) => Ok(TransportMessage::Other(TransportOrigin::Qemu, event)),
            None => {
                log::warn!("qemu: unrecognised protocol {protocol}, dropping {} bytes", body.len());
                // Recurse to fetch the next real message instead of
                // surfacing a dead frame to the caller.
                Box::pin(self.read_packet()).await
            }
        }
    }

    async fn send_packet(&mut self, framed: &[u8], target: SendTarget) -> Result<(), Error> {
        debug_assert_eq!(target, SendTarget::Watch, "QEMU only relays to the watch");
        let socket = self.socket_mut()?;

        let mut out = Vec::with_capacity(6 + framed.len() + 2);
        out.extend_from_slice(&HEADER_MAGIC.to_be_bytes());
        out.extend_from_slice(&PROTOCOL_SPP.to_be_bytes());
        out.extend_from_slice(&(framed.len() as u16).to_be_bytes());
        out.extend_from_slice(framed);
        out.extend_from_slice(&FOOTER_MAGIC.to_be_bytes());

        socket.write_all(&out).await?;
        Ok(())
    }
}
