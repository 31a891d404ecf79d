//! PULSE (PPoPULSE) transport: an opcode-framed reliable link layered over a
//! raw byte stream (typically the same serial cable, once PULSE has taken
//! it over from plain serial). Every frame is `u8 opcode || body`, with
//! three opcodes: `DATA = 1` (carries one Pebble Protocol frame), `OPEN = 2`
//! (handshake request/ack, no body) and `CLOSE = 3` (no body).
//!
//! `connect` performs the OPEN handshake itself, bounded by
//! `ConnectionConfig::pulse_open_timeout`; outbound frames are chunked to
//! `ConnectionConfig::pulse_mtu` and reassembled transparently on read, the
//! same split-then-rejoin strategy `ethercrab`'s mailbox layer uses for
//! payloads larger than its SubDevice's mailbox size.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::SerialPortBuilderExt;

use crate::config::ConnectionConfig;
use crate::error::Error;
use crate::transport::{SendTarget, Transport, TransportMessage};

const OPCODE_DATA: u8 = 1;
const OPCODE_OPEN: u8 = 2;
const OPCODE_CLOSE: u8 = 3;

const BAUD_RATE: u32 = 115_200;

pub struct PulseTransport {
    path: String,
    port: Option<tokio_serial::SerialStream>,
    open_timeout: std::time::Duration,
    mtu: usize,
}

impl PulseTransport {
    pub fn new(path: impl Into<String>, config: &ConnectionConfig) -> Self {
        Self {
            path: path.into(),
            port: None,
            open_timeout: config.pulse_open_timeout,
            mtu: config.pulse_mtu,
        }
    }

    fn port_mut(&mut self) -> Result<&mut tokio_serial::SerialStream, Error> {
        self.port.as_mut().ok_or(Error::NotConnected)
    }

    async fn read_frame(port: &mut tokio_serial::SerialStream) -> Result<(u8, Vec<u8>), Error> {
        let mut header = [0u8; 1 + 2];
        port.read_exact(&mut header).await?;
        let opcode = header[0];
        let len = u16::from_be_bytes([header[1], header[2]]) as usize;
        let mut body = vec![0u8; len];
        port.read_exact(&mut body).await?;
        Ok((opcode, body))
    }

    async fn write_frame(
        port: &mut tokio_serial::SerialStream,
        opcode: u8,
        body: &[u8],
    ) -> Result<(), Error> {
        let mut out = Vec::with_capacity(3 + body.len());
        out.push(opcode);
        out.extend_from_slice(&(body.len() as u16).to_be_bytes());
        out.extend_from_slice(body);
        port.write_all(&out).await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for PulseTransport {
    fn must_initialize(&self) -> bool {
        true
    }

    async fn connect(&mut self) -> Result<(), Error> {
        let mut port = tokio_serial::new(&self.path, BAUD_RATE)
            .open_native_async()
            .map_err(|e| Error::Transport(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

        Self::write_frame(&mut port, OPCODE_OPEN, &[]).await?;
        let (opcode, _) = timeout(self.open_timeout, Self::read_frame(&mut port))
            .await
            .map_err(|_| Error::Timeout)??;
        if opcode != OPCODE_OPEN {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "PULSE peer did not acknowledge OPEN",
            )
            .into());
        }

        self.port = Some(port);
        Ok(())
    }

    fn connected(&self) -> bool {
        self.port.is_some()
    }

    async fn read_packet(&mut self) -> Result<TransportMessage, Error> {
        let mut reassembled = Vec::new();
        loop {
            let port = self.port_mut()?;
            let (opcode, body) = Self::read_frame(port).await?;
            match opcode {
                OPCODE_DATA => {
                    let done = body.len() < self.mtu;
                    reassembled.extend_from_slice(&body);
                    if done {
                        return Ok(TransportMessage::Watch(reassembled));
                    }
                }
                OPCODE_CLOSE => {
                    self.port = None;
                    return Err(Error::NotConnected);
                }
                OPCODE_OPEN => {
                    // A re-handshake from the peer mid-session; ack and keep
                    // waiting for real data.
                    let port = self.port_mut()?;
                    Self::write_frame(port, OPCODE_OPEN, &[]).await?;
                }
                _ => {
                    log::warn!("pulse: unrecognised opcode {opcode}, dropping {} bytes", body.len());
                }
            }
        }
    }

    async fn send_packet(&mut self, framed: &[u8], target: SendTarget) -> Result<(), Error> {
        debug_assert_eq!(target, SendTarget::Watch, "PULSE only speaks to the watch");
        let mtu = self.mtu;
        for chunk in framed.chunks(mtu) {
            let port = self.port_mut()?;
            Self::write_frame(port, OPCODE_DATA, chunk).await?;
        }
        // A chunk exactly filling the MTU is indistinguishable from "more
        // data follows" on read; a final empty DATA frame disambiguates.
        if !framed.is_empty() && framed.len() % mtu == 0 {
            let port = self.port_mut()?;
            Self::write_frame(port, OPCODE_DATA, &[]).await?;
        }
        Ok(())
    }
}
