//! Bluetooth-serial transport: the classic 115200 8-N-1 link. Pebble
//! Protocol frames travel over it with no extra envelope, so `read_packet`
//! does the minimum parsing needed to know how many bytes make up one
//! frame, then hands the whole thing — header included — to the connection
//! core's reassembly buffer.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;

use crate::error::Error;
use crate::transport::{SendTarget, Transport, TransportMessage};

const BAUD_RATE: u32 = 115_200;

pub struct SerialTransport {
    path: String,
    port: Option<tokio_serial::SerialStream>,
}

impl SerialTransport {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            port: None,
        }
    }

    fn port_mut(&mut self) -> Result<&mut tokio_serial::SerialStream, Error> {
        self.port.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn must_initialize(&self) -> bool {
        true
    }

    async fn connect(&mut self) -> Result<(), Error> {
        let port = tokio_serial::new(&self.path, BAUD_RATE)
            .open_native_async()
            .map_err(|e| Error::Transport(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        self.port = Some(port);
        Ok(())
    }

    fn connected(&self) -> bool {
        self.port.is_some()
    }

    async fn read_packet(&mut self) -> Result<TransportMessage, Error> {
        let port = self.port_mut()?;

        let mut header = [0u8; 2];
        port.read_exact(&mut header).await?;
        let length = u16::from_be_bytes(header) as usize;

        // `endpoint` (2 bytes) plus `length` bytes of payload.
        let mut rest = vec![0u8; length + 2];
        port.read_exact(&mut rest).await?;

        let mut frame = Vec::with_capacity(4 + length);
        frame.extend_from_slice(&header);
        frame.extend_from_slice(&rest);
        Ok(TransportMessage::Watch(frame))
    }

    async fn send_packet(&mut self, framed: &[u8], target: SendTarget) -> Result<(), Error> {
        debug_assert_eq!(target, SendTarget::Watch, "serial only speaks to the watch");
        self.port_mut()?.write_all(framed).await?;
        Ok(())
    }
}
