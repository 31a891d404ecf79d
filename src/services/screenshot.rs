//! The screenshot reader (spec §4.6's sibling service): requests a frame,
//! reassembles the multi-packet response on `endpoint::SCREENSHOT`, and
//! decodes it to RGB8 rows. Ported from
//! `examples/original_source/libpebble2/services/screenshot.py`'s
//! `grab_image`/`_read_screenshot`/`_decode_1bit`/`_decode_8bit` — the
//! "open the queue before sending the request" comment there is exactly
//! the race-avoidance pattern `Connection::fetch_watch_info` already uses.

use std::fmt;

use pebble_wire::Reader;
use tokio::time::Duration;

use crate::connection::Connection;
use crate::endpoint;
use crate::error::{Error, ProtocolError};
use crate::event_bus::{Event, EventKey};
use crate::packets::screenshot::{
    ScreenshotHeader, ScreenshotRequest, ScreenshotResponseCode,
};
use crate::registry::{PacketKind, WatchEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotError {
    MalformedCommand,
    OutOfMemory,
    AlreadyInProgress,
    UnsupportedVersion(u32),
}

impl fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCommand => write!(f, "watch reported a malformed screenshot command"),
            Self::OutOfMemory => write!(f, "watch is out of memory for a screenshot"),
            Self::AlreadyInProgress => write!(f, "a screenshot is already in progress"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported screenshot format version {v}"),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<ScreenshotResponseCode> for ScreenshotError {
    fn from(code: ScreenshotResponseCode) -> Self {
        match code {
            ScreenshotResponseCode::Ok => unreachable!("Ok is not an error"),
            ScreenshotResponseCode::MalformedCommand => Self::MalformedCommand,
            ScreenshotResponseCode::OutOfMemory => Self::OutOfMemory,
            ScreenshotResponseCode::AlreadyInProgress => Self::AlreadyInProgress,
        }
    }
}

/// One fully reassembled and decoded screenshot: RGB8 rows, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotImage {
    pub width: u32,
    pub height: u32,
    /// `height` rows, each `width * 3` bytes of R,G,B,R,G,B,...
    pub rows: Vec<Vec<u8>>,
}

pub struct ScreenshotClient {
    conn: Connection,
}

impl ScreenshotClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Requests and reassembles a screenshot. `on_progress(downloaded,
    /// total)` is called after every additional continuation frame, mirroring
    /// the Python client's `progress` event.
    pub async fn grab_image(
        &self,
        timeout: Duration,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<ScreenshotImage, Error> {
        let waiter = self.conn.event_bus().wait_for_event(EventKey::Watch(PacketKind::Screenshot), timeout);
        self.conn.send_packet(endpoint::SCREENSHOT, &ScreenshotRequest).await?;
        let first = Self::frame_data(waiter.await?);

        let header = ScreenshotHeader::decode(&mut Reader::new(&first))?;
        if header.response_code != ScreenshotResponseCode::Ok {
            return Err(ProtocolError::Screenshot(header.response_code.into()).into());
        }

        let expected_size = expected_bytes(header.version, header.width, header.height)?;
        let mut data = header.data;
        while data.len() < expected_size {
            let event = self.conn.read_from_endpoint(PacketKind::Screenshot, timeout).await?;
            data.extend_from_slice(&Self::frame_data(event));
            on_progress(data.len(), expected_size);
        }

        let rows = decode_image(header.version, header.width, header.height, &data)?;
        Ok(ScreenshotImage { width: header.width, height: header.height, rows })
    }

    fn frame_data(event: Event) -> Vec<u8> {
        let Event::Watch(WatchEvent::Screenshot(response)) = event else {
            unreachable!("wait_for_event/read_from_endpoint only return events matching their key");
        };
        response.data
    }
}

fn expected_bytes(version: u32, width: u32, height: u32) -> Result<usize, Error> {
    match version {
        1 => Ok((width as usize * height as usize) / 8),
        2 => Ok(width as usize * height as usize),
        other => Err(ProtocolError::Screenshot(ScreenshotError::UnsupportedVersion(other)).into()),
    }
}

fn decode_image(version: u32, width: u32, height: u32, data: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    match version {
        1 => Ok(decode_1bit(width, height, data)),
        2 => Ok(decode_8bit(width, height, data)),
        other => Err(ProtocolError::Screenshot(ScreenshotError::UnsupportedVersion(other)).into()),
    }
}

fn decode_1bit(width: u32, height: u32, data: &[u8]) -> Vec<Vec<u8>> {
    let width = width as usize;
    let row_bytes = width / 8;
    (0..height as usize)
        .map(|row| {
            let mut row_values = Vec::with_capacity(width * 3);
            for column in 0..width {
                let byte = data[row * row_bytes + column / 8];
                let pixel = (byte >> (column % 8)) & 1;
                let sample = pixel * 255;
                row_values.extend_from_slice(&[sample, sample, sample]);
            }
            row_values
        })
        .collect()
}

fn decode_8bit(width: u32, height: u32, data: &[u8]) -> Vec<Vec<u8>> {
    let width = width as usize;
    (0..height as usize)
        .map(|row| {
            let mut row_values = Vec::with_capacity(width * 3);
            for column in 0..width {
                let pixel = data[row * width + column];
                row_values.push(((pixel >> 4) & 0b11) * 85);
                row_values.push(((pixel >> 2) & 0b11) * 85);
                row_values.push((pixel & 0b11) * 85);
            }
            row_values
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_bytes_matches_each_version_formula() {
        assert_eq!(expected_bytes(1, 144, 168).unwrap(), (144 * 168) / 8);
        assert_eq!(expected_bytes(2, 144, 168).unwrap(), 144 * 168);
        assert!(expected_bytes(3, 1, 1).is_err());
    }

    #[test]
    fn decode_1bit_unpacks_lsb_first() {
        // One row, 8 columns, byte 0b0000_0011 -> first two columns lit.
        let rows = decode_1bit(8, 1, &[0b0000_0011]);
        assert_eq!(rows[0][0..3], [255, 255, 255]);
        assert_eq!(rows[0][3..6], [255, 255, 255]);
        assert_eq!(rows[0][6..9], [0, 0, 0]);
    }

    #[test]
    fn decode_8bit_expands_2bit_channels() {
        // 0b11_10_01 -> r=0b11=255, g=0b10=170, b=0b01=85.
        let rows = decode_8bit(1, 1, &[0b0011_1001]);
        assert_eq!(rows[0], vec![255, 170, 85]);
    }
}
