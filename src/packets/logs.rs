//! `0x07d0` logs: flash-resident log shipping, tagged by `command`.

use pebble_wire::{Endian, Packet, Reader, WireError, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub cookie: u32,
    pub timestamp: u32,
    pub level: u8,
    pub line: u16,
    pub filename: String,
    pub message: String,
}

const FILENAME_LEN: usize = 16;

impl LogMessage {
    fn encode(&self, w: &mut Writer) {
        w.write_u32(self.cookie, Endian::Big);
        w.write_u32(self.timestamp, Endian::Big);
        w.write_u8(self.level);
        if self.message.len() > 255 {
            panic!("log message exceeds 255 bytes");
        }
        w.write_u8(self.message.len() as u8);
        w.write_u16(self.line, Endian::Big);
        w.write_fixed_string(&self.filename, FILENAME_LEN);
        w.write_bytes(self.message.as_bytes());
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let cookie = r.read_u32(Endian::Big)?;
        let timestamp = r.read_u32(Endian::Big)?;
        let level = r.read_u8()?;
        let length = r.read_u8()? as usize;
        let line = r.read_u16(Endian::Big)?;
        let filename = r.read_fixed_string(FILENAME_LEN)?;
        let message = std::str::from_utf8(r.read_bytes(length)?)
            .map_err(|_| WireError::Utf8)?
            .to_owned();
        Ok(Self {
            cookie,
            timestamp,
            level,
            line,
            filename,
            message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogShippingBody {
    RequestLogs { generation: u8, cookie: u32 },
    LogMessage(LogMessage),
    LogMessageDone { cookie: u32 },
    NoLogMessages { cookie: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogShipping {
    pub body: LogShippingBody,
}

impl LogShipping {
    fn command(&self) -> u8 {
        match &self.body {
            LogShippingBody::RequestLogs { .. } => 0x10,
            LogShippingBody::LogMessage(_) => 0x80,
            LogShippingBody::LogMessageDone { .. } => 0x81,
            LogShippingBody::NoLogMessages { .. } => 0x82,
        }
    }
}

impl Packet for LogShipping {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.command());
        match &self.body {
            LogShippingBody::RequestLogs { generation, cookie } => {
                w.write_u8(*generation);
                w.write_u32(*cookie, Endian::Big);
            }
            LogShippingBody::LogMessage(m) => m.encode(w),
            LogShippingBody::LogMessageDone { cookie } | LogShippingBody::NoLogMessages { cookie } => {
                w.write_u32(*cookie, Endian::Big);
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command = r.read_u8()?;
        let body = match command {
            0x10 => LogShippingBody::RequestLogs {
                generation: r.read_u8()?,
                cookie: r.read_u32(Endian::Big)?,
            },
            0x80 => LogShippingBody::LogMessage(LogMessage::decode(r)?),
            0x81 => LogShippingBody::LogMessageDone {
                cookie: r.read_u32(Endian::Big)?,
            },
            0x82 => LogShippingBody::NoLogMessages {
                cookie: r.read_u32(Endian::Big)?,
            },
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_message_round_trips() {
        let msg = LogShipping {
            body: LogShippingBody::LogMessage(LogMessage {
                cookie: 1,
                timestamp: 2,
                level: 1,
                line: 42,
                filename: "main.c".to_owned(),
                message: "hello".to_owned(),
            }),
        };
        assert_eq!(LogShipping::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn request_logs_round_trips() {
        let msg = LogShipping {
            body: LogShippingBody::RequestLogs { generation: 0, cookie: 99 },
        };
        assert_eq!(LogShipping::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
