//! `0x2710` audio stream (big-endian): microphone frames uploaded to the
//! phone during a voice dictation session, framed independently of
//! `crate::packets::voice_control`'s own session handshake.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum AudioCodec {
    Speex = 0x01,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeexEncoderInfo {
    pub version: String,
    pub bitstream_version: u8,
    pub frame_size: u16,
}

const SPEEX_VERSION_LEN: usize = 20;

impl SpeexEncoderInfo {
    fn encode(&self, w: &mut Writer) {
        w.write_fixed_string(&self.version, SPEEX_VERSION_LEN);
        w.write_u8(self.bitstream_version);
        w.write_u16(self.frame_size, Endian::Big);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            version: r.read_fixed_string(SPEEX_VERSION_LEN)?,
            bitstream_version: r.read_u8()?,
            frame_size: r.read_u16(Endian::Big)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTransfer {
    pub sample_rate: u32,
    pub bit_rate: u16,
    pub extra_info: SpeexEncoderInfo,
}

impl StartTransfer {
    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&AudioCodec::Speex);
        w.write_u32(self.sample_rate, Endian::Big);
        w.write_u16(self.bit_rate, Endian::Big);
        self.extra_info.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _encoder_id: AudioCodec = r.read_enum_u8()?;
        Ok(Self {
            sample_rate: r.read_u32(Endian::Big)?,
            bit_rate: r.read_u16(Endian::Big)?,
            extra_info: SpeexEncoderInfo::decode(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderFrame {
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTransfer {
    pub frames: Vec<EncoderFrame>,
}

impl DataTransfer {
    fn encode(&self, w: &mut Writer) {
        if self.frames.len() > 255 {
            panic!("audio data transfer exceeds 255 frames");
        }
        w.write_u8(self.frames.len() as u8);
        for frame in &self.frames {
            if frame.data.len() > 255 {
                panic!("audio encoder frame exceeds 255 bytes");
            }
            w.write_u8(frame.data.len() as u8);
            w.write_bytes(&frame.data);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let count = r.read_u8()?;
        let mut frames = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = r.read_u8()? as usize;
            frames.push(EncoderFrame {
                data: r.read_bytes(len)?.to_vec(),
            });
        }
        Ok(Self { frames })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioStreamBody {
    StartTransfer(StartTransfer),
    DataTransfer(DataTransfer),
    StopTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub session_id: u16,
    pub body: AudioStreamBody,
}

impl AudioStream {
    fn packet_id(&self) -> u8 {
        match &self.body {
            AudioStreamBody::StartTransfer(_) => 0x01,
            AudioStreamBody::DataTransfer(_) => 0x02,
            AudioStreamBody::StopTransfer => 0x03,
        }
    }
}

impl Packet for AudioStream {
    const DEFAULT_ENDIAN: Endian = Endian::Big;

    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.packet_id());
        w.write_u16(self.session_id, Endian::Big);
        match &self.body {
            AudioStreamBody::StartTransfer(b) => b.encode(w),
            AudioStreamBody::DataTransfer(b) => b.encode(w),
            AudioStreamBody::StopTransfer => {}
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let packet_id = r.read_u8()?;
        let session_id = r.read_u16(Endian::Big)?;
        let body = match packet_id {
            0x01 => AudioStreamBody::StartTransfer(StartTransfer::decode(r)?),
            0x02 => AudioStreamBody::DataTransfer(DataTransfer::decode(r)?),
            0x03 => AudioStreamBody::StopTransfer,
            other => return Err(WireError::InvalidTag { value: other as i64 }),
        };
        Ok(Self { session_id, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_transfer_round_trips() {
        let msg = AudioStream {
            session_id: 1,
            body: AudioStreamBody::StartTransfer(StartTransfer {
                sample_rate: 16000,
                bit_rate: 8000,
                extra_info: SpeexEncoderInfo {
                    version: "speex-1.2".to_owned(),
                    bitstream_version: 4,
                    frame_size: 160,
                },
            }),
        };
        assert_eq!(AudioStream::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn data_transfer_round_trips() {
        let msg = AudioStream {
            session_id: 1,
            body: AudioStreamBody::DataTransfer(DataTransfer {
                frames: vec![
                    EncoderFrame { data: vec![1, 2, 3] },
                    EncoderFrame { data: vec![4, 5] },
                ],
            }),
        };
        assert_eq!(AudioStream::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn stop_transfer_has_no_body() {
        let msg = AudioStream {
            session_id: 9,
            body: AudioStreamBody::StopTransfer,
        };
        assert_eq!(msg.to_bytes(), [0x03, 0x00, 0x09]);
    }
}
