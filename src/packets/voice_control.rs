//! `0x2af8` voice control (little-endian). `VoiceControlCommand` is
//! host→watch and registered; `VoiceControlResult` is watch→host and is
//! not registered for dispatch (`crate::services::voice` correlates it to
//! the session it answers instead).

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum AudioCodec {
    Speex = 0x01,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeexEncoderInfo {
    pub version: String,
    pub sample_rate: u32,
    pub bit_rate: u16,
    pub bitstream_version: u8,
    pub frame_size: u16,
}

const SPEEX_VERSION_LEN: usize = 20;

impl SpeexEncoderInfo {
    fn encode(&self, w: &mut Writer) {
        w.write_fixed_string(&self.version, SPEEX_VERSION_LEN);
        w.write_u32(self.sample_rate, Endian::Little);
        w.write_u16(self.bit_rate, Endian::Little);
        w.write_u8(self.bitstream_version);
        w.write_u16(self.frame_size, Endian::Little);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            version: r.read_fixed_string(SPEEX_VERSION_LEN)?,
            sample_rate: r.read_u32(Endian::Little)?,
            bit_rate: r.read_u16(Endian::Little)?,
            bitstream_version: r.read_u8()?,
            frame_size: r.read_u16(Endian::Little)?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum TranscriptionType {
    SentenceList = 0x01,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub confidence: u8,
    pub data: String,
}

impl Word {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.confidence);
        if self.data.len() > u16::MAX as usize {
            panic!("voice word exceeds u16 length");
        }
        w.write_u16(self.data.len() as u16, Endian::Little);
        w.write_bytes(self.data.as_bytes());
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let confidence = r.read_u8()?;
        let length = r.read_u16(Endian::Little)? as usize;
        let data = std::str::from_utf8(r.read_bytes(length)?)
            .map_err(|_| WireError::Utf8)?
            .to_owned();
        Ok(Self { confidence, data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub words: Vec<Word>,
}

impl Sentence {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.words.len() as u16, Endian::Little);
        for word in &self.words {
            word.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let count = r.read_u16(Endian::Little)?;
        let mut words = Vec::with_capacity(count as usize);
        for _ in 0..count {
            words.push(Word::decode(r)?);
        }
        Ok(Self { words })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceList {
    pub sentences: Vec<Sentence>,
}

impl SentenceList {
    fn encode(&self, w: &mut Writer) {
        if self.sentences.len() > 255 {
            panic!("voice sentence list exceeds 255 entries");
        }
        w.write_u8(self.sentences.len() as u8);
        for sentence in &self.sentences {
            sentence.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let count = r.read_u8()?;
        let mut sentences = Vec::with_capacity(count as usize);
        for _ in 0..count {
            sentences.push(Sentence::decode(r)?);
        }
        Ok(Self { sentences })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub sentences: SentenceList,
}

impl Transcription {
    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&TranscriptionType::SentenceList);
        self.sentences.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let _ty: TranscriptionType = r.read_enum_u8()?;
        Ok(Self {
            sentences: SentenceList::decode(r)?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum AttributeType {
    SpeexEncoderInfo = 0x01,
    Transcription = 0x02,
    AppUuid = 0x03,
}

/// Mirrors the `accept_missing=True` union on the original attribute
/// type: unknown `AttributeType` values (or lengths we can't parse as
/// the expected shape) decode to `Raw` instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeData {
    SpeexEncoderInfo(SpeexEncoderInfo),
    Transcription(Transcription),
    AppUuid(Uuid),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: AttributeType,
    pub data: AttributeData,
}

impl Attribute {
    fn encoded_len(data: &AttributeData) -> u16 {
        match data {
            AttributeData::SpeexEncoderInfo(_) => 27,
            AttributeData::Transcription(_) => {
                let mut w = Writer::new();
                if let AttributeData::Transcription(t) = data {
                    t.encode(&mut w);
                }
                w.into_vec().len() as u16
            }
            AttributeData::AppUuid(_) => 16,
            AttributeData::Raw(bytes) => bytes.len() as u16,
        }
    }

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.id);
        w.write_u16(Self::encoded_len(&self.data), Endian::Little);
        match &self.data {
            AttributeData::SpeexEncoderInfo(info) => info.encode(w),
            AttributeData::Transcription(t) => t.encode(w),
            AttributeData::AppUuid(uuid) => w.write_uuid(uuid.as_bytes()),
            AttributeData::Raw(bytes) => w.write_bytes(bytes),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let id: AttributeType = r.read_enum_u8()?;
        let length = r.read_u16(Endian::Little)? as usize;
        let mut sub = r.sub_reader(length)?;
        let data = match id {
            AttributeType::SpeexEncoderInfo => AttributeData::SpeexEncoderInfo(SpeexEncoderInfo::decode(&mut sub)?),
            AttributeType::Transcription => AttributeData::Transcription(Transcription::decode(&mut sub)?),
            AttributeType::AppUuid => AttributeData::AppUuid(Uuid::from_bytes(sub.read_uuid()?)),
        };
        Ok(Self { id, data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeList {
    pub attributes: Vec<Attribute>,
}

impl AttributeList {
    fn encode(&self, w: &mut Writer) {
        if self.attributes.len() > 255 {
            panic!("voice attribute list exceeds 255 entries");
        }
        w.write_u8(self.attributes.len() as u8);
        for attr in &self.attributes {
            attr.encode(w);
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let count = r.read_u8()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            attributes.push(Attribute::decode(r)?);
        }
        Ok(Self { attributes })
    }

    pub fn get(&self, id: AttributeType) -> Option<&AttributeData> {
        self.attributes.iter().find(|a| a.id == id).map(|a| &a.data)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum SessionType {
    Dictation = 0x01,
    Command = 0x02,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetupCommand {
    pub session_type: SessionType,
    pub session_id: u16,
    pub attributes: AttributeList,
}

impl SessionSetupCommand {
    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.session_type);
        w.write_u16(self.session_id, Endian::Little);
        self.attributes.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            session_type: r.read_enum_u8()?,
            session_id: r.read_u16(Endian::Little)?,
            attributes: AttributeList::decode(r)?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum VoiceCommand {
    SessionSetup = 0x01,
    DictationResult = 0x02,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum VoiceResult {
    Success = 0x00,
    FailServiceUnavailable = 0x01,
    FailTimeout = 0x02,
    FailRecognizerError = 0x03,
    FailInvalidRecognizerResponse = 0x04,
    FailDisabled = 0x05,
    FailInvalidMessage = 0x06,
}

pub mod flags {
    pub const APP_INITIATED: u32 = 1;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceControlBody {
    SessionSetup(SessionSetupCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceControlCommand {
    pub flags: u32,
    pub body: VoiceControlBody,
}

impl Packet for VoiceControlCommand {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&VoiceCommand::SessionSetup);
        w.write_u32(self.flags, Endian::Little);
        match &self.body {
            VoiceControlBody::SessionSetup(b) => b.encode(w),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command: VoiceCommand = r.read_enum_u8()?;
        let flags = r.read_u32(Endian::Little)?;
        let body = match command {
            VoiceCommand::SessionSetup => VoiceControlBody::SessionSetup(SessionSetupCommand::decode(r)?),
            VoiceCommand::DictationResult => return Err(WireError::InvalidTag { value: command as i64 }),
        };
        Ok(Self { flags, body })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetupResult {
    pub session_type: SessionType,
    pub result: VoiceResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationResult {
    pub session_id: u16,
    pub result: VoiceResult,
    pub attributes: AttributeList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceControlResultBody {
    SessionSetup(SessionSetupResult),
    Dictation(DictationResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceControlResult {
    pub flags: u32,
    pub body: VoiceControlResultBody,
}

impl VoiceControlResult {
    fn command(&self) -> VoiceCommand {
        match &self.body {
            VoiceControlResultBody::SessionSetup(_) => VoiceCommand::SessionSetup,
            VoiceControlResultBody::Dictation(_) => VoiceCommand::DictationResult,
        }
    }
}

impl Packet for VoiceControlResult {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.command());
        w.write_u32(self.flags, Endian::Little);
        match &self.body {
            VoiceControlResultBody::SessionSetup(b) => {
                w.write_enum_u8(&b.session_type);
                w.write_enum_u8(&b.result);
            }
            VoiceControlResultBody::Dictation(b) => {
                w.write_u16(b.session_id, Endian::Little);
                w.write_enum_u8(&b.result);
                b.attributes.encode(w);
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command: VoiceCommand = r.read_enum_u8()?;
        let flags = r.read_u32(Endian::Little)?;
        let body = match command {
            VoiceCommand::SessionSetup => VoiceControlResultBody::SessionSetup(SessionSetupResult {
                session_type: r.read_enum_u8()?,
                result: r.read_enum_u8()?,
            }),
            VoiceCommand::DictationResult => VoiceControlResultBody::Dictation(DictationResult {
                session_id: r.read_u16(Endian::Little)?,
                result: r.read_enum_u8()?,
                attributes: AttributeList::decode(r)?,
            }),
        };
        Ok(Self { flags, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_setup_command_round_trips() {
        let msg = VoiceControlCommand {
            flags: flags::APP_INITIATED,
            body: VoiceControlBody::SessionSetup(SessionSetupCommand {
                session_type: SessionType::Dictation,
                session_id: 1,
                attributes: AttributeList {
                    attributes: vec![Attribute {
                        id: AttributeType::AppUuid,
                        data: AttributeData::AppUuid(Uuid::from_u128(1)),
                    }],
                },
            }),
        };
        assert_eq!(VoiceControlCommand::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn dictation_result_round_trips() {
        let msg = VoiceControlResult {
            flags: 0,
            body: VoiceControlResultBody::Dictation(DictationResult {
                session_id: 1,
                result: VoiceResult::Success,
                attributes: AttributeList::default(),
            }),
        };
        assert_eq!(VoiceControlResult::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
