//! `0x0020` music control (little-endian): 13 sub-commands tagged by a
//! leading `command` byte, from simple transport controls with no body to
//! "now playing" and volume/player-name updates pushed from the phone.

use pebble_wire::{Endian, Packet, Reader, WireEnum, WireError, Writer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum MusicControlCommand {
    PlayPause = 0x01,
    Pause = 0x02,
    Play = 0x03,
    NextTrack = 0x04,
    PreviousTrack = 0x05,
    VolumeUp = 0x06,
    VolumeDown = 0x07,
    GetCurrentTrack = 0x08,
    UpdateCurrentTrack = 0x10,
    UpdatePlayStateInfo = 0x11,
    UpdateVolumeInfo = 0x12,
    UpdatePlayerInfo = 0x13,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum PlaybackState {
    Paused = 0x00,
    Playing = 0x01,
    Rewinding = 0x02,
    Fastforwarding = 0x03,
    Unknown = 0x04,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum ShuffleState {
    Unknown = 0x00,
    Off = 0x01,
    On = 0x02,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, WireEnum)]
#[repr(u8)]
pub enum RepeatState {
    Unknown = 0x00,
    Off = 0x01,
    One = 0x02,
    All = 0x03,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTrack {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub track_length: Option<u32>,
    pub track_count: Option<u16>,
    pub current_track: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayStateInfo {
    pub state: PlaybackState,
    pub track_position: u32,
    pub play_rate: u32,
    pub shuffle: ShuffleState,
    pub repeat: RepeatState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub volume_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub package: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicControlBody {
    /// `PlayPause`, `Pause`, `Play`, `NextTrack`, `PreviousTrack`,
    /// `VolumeUp`, `VolumeDown`, `GetCurrentTrack`: no body.
    Empty,
    UpdateCurrentTrack(CurrentTrack),
    UpdatePlayStateInfo(PlayStateInfo),
    UpdateVolumeInfo(VolumeInfo),
    UpdatePlayerInfo(PlayerInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicControl {
    pub command: MusicControlCommand,
    pub body: MusicControlBody,
}

const E: Endian = Endian::Little;

impl Packet for MusicControl {
    const DEFAULT_ENDIAN: Endian = Endian::Little;

    fn encode(&self, w: &mut Writer) {
        w.write_enum_u8(&self.command);
        match &self.body {
            MusicControlBody::Empty => {}
            MusicControlBody::UpdateCurrentTrack(t) => {
                w.write_pascal_string(&t.artist, false, false);
                w.write_pascal_string(&t.album, false, false);
                w.write_pascal_string(&t.title, false, false);
                match t.track_length {
                    Some(v) => w.write_u32(v, E),
                    None => {}
                }
                match t.track_count {
                    Some(v) => w.write_u16(v, E),
                    None => {}
                }
                match t.current_track {
                    Some(v) => w.write_u16(v, E),
                    None => {}
                }
            }
            MusicControlBody::UpdatePlayStateInfo(p) => {
                w.write_enum_u8(&p.state);
                w.write_u32(p.track_position, E);
                w.write_u32(p.play_rate, E);
                w.write_enum_u8(&p.shuffle);
                w.write_enum_u8(&p.repeat);
            }
            MusicControlBody::UpdateVolumeInfo(v) => w.write_u8(v.volume_percent),
            MusicControlBody::UpdatePlayerInfo(p) => {
                w.write_pascal_string(&p.package, false, false);
                w.write_pascal_string(&p.name, false, false);
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let command: MusicControlCommand = r.read_enum_u8()?;
        let body = match command {
            MusicControlCommand::PlayPause
            | MusicControlCommand::Pause
            | MusicControlCommand::Play
            | MusicControlCommand::NextTrack
            | MusicControlCommand::PreviousTrack
            | MusicControlCommand::VolumeUp
            | MusicControlCommand::VolumeDown
            | MusicControlCommand::GetCurrentTrack => MusicControlBody::Empty,
            MusicControlCommand::UpdateCurrentTrack => {
                let artist = r.read_pascal_string(false, false)?;
                let album = r.read_pascal_string(false, false)?;
                let title = r.read_pascal_string(false, false)?;
                let track_length = r.read_optional(|r| r.read_u32(E))?;
                let track_count = r.read_optional(|r| r.read_u16(E))?;
                let current_track = r.read_optional(|r| r.read_u16(E))?;
                MusicControlBody::UpdateCurrentTrack(CurrentTrack {
                    artist,
                    album,
                    title,
                    track_length,
                    track_count,
                    current_track,
                })
            }
            MusicControlCommand::UpdatePlayStateInfo => MusicControlBody::UpdatePlayStateInfo(PlayStateInfo {
                state: r.read_enum_u8()?,
                track_position: r.read_u32(E)?,
                play_rate: r.read_u32(E)?,
                shuffle: r.read_enum_u8()?,
                repeat: r.read_enum_u8()?,
            }),
            MusicControlCommand::UpdateVolumeInfo => MusicControlBody::UpdateVolumeInfo(VolumeInfo {
                volume_percent: r.read_u8()?,
            }),
            MusicControlCommand::UpdatePlayerInfo => MusicControlBody::UpdatePlayerInfo(PlayerInfo {
                package: r.read_pascal_string(false, false)?,
                name: r.read_pascal_string(false, false)?,
            }),
        };
        Ok(Self { command, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_controls_have_no_body() {
        let msg = MusicControl {
            command: MusicControlCommand::NextTrack,
            body: MusicControlBody::Empty,
        };
        assert_eq!(msg.to_bytes(), [0x04]);
        assert_eq!(MusicControl::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn current_track_with_optionals_omitted_round_trips() {
        let msg = MusicControl {
            command: MusicControlCommand::UpdateCurrentTrack,
            body: MusicControlBody::UpdateCurrentTrack(CurrentTrack {
                artist: "Radiohead".to_owned(),
                album: "OK Computer".to_owned(),
                title: "Airbag".to_owned(),
                track_length: None,
                track_count: None,
                current_track: None,
            }),
        };
        assert_eq!(MusicControl::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn play_state_round_trips() {
        let msg = MusicControl {
            command: MusicControlCommand::UpdatePlayStateInfo,
            body: MusicControlBody::UpdatePlayStateInfo(PlayStateInfo {
                state: PlaybackState::Playing,
                track_position: 1000,
                play_rate: 100,
                shuffle: ShuffleState::Off,
                repeat: RepeatState::All,
            }),
        };
        assert_eq!(MusicControl::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}
