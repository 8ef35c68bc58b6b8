use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Playing,
    Paused,
    Stopped,
}

impl PlaybackState {
    fn from_status(value: &str) -> Self {
        match value {
            "stopped" => Self::Stopped,
            "paused" => Self::Paused,
            _ => Self::Playing,
        }
    }
}

/// Snapshot of the daemon's status, rebuilt on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub playback_state: PlaybackState,
    pub queue_position: u32,
    pub queue_total: u32,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub position: String,
    pub duration: String,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            playback_state: PlaybackState::default(),
            queue_position: 1,
            queue_total: 1,
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            position: String::new(),
            duration: String::new(),
        }
    }
}

/// Builds a snapshot from `Name: Value` lines. Unknown keys are skipped and
/// a repeated key keeps its last value.
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<NowPlaying, ProtocolError> {
    let mut now_playing = NowPlaying::default();

    for line in lines {
        let Some((name, value)) = line.as_ref().split_once(": ") else {
            continue;
        };

        match name {
            "Status" => now_playing.playback_state = PlaybackState::from_status(value),
            "Total tracks" => now_playing.queue_total = parse_number(name, value)?,
            "Current track" => now_playing.queue_position = parse_number(name, value)?,
            "Album" => now_playing.album = value.to_string(),
            "Artist" => now_playing.artist = value.to_string(),
            "Title" => now_playing.title = value.to_string(),
            "Duration" => now_playing.duration = value.to_string(),
            "Position" => now_playing.position = value.to_string(),
            _ => {}
        }
    }

    Ok(now_playing)
}

fn parse_number(key: &str, value: &str) -> Result<u32, ProtocolError> {
    value
        .trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}
