use serde::{Deserialize, Deserializer, Serialize};

pub const UNKNOWN_FIELD: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    #[serde(default = "unknown_field")]
    pub title: String,
    #[serde(default = "unknown_field")]
    pub artist: String,
    #[serde(default, deserialize_with = "non_empty_url")]
    pub url: Option<String>,
}

impl Track {
    pub fn placeholder() -> Self {
        Self {
            title: String::from("ERROR"),
            artist: String::from("NO DATA"),
            url: None,
        }
    }
}

fn unknown_field() -> String {
    String::from(UNKNOWN_FIELD)
}

fn non_empty_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlaybackState {
    pub current_index: Option<usize>,
    pub shuffle_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionState {
    pub launched: bool,
    pub playback: PlaybackState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Close,
    Select(usize),
    Advance(Direction),
    TrackEnded,
    ToggleShuffle,
}
