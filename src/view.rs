use crate::model::{Direction, PlayerEvent, SessionState};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub is_active: bool,
}

pub fn resolve(url_flag: bool, session: &mut SessionState) -> ViewState {
    let is_active = url_flag || session.launched;
    if is_active {
        session.launched = true;
    }
    ViewState { is_active }
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub launched: Option<String>,
    pub next_song: Option<String>,
    pub prev_song: Option<String>,
    pub play_index: Option<String>,
    pub toggle_shuffle: Option<String>,
    pub close_file: Option<String>,
    pub track_ended: Option<String>,
}

impl PageQuery {
    pub fn url_flag(&self) -> bool {
        flag(&self.launched)
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        if flag(&self.close_file) {
            return vec![PlayerEvent::Close];
        }

        let mut events = Vec::new();
        if flag(&self.toggle_shuffle) {
            events.push(PlayerEvent::ToggleShuffle);
        }
        if let Some(index) = self
            .play_index
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            events.push(PlayerEvent::Select(index));
        }
        if flag(&self.next_song) {
            events.push(PlayerEvent::Advance(Direction::Forward));
        }
        if flag(&self.prev_song) {
            events.push(PlayerEvent::Advance(Direction::Backward));
        }
        if flag(&self.track_ended) {
            events.push(PlayerEvent::TrackEnded);
        }
        events
    }
}

fn flag(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(parse_flag)
}
