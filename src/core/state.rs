//! Timeline state.

use serde::{Deserialize, Serialize};

/// Transport state; exactly one of the play/stop controls is visible
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    Idle,
    Playing,
}

impl PlayState {
    pub fn is_playing(self) -> bool {
        self == PlayState::Playing
    }

    /// Name of the control the user can press in this state
    pub fn visible_control(self) -> &'static str {
        match self {
            PlayState::Idle => "play",
            PlayState::Playing => "stop",
        }
    }
}

/// Current year plus transport state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineState {
    pub current_year: i32,
    pub play_state: PlayState,
}

impl TimelineState {
    pub fn new(year: i32) -> Self {
        Self {
            current_year: year,
            play_state: PlayState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.play_state.is_playing()
    }
}
