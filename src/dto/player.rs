use serde::Serialize;

use crate::{
    dto::format_timestamp,
    state::entry::{EntrySession, StatusMessage},
};

/// Colour cue for the putts control.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PuttsTone {
    /// Zero putts: nothing entered yet.
    Unset,
    /// One putt.
    Best,
    /// Two putts.
    Good,
    /// Three or more.
    Warning,
}

impl From<u8> for PuttsTone {
    fn from(putts: u8) -> Self {
        match putts {
            0 => PuttsTone::Unset,
            1 => PuttsTone::Best,
            2 => PuttsTone::Good,
            _ => PuttsTone::Warning,
        }
    }
}

/// Text shown inside the putts control; empty at zero.
pub fn putts_text(putts: u8) -> String {
    if putts == 0 {
        String::new()
    } else {
        putts.to_string()
    }
}

/// Everything the player screen needs to draw one frame.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PlayerView {
    /// Whose device this is.
    pub player_name: String,
    /// Hole being entered.
    pub hole: u32,
    /// Its par.
    pub par: u32,
    /// Stepper value.
    pub score: u8,
    /// Fairway pill state.
    pub fairway_hit: bool,
    /// Sand pill state.
    pub sand_shot: bool,
    /// GIR pill state.
    pub green_in_regulation: bool,
    /// Putts count.
    pub putts: u8,
    /// Label inside the putts pill.
    pub putts_text: String,
    /// Colour of the putts flag.
    pub putts_tone: PuttsTone,
    /// Penalty counter.
    pub penalty_strokes: u8,
    /// Sent at least once for this hole.
    pub submitted: bool,
    /// RFC3339 time of the last successful send.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submitted_at: Option<String>,
    /// Submit control is waiting for its confirming press.
    pub armed: bool,
    /// Transient feedback after a submit attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// The scorekeeper wants this hole redone. Display only.
    pub fix_requested: bool,
}

impl PlayerView {
    /// Frame for `session`; `fix_requested` comes from the shared fix map.
    pub fn new(session: &EntrySession, fix_requested: bool) -> Self {
        let state = session.state();
        Self {
            player_name: state.player_name.clone(),
            hole: state.hole,
            par: state.par,
            score: session.score(),
            fairway_hit: state.fairway_hit,
            sand_shot: state.sand_shot,
            green_in_regulation: state.green_in_regulation,
            putts: state.putts,
            putts_text: putts_text(state.putts),
            putts_tone: state.putts.into(),
            penalty_strokes: state.penalty_strokes,
            submitted: state.submitted,
            last_submitted_at: state.last_submitted_at.map(format_timestamp),
            armed: session.is_armed(),
            status_text: session.status().map(|status| match status {
                StatusMessage::Submitted => "Submitted".to_string(),
                StatusMessage::Failed(reason) => format!("Not sent: {reason}. Tap to retry"),
            }),
            fix_requested,
        }
    }
}
