use serde::Serialize;

use crate::{
    dao::models::{ROSTER_SIZE, RoundConfig},
    dto::BLANK_SCORE,
    state::board::{Board, PlayerStatus},
};

/// Publicly visible status of a roster line.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleStatus {
    /// Red: nothing submitted.
    Missing,
    /// Green: latest submission stands.
    Submitted,
    /// Amber: scorekeeper asked for a redo.
    FixRequested,
    /// Hole locked.
    Finalized,
}

impl From<&PlayerStatus> for VisibleStatus {
    fn from(value: &PlayerStatus) -> Self {
        match value {
            PlayerStatus::Missing => VisibleStatus::Missing,
            PlayerStatus::Submitted(_) => VisibleStatus::Submitted,
            PlayerStatus::FixRequested { .. } => VisibleStatus::FixRequested,
            PlayerStatus::Finalized { .. } => VisibleStatus::Finalized,
        }
    }
}

/// One roster line on the scorekeeper board.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    /// Roster name.
    pub name: String,
    /// Colour of the row.
    pub status: VisibleStatus,
    /// Latest score, or [`BLANK_SCORE`] when none was submitted.
    pub score: String,
    /// Marks the captain's name.
    pub is_captain: bool,
    /// Fix toggle is clickable.
    pub fix_enabled: bool,
    /// Fix toggle is on.
    pub fix_active: bool,
}

/// Everything the scorekeeper screen needs to draw one frame.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Current hole.
    pub hole: u32,
    /// Its par.
    pub par: u32,
    /// Stake label.
    pub pot: String,
    /// Skins count label.
    pub skins: u32,
    /// Captain's name.
    pub captain: String,
    /// Current hole is locked.
    pub finalized: bool,
    /// One row per roster slot, never reordered.
    pub rows: Vec<PlayerRow>,
    /// Players with a standing submission.
    pub green: usize,
    /// Players with an outstanding fix request.
    pub amber: usize,
    /// Players with nothing submitted.
    pub red: usize,
    /// Finalize control is enabled.
    pub can_finalize: bool,
    /// Why finalize is (or is not) available.
    pub finalize_hint: String,
}

impl BoardView {
    /// Project `board` for display alongside the round labels.
    pub fn new(round: &RoundConfig, board: &Board) -> Self {
        let rows = board
            .lines
            .iter()
            .map(|line| PlayerRow {
                name: line.name.clone(),
                status: (&line.status).into(),
                score: line
                    .status
                    .latest()
                    .map(|packet| packet.score.to_string())
                    .unwrap_or_else(|| BLANK_SCORE.to_string()),
                is_captain: round.is_captain(&line.name),
                fix_enabled: line.status.fix_toggle_enabled(),
                fix_active: matches!(line.status, PlayerStatus::FixRequested { .. }),
            })
            .collect();

        Self {
            hole: round.hole,
            par: round.par,
            pot: round.pot.clone(),
            skins: round.skins,
            captain: round.captain.clone(),
            finalized: board.finalized,
            rows,
            green: board.submitted_count(),
            amber: board.fix_requested_count(),
            red: board.missing_count(),
            can_finalize: board.can_finalize(),
            finalize_hint: finalize_hint(board),
        }
    }
}

fn finalize_hint(board: &Board) -> String {
    if board.finalized {
        return format!("Hole {} already finalized", board.hole);
    }
    let fixes = board.fix_requested_count();
    if fixes > 0 {
        return format!("{fixes} fix request(s) outstanding");
    }
    let waiting = ROSTER_SIZE.saturating_sub(board.submitted_count());
    if waiting > 0 {
        return format!("Waiting on {waiting} player(s)");
    }
    "Ready to finalize".to_string()
}
