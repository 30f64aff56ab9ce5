use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Number of players in a skins group.
pub const ROSTER_SIZE: usize = 4;
/// Upper bound for the score and penalty steppers.
pub const MAX_STROKES: u8 = 99;
/// Putts wrap back to zero after this value.
pub const MAX_PUTTS: u8 = 9;

/// Active round as seen by both screens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    /// Hole currently being scored (1-based).
    pub hole: u32,
    /// Par of the current hole.
    pub par: u32,
    /// Display-only stake label (e.g. "$25").
    pub pot: String,
    /// Display-only skins count.
    pub skins: u32,
    /// Name of the player running the scorekeeper screen.
    pub captain: String,
    /// Fixed roster, in display order.
    pub players: [String; ROSTER_SIZE],
    /// Bumped every time the round advances; used to reject stale finalizations.
    #[serde(default)]
    pub revision: u64,
}

impl RoundConfig {
    /// Whether `name` is part of the roster. Surrounding blanks are ignored.
    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|player| player.trim() == name.trim())
    }

    /// Whether `name` designates the captain, ignoring case and surrounding blanks.
    pub fn is_captain(&self, name: &str) -> bool {
        self.captain.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            hole: 1,
            par: 4,
            pot: "$25".into(),
            skins: 1,
            captain: "Dave".into(),
            players: ["Mike", "Ben", "Dave", "Rob"].map(String::from),
            revision: 0,
        }
    }
}

/// In-progress entry owned by one player device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntryState {
    /// Hole this entry belongs to.
    pub hole: u32,
    /// Par of that hole, copied from the round when the entry started.
    pub par: u32,
    /// Roster name, stored trimmed.
    pub player_name: String,
    /// Gross strokes for the hole; `None` only before the entry was seeded.
    pub score: Option<u8>,
    /// Fairway hit off the tee.
    pub fairway_hit: bool,
    /// Played out of a bunker.
    pub sand_shot: bool,
    /// Green reached in regulation.
    pub green_in_regulation: bool,
    /// Putts in `0..=MAX_PUTTS`.
    pub putts: u8,
    /// Tracked independently of `score`.
    pub penalty_strokes: u8,
    /// A packet for this entry reached the log at least once.
    pub submitted: bool,
    /// When the last successful submission happened.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_submitted_at: Option<OffsetDateTime>,
}

impl PlayerEntryState {
    /// Fresh entry for `hole`; the score starts at par, never at zero.
    pub fn new(player_name: impl AsRef<str>, hole: u32, par: u32) -> Self {
        Self {
            hole,
            par,
            player_name: player_name.as_ref().trim().to_owned(),
            score: Some(clamp_strokes(i64::from(par))),
            fairway_hit: false,
            sand_shot: false,
            green_in_regulation: false,
            putts: 0,
            penalty_strokes: 0,
            submitted: false,
            last_submitted_at: None,
        }
    }
}

/// Clamp any stroke count into `0..=MAX_STROKES`.
pub fn clamp_strokes(value: i64) -> u8 {
    value.clamp(0, i64::from(MAX_STROKES)) as u8
}

/// Immutable record appended to the submissions log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPacket {
    /// Submitting player.
    pub player_name: String,
    /// Hole the score is for.
    pub hole: u32,
    /// Par at submission time.
    pub par: u32,
    /// Gross strokes.
    pub score: u8,
    /// Fairway hit off the tee.
    pub fairway_hit: bool,
    /// Played out of a bunker.
    pub sand_shot: bool,
    /// Green reached in regulation.
    pub green_in_regulation: bool,
    /// Putts taken.
    pub putts: u8,
    /// Penalty strokes, not included in `score`.
    pub penalty_strokes: u8,
    /// Device clock at the confirming press.
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

/// Scorekeeper demand that a player redo the submission for `hole`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FixRequest {
    /// Hole the request applies to; requests for other holes are inert.
    pub hole: u32,
    /// When the scorekeeper raised it.
    #[serde(with = "time::serde::rfc3339")]
    pub requested_at: OffsetDateTime,
}

/// Active fix requests keyed by player name.
pub type FixRequests = IndexMap<String, FixRequest>;

/// Holes that have been locked, keyed by hole number. Entries are never removed.
pub type FinalizedHoles = IndexMap<u32, bool>;

/// Submission moved out of the live log when its hole was finalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedSubmission {
    /// The packet as it was logged.
    #[serde(flatten)]
    pub packet: SubmissionPacket,
    /// Identifier shared by every entry archived in the same finalization.
    pub archive_id: Uuid,
    /// When the hole was finalized.
    #[serde(with = "time::serde::rfc3339")]
    pub finalized_at: OffsetDateTime,
}

/// Marker persisted while a hole archival is in flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveJournal {
    /// Identifier stamped on every history entry this archival writes.
    pub archive_id: Uuid,
    /// Hole being finalized.
    pub hole: u32,
    /// Finalization time recorded in the history entries.
    #[serde(with = "time::serde::rfc3339")]
    pub finalized_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_matches_the_house_group() {
        let round = RoundConfig::default();
        assert_eq!(round.players, ["Mike", "Ben", "Dave", "Rob"].map(String::from));
        assert_eq!(round.pot, "$25");
        assert!(round.is_captain("Dave"));
        assert!(round.is_captain(" dave "));
        assert!(!round.is_captain("Mike"));
    }

    #[test]
    fn entry_names_are_trimmed() {
        assert_eq!(PlayerEntryState::new(" Ben ", 1, 4).player_name, "Ben");
    }

    #[test]
    fn new_entry_defaults_score_to_par() {
        let entry = PlayerEntryState::new("Mike", 6, 4);
        assert_eq!(entry.score, Some(4));
        assert_eq!(entry.putts, 0);
        assert!(!entry.submitted);
    }

    #[test]
    fn finalized_holes_keep_numeric_keys_through_json() {
        let mut finalized = FinalizedHoles::new();
        finalized.insert(6, true);
        let json = serde_json::to_string(&finalized).unwrap();
        assert_eq!(json, "{\"6\":true}");
        let back: FinalizedHoles = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&6), Some(&true));
    }

    #[test]
    fn round_config_without_revision_still_decodes() {
        let json = r#"{"hole":2,"par":3,"pot":"$5","skins":2,"captain":"Ben",
            "players":["Mike","Ben","Dave","Rob"]}"#;
        let round: RoundConfig = serde_json::from_str(json).unwrap();
        assert_eq!(round.revision, 0);
        assert!(round.has_player("Dave"));
        assert!(!round.has_player("Zed"));
    }
}
