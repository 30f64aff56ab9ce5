//! Per-player status derivation for the scorekeeper board.

use crate::dao::models::{
    FinalizedHoles, FixRequests, ROSTER_SIZE, RoundConfig, SubmissionPacket,
};

/// Status of one player on one hole, in decreasing precedence.
///
/// `Missing -> Submitted -> {FixRequested <-> Submitted}* -> Finalized`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    /// The hole is locked.
    Finalized { latest: Option<SubmissionPacket> },
    /// The scorekeeper rejected the latest submission; it must be redone.
    FixRequested { latest: Option<SubmissionPacket> },
    /// The latest submission for the hole stands.
    Submitted(SubmissionPacket),
    /// Nothing submitted yet.
    Missing,
}

impl PlayerStatus {
    /// Latest packet backing the status, if any.
    pub fn latest(&self) -> Option<&SubmissionPacket> {
        match self {
            PlayerStatus::Finalized { latest } | PlayerStatus::FixRequested { latest } => {
                latest.as_ref()
            }
            PlayerStatus::Submitted(packet) => Some(packet),
            PlayerStatus::Missing => None,
        }
    }

    /// Whether the fix toggle may be used for this player.
    pub fn fix_toggle_enabled(&self) -> bool {
        matches!(
            self,
            PlayerStatus::FixRequested { .. } | PlayerStatus::Submitted(_)
        )
    }
}

/// One roster slot on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLine {
    /// Roster name.
    pub name: String,
    /// Derived status for the board's hole.
    pub status: PlayerStatus,
}

/// Derived view of the current hole for the whole roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Hole the board was derived for.
    pub hole: u32,
    /// Whether that hole is locked.
    pub finalized: bool,
    /// One line per roster slot, in roster order.
    pub lines: Vec<PlayerLine>,
}

impl Board {
    /// Green lines.
    pub fn submitted_count(&self) -> usize {
        self.count(|status| matches!(status, PlayerStatus::Submitted(_)))
    }

    /// Amber lines.
    pub fn fix_requested_count(&self) -> usize {
        self.count(|status| matches!(status, PlayerStatus::FixRequested { .. }))
    }

    /// Red lines.
    pub fn missing_count(&self) -> usize {
        self.count(|status| matches!(status, PlayerStatus::Missing))
    }

    fn count(&self, predicate: impl Fn(&PlayerStatus) -> bool) -> usize {
        self.lines.iter().filter(|line| predicate(&line.status)).count()
    }

    /// Finalize is allowed only when every player has a clean submission.
    pub fn can_finalize(&self) -> bool {
        !self.finalized
            && self.submitted_count() == ROSTER_SIZE
            && self.fix_requested_count() == 0
    }

    /// Status of the roster line named `player`.
    pub fn status_of(&self, player: &str) -> Option<&PlayerStatus> {
        let player = player.trim();
        self.lines
            .iter()
            .find(|line| line.name.trim() == player)
            .map(|line| &line.status)
    }
}

/// Most recently appended packet for `player` on `hole`. Names match trimmed.
pub fn latest_submission<'a>(
    log: &'a [SubmissionPacket],
    player: &str,
    hole: u32,
) -> Option<&'a SubmissionPacket> {
    let player = player.trim();
    log.iter()
        .rev()
        .find(|packet| packet.hole == hole && packet.player_name.trim() == player)
}

/// Derive every roster player's status for the round's current hole.
pub fn derive_board(
    round: &RoundConfig,
    submissions: &[SubmissionPacket],
    fixes: &FixRequests,
    finalized: &FinalizedHoles,
) -> Board {
    let hole = round.hole;
    let hole_finalized = finalized.get(&hole).copied().unwrap_or(false);

    let lines = round
        .players
        .iter()
        .map(|name| {
            let latest = latest_submission(submissions, name, hole).cloned();
            let fix_active = fixes.get(name.trim()).is_some_and(|fix| fix.hole == hole);
            let status = if hole_finalized {
                PlayerStatus::Finalized { latest }
            } else if fix_active {
                PlayerStatus::FixRequested { latest }
            } else if let Some(packet) = latest {
                PlayerStatus::Submitted(packet)
            } else {
                PlayerStatus::Missing
            };
            PlayerLine {
                name: name.clone(),
                status,
            }
        })
        .collect();

    Board {
        hole,
        finalized: hole_finalized,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::dao::models::FixRequest;

    fn round() -> RoundConfig {
        RoundConfig {
            hole: 6,
            par: 4,
            players: ["Mike", "Ben", "Dave", "Rob"].map(String::from),
            ..RoundConfig::default()
        }
    }

    fn packet(player: &str, hole: u32, score: u8) -> SubmissionPacket {
        SubmissionPacket {
            player_name: player.into(),
            hole,
            par: 4,
            score,
            fairway_hit: true,
            sand_shot: false,
            green_in_regulation: false,
            putts: 2,
            penalty_strokes: 0,
            submitted_at: OffsetDateTime::now_utc(),
        }
    }

    fn fix(hole: u32) -> FixRequest {
        FixRequest {
            hole,
            requested_at: OffsetDateTime::now_utc(),
        }
    }

    fn all_in(hole: u32) -> Vec<SubmissionPacket> {
        ["Mike", "Ben", "Dave", "Rob"]
            .into_iter()
            .map(|name| packet(name, hole, 4))
            .collect()
    }

    #[test]
    fn empty_log_means_everyone_missing() {
        let board = derive_board(&round(), &[], &FixRequests::new(), &FinalizedHoles::new());
        assert_eq!(board.missing_count(), 4);
        assert!(!board.can_finalize());
        assert!(board.lines.iter().all(|line| !line.status.fix_toggle_enabled()));
    }

    #[test]
    fn latest_submission_wins() {
        let log = vec![packet("Mike", 6, 5), packet("Ben", 6, 4), packet("Mike", 6, 3)];
        let board = derive_board(&round(), &log, &FixRequests::new(), &FinalizedHoles::new());
        let mike = board.status_of("Mike").and_then(PlayerStatus::latest).unwrap();
        assert_eq!(mike.score, 3);
    }

    #[test]
    fn names_match_ignoring_surrounding_blanks() {
        let log = vec![packet(" Ben ", 6, 5)];
        let board = derive_board(&round(), &log, &FixRequests::new(), &FinalizedHoles::new());
        let ben = board.status_of("Ben").and_then(PlayerStatus::latest).unwrap();
        assert_eq!(ben.score, 5);
        assert!(latest_submission(&log, "Ben  ", 6).is_some());
    }

    #[test]
    fn other_holes_do_not_count() {
        let log = all_in(5);
        let board = derive_board(&round(), &log, &FixRequests::new(), &FinalizedHoles::new());
        assert_eq!(board.missing_count(), 4);
    }

    #[test]
    fn roster_order_is_preserved() {
        let log = vec![packet("Rob", 6, 4), packet("Mike", 6, 4)];
        let board = derive_board(&round(), &log, &FixRequests::new(), &FinalizedHoles::new());
        let names: Vec<&str> = board.lines.iter().map(|line| line.name.as_str()).collect();
        assert_eq!(names, ["Mike", "Ben", "Dave", "Rob"]);
    }

    #[test]
    fn three_submissions_cannot_finalize() {
        let mut log = all_in(6);
        log.pop();
        let board = derive_board(&round(), &log, &FixRequests::new(), &FinalizedHoles::new());
        assert_eq!(board.submitted_count(), 3);
        assert!(!board.can_finalize());
    }

    #[test]
    fn any_fix_request_blocks_finalize() {
        let mut fixes = FixRequests::new();
        fixes.insert("Dave".into(), fix(6));
        let board = derive_board(&round(), &all_in(6), &fixes, &FinalizedHoles::new());
        assert_eq!(board.fix_requested_count(), 1);
        assert!(matches!(
            board.status_of("Dave"),
            Some(PlayerStatus::FixRequested { latest: Some(_) })
        ));
        assert!(!board.can_finalize());
    }

    #[test]
    fn fix_request_for_another_hole_is_ignored() {
        let mut fixes = FixRequests::new();
        fixes.insert("Dave".into(), fix(5));
        let board = derive_board(&round(), &all_in(6), &fixes, &FinalizedHoles::new());
        assert!(board.can_finalize());
    }

    #[test]
    fn four_clean_submissions_can_finalize() {
        let board = derive_board(&round(), &all_in(6), &FixRequests::new(), &FinalizedHoles::new());
        assert!(board.can_finalize());
    }

    #[test]
    fn finalized_hole_takes_precedence() {
        let mut fixes = FixRequests::new();
        fixes.insert("Ben".into(), fix(6));
        let mut finalized = FinalizedHoles::new();
        finalized.insert(6, true);

        let board = derive_board(&round(), &all_in(6), &fixes, &finalized);
        assert!(board.finalized);
        assert!(board
            .lines
            .iter()
            .all(|line| matches!(line.status, PlayerStatus::Finalized { .. })));
        assert!(!board.can_finalize());
        assert!(!board.lines[1].status.fix_toggle_enabled());
    }
}
