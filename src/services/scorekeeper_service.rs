//! Scorekeeper screen: aggregates submissions, toggles fix requests and gates finalize.

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    dao::{
        models::{FixRequest, RoundConfig},
        round_store::RoundStore,
    },
    dto::board::BoardView,
    error::ServiceError,
    services::archive_service,
    state::board::{Board, PlayerStatus, derive_board},
};

/// Scorekeeper session bound to the shared store.
pub struct ScorekeeperScreen {
    store: RoundStore,
    round: RoundConfig,
    board: Board,
}

impl ScorekeeperScreen {
    /// Open the screen on `round`, persisting it so player devices see the same hole.
    pub fn open(store: RoundStore, round: RoundConfig) -> Self {
        if store.round().as_ref() != Some(&round) {
            if let Err(err) = store.save_round(&round) {
                warn!(error = %err, "failed to persist round configuration");
            }
        }
        let board = derive_board(&round, &[], &Default::default(), &Default::default());
        let mut screen = Self {
            store,
            round,
            board,
        };
        screen.render();
        screen
    }

    /// Round as of the last render.
    pub fn round(&self) -> &RoundConfig {
        &self.round
    }

    /// Board as of the last render.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Re-derive the board from the store. Called on every poll.
    pub fn render(&mut self) -> BoardView {
        if let Err(err) = archive_service::recover(&self.store) {
            warn!(error = %err, "pending archival could not be completed");
        }
        if let Some(round) = self.store.round() {
            if round != self.round {
                debug!(hole = round.hole, revision = round.revision, "round changed in store");
                self.round = round;
            }
        }

        self.board = derive_board(
            &self.round,
            &self.store.submissions(),
            &self.store.fix_requests(),
            &self.store.finalized_holes(),
        );
        self.view()
    }

    /// View of the last rendered board.
    pub fn view(&self) -> BoardView {
        BoardView::new(&self.round, &self.board)
    }

    /// Gate of the last rendered board.
    pub fn can_finalize(&self) -> bool {
        self.board.can_finalize()
    }

    /// Toggle the fix request for `player` on the current hole.
    ///
    /// Requesting needs a standing submission; withdrawing is always allowed
    /// while the request is active.
    pub fn request_fix(&mut self, player: &str) -> Result<BoardView, ServiceError> {
        let player = player.trim();
        if !self.round.has_player(player) {
            return Err(ServiceError::InvalidInput(format!(
                "`{player}` is not on the roster"
            )));
        }

        self.render();
        let hole = self.round.hole;
        let status = self.board.status_of(player).cloned();
        let mut fixes = self.store.fix_requests();

        match status {
            Some(PlayerStatus::FixRequested { .. }) => {
                fixes.shift_remove(player);
                info!(player, hole, "fix request withdrawn");
            }
            Some(PlayerStatus::Submitted(_)) => {
                fixes.insert(
                    player.to_string(),
                    FixRequest {
                        hole,
                        requested_at: OffsetDateTime::now_utc(),
                    },
                );
                info!(player, hole, "fix requested");
            }
            Some(PlayerStatus::Missing) | None => {
                return Err(ServiceError::InvalidState(format!(
                    "`{player}` has no score on hole {hole} to fix"
                )));
            }
            Some(PlayerStatus::Finalized { .. }) => {
                return Err(ServiceError::InvalidState(format!(
                    "hole {hole} is already finalized"
                )));
            }
        }

        self.store.save_fix_requests(&fixes)?;
        Ok(self.render())
    }

    /// Lock the current hole, archive it and move the round to the next hole.
    ///
    /// The gate is re-checked against the store at call time, and the call is
    /// refused if another session advanced the round since the last render.
    pub fn finalize(&mut self) -> Result<BoardView, ServiceError> {
        let rendered = self.round.clone();
        archive_service::recover(&self.store)?;

        let current = self.store.round().unwrap_or_else(|| rendered.clone());
        if current.hole != rendered.hole || current.revision != rendered.revision {
            self.render();
            return Err(ServiceError::StaleRound {
                expected_hole: rendered.hole,
                expected_revision: rendered.revision,
                actual_hole: current.hole,
                actual_revision: current.revision,
            });
        }

        let board = derive_board(
            &current,
            &self.store.submissions(),
            &self.store.fix_requests(),
            &self.store.finalized_holes(),
        );
        if !board.can_finalize() {
            self.board = board;
            return Err(ServiceError::InvalidState(format!(
                "hole {} cannot be finalized yet",
                current.hole
            )));
        }

        if self.store.round().is_none() {
            self.store.save_round(&current)?;
        }
        let next = archive_service::archive_hole(&self.store, current.hole)?;
        self.round = next;
        Ok(self.render())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dao::{
        kv_store::MemoryStore,
        models::SubmissionPacket,
    };
    use crate::dto::board::VisibleStatus;

    fn round() -> RoundConfig {
        RoundConfig {
            hole: 6,
            par: 4,
            players: ["Mike", "Ben", "Dave", "Rob"].map(String::from),
            ..RoundConfig::default()
        }
    }

    fn submit(store: &RoundStore, player: &str, hole: u32, score: u8) {
        store
            .append_submission(SubmissionPacket {
                player_name: player.into(),
                hole,
                par: 4,
                score,
                fairway_hit: false,
                sand_shot: false,
                green_in_regulation: false,
                putts: 2,
                penalty_strokes: 0,
                submitted_at: OffsetDateTime::now_utc(),
            })
            .unwrap();
    }

    fn screen() -> (RoundStore, ScorekeeperScreen) {
        let store = RoundStore::new(Arc::new(MemoryStore::new()));
        let screen = ScorekeeperScreen::open(store.clone(), round());
        (store, screen)
    }

    #[test]
    fn opening_persists_round() {
        let (store, screen) = screen();
        assert_eq!(store.round(), Some(round()));
        assert_eq!(screen.view().red, 4);
    }

    #[test]
    fn render_picks_up_new_submissions() {
        let (store, mut screen) = screen();
        submit(&store, "Dave", 6, 3);
        let view = screen.render();
        assert_eq!(view.rows[2].status, VisibleStatus::Submitted);
        assert_eq!(view.rows[2].score, "3");
    }

    #[test]
    fn fix_needs_a_submission() {
        let (_store, mut screen) = screen();
        let err = screen.request_fix("Ben").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn fix_for_unknown_player_is_rejected() {
        let (_store, mut screen) = screen();
        let err = screen.request_fix("Zed").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn fix_toggles_on_and_off() {
        let (store, mut screen) = screen();
        submit(&store, "Ben", 6, 4);

        let view = screen.request_fix("Ben").unwrap();
        assert_eq!(view.amber, 1);
        assert_eq!(store.fix_requests().get("Ben").map(|f| f.hole), Some(6));

        let view = screen.request_fix("Ben").unwrap();
        assert_eq!(view.amber, 0);
        assert_eq!(view.green, 1);
        assert!(store.fix_requests().is_empty());
    }

    #[test]
    fn finalize_is_refused_until_gate_opens() {
        let (store, mut screen) = screen();
        for name in ["Mike", "Ben", "Dave"] {
            submit(&store, name, 6, 4);
        }
        screen.render();
        assert!(!screen.can_finalize());
        assert!(matches!(
            screen.finalize().unwrap_err(),
            ServiceError::InvalidState(_)
        ));
        assert!(store.history().is_empty());
    }

    #[test]
    fn gate_is_rechecked_against_the_store() {
        let (store, mut screen) = screen();
        for name in ["Mike", "Ben", "Dave", "Rob"] {
            submit(&store, name, 6, 4);
        }
        screen.render();
        assert!(screen.can_finalize());

        // Another scorekeeper flags Rob after this screen rendered.
        let mut fixes = store.fix_requests();
        fixes.insert(
            "Rob".into(),
            FixRequest {
                hole: 6,
                requested_at: OffsetDateTime::now_utc(),
            },
        );
        store.save_fix_requests(&fixes).unwrap();

        assert!(screen.finalize().is_err());
        assert!(store.finalized_holes().is_empty());
    }

    #[test]
    fn stale_round_is_rejected() {
        let (store, mut screen) = screen();
        for name in ["Mike", "Ben", "Dave", "Rob"] {
            submit(&store, name, 6, 4);
        }
        screen.render();

        let mut advanced = round();
        advanced.hole = 7;
        advanced.revision = 1;
        store.save_round(&advanced).unwrap();

        assert!(matches!(
            screen.finalize().unwrap_err(),
            ServiceError::StaleRound { actual_hole: 7, .. }
        ));
        assert_eq!(screen.round().hole, 7);
    }

    #[test]
    fn finalize_archives_and_advances() {
        let (store, mut screen) = screen();
        for name in ["Mike", "Ben", "Dave", "Rob"] {
            submit(&store, name, 6, 4);
        }
        submit(&store, "Mike", 7, 5);
        screen.render();

        let view = screen.finalize().unwrap();
        assert_eq!(view.hole, 7);
        assert_eq!(store.round().map(|r| r.hole), Some(7));
        assert_eq!(store.history().len(), 4);
        assert_eq!(store.submissions().len(), 1);
        assert_eq!(view.green, 1);
        assert_eq!(view.red, 3);
    }
}
