//! Player screen: binds an entry session to the shared store.
//!
//! Every interaction persists the whole entry so a reload loses nothing but
//! the in-flight timers.

use std::time::Instant;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    dao::{
        models::{PlayerEntryState, RoundConfig, SubmissionPacket},
        round_store::RoundStore,
    },
    dto::player::PlayerView,
    error::ServiceError,
    state::entry::{EntrySession, EntryTimings, Flag, SubmitAction},
};

/// What a submit press ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Waiting for the confirming press.
    Armed,
    /// Packet appended to the submissions log.
    Submitted(SubmissionPacket),
    /// Append failed; the entry stays unsubmitted and can be retried.
    Failed(String),
}

/// One player's device.
pub struct PlayerScreen {
    store: RoundStore,
    device_id: String,
    session: EntrySession,
}

impl PlayerScreen {
    /// Restore the entry saved by `device_id`, or start one for the round's hole.
    pub fn open(
        store: RoundStore,
        device_id: impl Into<String>,
        player_name: &str,
        round: &RoundConfig,
        timings: EntryTimings,
    ) -> Result<Self, ServiceError> {
        let player_name = player_name.trim();
        if !round.has_player(player_name) {
            return Err(ServiceError::InvalidInput(format!(
                "`{player_name}` is not on the roster"
            )));
        }

        let device_id = device_id.into();
        let state = store
            .entry(&device_id)
            .filter(|entry| entry.player_name == player_name && entry.hole == round.hole)
            .unwrap_or_else(|| PlayerEntryState::new(player_name, round.hole, round.par));

        let screen = Self {
            store,
            device_id,
            session: EntrySession::new(state, timings),
        };
        screen.persist();
        Ok(screen)
    }

    /// Underlying entry session.
    pub fn session(&self) -> &EntrySession {
        &self.session
    }

    /// Follow the round to a new hole when the scorekeeper has advanced it.
    ///
    /// Returns whether the entry was reset.
    pub fn sync_round(&mut self) -> bool {
        let Some(round) = self.store.round() else {
            return false;
        };
        if round.hole == self.session.state().hole {
            return false;
        }
        info!(
            player = %self.session.state().player_name,
            hole = round.hole,
            par = round.par,
            "round advanced; starting a new entry"
        );
        self.session.reset_for_hole(round.hole, round.par);
        self.persist();
        true
    }

    /// Flip a stat flag.
    pub fn toggle(&mut self, flag: Flag) {
        self.session.toggle(flag);
        self.persist();
    }

    /// Score stepper.
    pub fn step_score(&mut self, delta: i32) {
        self.session.step_score(delta);
        self.persist();
    }

    /// Keyboard or accessibility tap on the putts control.
    pub fn cycle_putts(&mut self) {
        self.session.cycle_putts();
        self.persist();
    }

    /// Pointer down on the putts control.
    pub fn press_putts(&mut self, now: Instant) {
        self.session.press_putts(now);
    }

    /// Pointer up on the putts control.
    pub fn release_putts(&mut self, now: Instant) {
        self.session.release_putts(now);
        self.persist();
    }

    /// Pointer left the control or the press was cancelled. Nothing changes.
    pub fn cancel_putts_press(&mut self) {
        self.session.cancel_putts_press();
    }

    /// Keyboard clear on the putts control.
    pub fn reset_putts(&mut self) {
        self.session.reset_putts();
        self.persist();
    }

    /// Add a penalty stroke.
    pub fn bump_penalty(&mut self) {
        self.session.bump_penalty();
        self.persist();
    }

    /// Fire due timers; persists if a hold reset changed the putts.
    pub fn tick(&mut self, now: Instant) {
        if self.session.advance(now) {
            self.persist();
        }
    }

    /// Submit press. The second press inside the arm window appends the packet.
    pub fn submit(&mut self, now: Instant) -> SubmitOutcome {
        let submitted_at = OffsetDateTime::now_utc();
        let packet = match self.session.submit(now, submitted_at) {
            SubmitAction::Armed => return SubmitOutcome::Armed,
            SubmitAction::Confirmed(packet) => packet,
        };

        match self.store.append_submission(packet.clone()) {
            Ok(()) => {
                info!(
                    player = %packet.player_name,
                    hole = packet.hole,
                    score = packet.score,
                    putts = packet.putts,
                    penalties = packet.penalty_strokes,
                    "score submitted"
                );
                self.session.mark_submitted(now, submitted_at);
                self.persist();
                SubmitOutcome::Submitted(packet)
            }
            Err(err) => {
                warn!(
                    player = %packet.player_name,
                    hole = packet.hole,
                    error = %err,
                    "score submission failed"
                );
                let reason = err.to_string();
                self.session.mark_failed(now, reason.clone());
                self.persist();
                SubmitOutcome::Failed(reason)
            }
        }
    }

    /// Current frame for the renderer.
    pub fn view(&self) -> PlayerView {
        let state = self.session.state();
        let fix_requested = self
            .store
            .fix_requests()
            .get(&state.player_name)
            .is_some_and(|fix| fix.hole == state.hole);
        PlayerView::new(&self.session, fix_requested)
    }

    fn persist(&self) {
        if let Err(err) = self.store.save_entry(&self.device_id, self.session.state()) {
            warn!(device = %self.device_id, error = %err, "failed to save player entry");
        }
    }
}
