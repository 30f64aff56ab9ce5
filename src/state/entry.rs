//! Player entry session: one device's hole entry and its arm/confirm submission.

use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::debug;

use crate::{
    dao::models::{MAX_PUTTS, PlayerEntryState, SubmissionPacket, clamp_strokes},
    state::timers::Timers,
};

/// Window during which a second submit press confirms the first.
pub const DEFAULT_ARM_TIMEOUT: Duration = Duration::from_millis(2_000);
/// Press duration after which the putts control resets instead of incrementing.
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(1_000);
/// How long "Submitted" stays on the submit control.
pub const DEFAULT_SENT_FLASH: Duration = Duration::from_millis(1_100);
/// How long the failure notice stays on the submit control.
pub const DEFAULT_FAILED_FLASH: Duration = Duration::from_millis(1_400);

/// Durations driving the session timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTimings {
    /// Confirmation window after the first submit press.
    pub arm_timeout: Duration,
    /// Press length that turns a putts tap into a reset.
    pub hold_threshold: Duration,
    /// Lifetime of the success status.
    pub sent_flash: Duration,
    /// Lifetime of the failure status.
    pub failed_flash: Duration,
}

impl Default for EntryTimings {
    fn default() -> Self {
        Self {
            arm_timeout: DEFAULT_ARM_TIMEOUT,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            sent_flash: DEFAULT_SENT_FLASH,
            failed_flash: DEFAULT_FAILED_FLASH,
        }
    }
}

/// Boolean stats a player can toggle for the hole. They are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Fairway hit off the tee.
    FairwayHit,
    /// Played out of a bunker.
    SandShot,
    /// Green reached in regulation.
    GreenInRegulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryTimer {
    Disarm,
    PuttsHold,
    StatusFlash,
}

/// Result of a submit press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// First press: the control is armed and waits for confirmation.
    Armed,
    /// Confirming press: this packet must now be appended to the shared log.
    Confirmed(SubmissionPacket),
}

/// Transient feedback shown after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// The packet reached the log.
    Submitted,
    /// The append failed for the given reason.
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
struct PuttsPress {
    reset_fired: bool,
}

/// In-memory state machine behind the player screen.
///
/// Timers are session-local and never persisted; only [`PlayerEntryState`] is.
#[derive(Debug, Clone)]
pub struct EntrySession {
    state: PlayerEntryState,
    timings: EntryTimings,
    timers: Timers<EntryTimer>,
    armed: bool,
    putts_press: Option<PuttsPress>,
    status: Option<StatusMessage>,
}

impl EntrySession {
    /// Resume `state`, bringing persisted values back into their ranges.
    pub fn new(state: PlayerEntryState, timings: EntryTimings) -> Self {
        let mut state = state;
        let score = state.score.map_or(i64::from(state.par), i64::from);
        state.score = Some(clamp_strokes(score));
        state.putts = state.putts.min(MAX_PUTTS);
        state.penalty_strokes = clamp_strokes(i64::from(state.penalty_strokes));
        Self {
            state,
            timings,
            timers: Timers::new(),
            armed: false,
            putts_press: None,
            status: None,
        }
    }

    /// Persistable part of the session.
    pub fn state(&self) -> &PlayerEntryState {
        &self.state
    }

    /// Whether the next submit press confirms.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Transient feedback still on screen.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Score shown on the stepper, within `0..=MAX_STROKES`; falls back to par if never seeded.
    pub fn score(&self) -> u8 {
        let raw = self.state.score.map_or(i64::from(self.state.par), i64::from);
        clamp_strokes(raw)
    }

    /// Start over on `hole`, dropping every pending timer.
    pub fn reset_for_hole(&mut self, hole: u32, par: u32) {
        let player_name = std::mem::take(&mut self.state.player_name);
        self.state = PlayerEntryState::new(player_name, hole, par);
        self.timers.cancel_all();
        self.armed = false;
        self.putts_press = None;
        self.status = None;
    }

    /// Flip one stat flag.
    pub fn toggle(&mut self, flag: Flag) {
        let slot = match flag {
            Flag::FairwayHit => &mut self.state.fairway_hit,
            Flag::SandShot => &mut self.state.sand_shot,
            Flag::GreenInRegulation => &mut self.state.green_in_regulation,
        };
        *slot = !*slot;
    }

    /// Move the score by `delta`, clamped to `0..=MAX_STROKES`.
    pub fn step_score(&mut self, delta: i32) {
        let next = i64::from(self.score()) + i64::from(delta);
        self.state.score = Some(clamp_strokes(next));
    }

    /// Short tap on the putts control.
    pub fn cycle_putts(&mut self) {
        self.state.putts = (self.state.putts.min(MAX_PUTTS) + 1) % (MAX_PUTTS + 1);
    }

    /// Explicit reset of the putts control (keyboard clear).
    pub fn reset_putts(&mut self) {
        self.state.putts = 0;
    }

    /// Finger down on the putts control: arms the hold-to-reset timer.
    pub fn press_putts(&mut self, now: Instant) {
        self.timers
            .schedule(EntryTimer::PuttsHold, now, self.timings.hold_threshold);
        self.putts_press = Some(PuttsPress { reset_fired: false });
    }

    /// Finger up on the putts control.
    ///
    /// A release before the hold threshold counts as a tap; once the hold reset
    /// has fired the increment is suppressed. Returns whether putts changed
    /// because of the release itself.
    pub fn release_putts(&mut self, now: Instant) -> bool {
        self.advance(now);
        let Some(press) = self.putts_press.take() else {
            return false;
        };
        if press.reset_fired {
            return false;
        }
        self.timers.cancel_kind(EntryTimer::PuttsHold);
        self.cycle_putts();
        true
    }

    /// Pointer left or the press was interrupted: neither tap nor reset.
    pub fn cancel_putts_press(&mut self) {
        self.timers.cancel_kind(EntryTimer::PuttsHold);
        self.putts_press = None;
    }

    /// Add one penalty stroke.
    pub fn bump_penalty(&mut self) {
        let next = i64::from(self.state.penalty_strokes) + 1;
        self.state.penalty_strokes = clamp_strokes(next);
    }

    /// Fire every timer due at `now`. Returns whether persisted state changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for timer in self.timers.take_due(now) {
            match timer {
                EntryTimer::Disarm => {
                    debug!(player = %self.state.player_name, "submit confirmation window expired");
                    self.armed = false;
                }
                EntryTimer::PuttsHold => {
                    if let Some(press) = self.putts_press.as_mut() {
                        press.reset_fired = true;
                    }
                    if self.state.putts != 0 {
                        self.state.putts = 0;
                        changed = true;
                    }
                }
                EntryTimer::StatusFlash => self.status = None,
            }
        }
        changed
    }

    /// Arm/confirm protocol. The first press arms; a second press inside the
    /// window disarms and yields the packet to append.
    pub fn submit(&mut self, now: Instant, submitted_at: OffsetDateTime) -> SubmitAction {
        self.advance(now);
        if !self.armed {
            self.armed = true;
            self.timers
                .schedule(EntryTimer::Disarm, now, self.timings.arm_timeout);
            return SubmitAction::Armed;
        }

        self.armed = false;
        self.timers.cancel_kind(EntryTimer::Disarm);
        SubmitAction::Confirmed(self.packet(submitted_at))
    }

    /// Record a successful append of the packet built by [`Self::submit`].
    pub fn mark_submitted(&mut self, now: Instant, at: OffsetDateTime) {
        self.state.submitted = true;
        self.state.last_submitted_at = Some(at);
        self.flash(now, StatusMessage::Submitted, self.timings.sent_flash);
    }

    /// Record a failed append; the entry stays unsubmitted and can be re-armed.
    pub fn mark_failed(&mut self, now: Instant, reason: impl Into<String>) {
        self.armed = false;
        self.flash(now, StatusMessage::Failed(reason.into()), self.timings.failed_flash);
    }

    fn flash(&mut self, now: Instant, message: StatusMessage, lifetime: Duration) {
        self.status = Some(message);
        self.timers.schedule(EntryTimer::StatusFlash, now, lifetime);
    }

    fn packet(&self, submitted_at: OffsetDateTime) -> SubmissionPacket {
        SubmissionPacket {
            player_name: self.state.player_name.clone(),
            hole: self.state.hole,
            par: self.state.par,
            score: self.score(),
            fairway_hit: self.state.fairway_hit,
            sand_shot: self.state.sand_shot,
            green_in_regulation: self.state.green_in_regulation,
            putts: self.state.putts,
            penalty_strokes: self.state.penalty_strokes,
            submitted_at,
        }
    }
}
