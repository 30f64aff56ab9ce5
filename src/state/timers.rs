//! Cancellable delayed actions driven by caller-supplied instants.
//!
//! Nothing here sleeps: the owner passes `now` into [`Timers::take_due`] and reacts to
//! whatever fired, which keeps every timer deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Scheduled<K> {
    kind: K,
    due: Instant,
}

/// Set of pending timers, at most one per kind.
#[derive(Debug, Clone)]
pub struct Timers<K> {
    scheduled: Vec<Scheduled<K>>,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            scheduled: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> Timers<K> {
    /// No timer pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire `delay` after `now`, replacing any pending timer of that kind.
    pub fn schedule(&mut self, kind: K, now: Instant, delay: Duration) {
        self.cancel_kind(kind);
        self.scheduled.push(Scheduled {
            kind,
            due: now + delay,
        });
    }

    /// Cancel whichever timer of `kind` is pending; returns whether one was.
    pub fn cancel_kind(&mut self, kind: K) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|timer| timer.kind != kind);
        before != self.scheduled.len()
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) {
        self.scheduled.clear();
    }

    /// Remove and return the kinds whose deadline is at or before `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<Scheduled<K>> = Vec::new();
        self.scheduled.retain(|timer| {
            if timer.due <= now {
                due.push(timer.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|timer| timer.due);
        due.into_iter().map(|timer| timer.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    #[test]
    fn fires_only_once_deadline_passes() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(Kind::A, t0, Duration::from_millis(100));

        assert!(timers.take_due(t0 + Duration::from_millis(99)).is_empty());
        assert_eq!(timers.take_due(t0 + Duration::from_millis(100)), vec![Kind::A]);
        assert!(timers.take_due(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn rescheduling_replaces_previous_timer() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(Kind::A, t0, Duration::from_millis(10));
        timers.schedule(Kind::A, t0, Duration::from_millis(50));

        assert!(timers.take_due(t0 + Duration::from_millis(20)).is_empty());
        assert_eq!(timers.take_due(t0 + Duration::from_millis(50)), vec![Kind::A]);
    }

    #[test]
    fn cancellation_by_kind_and_all() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(Kind::A, t0, Duration::from_millis(10));
        timers.schedule(Kind::B, t0, Duration::from_millis(5));

        assert!(timers.cancel_kind(Kind::B));
        assert!(!timers.cancel_kind(Kind::B));
        assert_eq!(timers.take_due(t0 + Duration::from_secs(1)), vec![Kind::A]);

        timers.schedule(Kind::A, t0, Duration::from_millis(10));
        timers.cancel_all();
        assert!(timers.take_due(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn due_timers_come_back_in_deadline_order() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(Kind::A, t0, Duration::from_millis(30));
        timers.schedule(Kind::B, t0, Duration::from_millis(10));

        assert_eq!(
            timers.take_due(t0 + Duration::from_millis(40)),
            vec![Kind::B, Kind::A]
        );
    }
}
