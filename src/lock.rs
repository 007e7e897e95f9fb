//! Touch-sensor hysteresis and prismatic-joint locking.
//!
//! Each end of the structure (top, bottom) carries a set of touch sensors.
//! An end "should pause" only when *every* sensor at that end reports
//! contact; it "should unpause" when every sensor at the *opposite* end
//! does. A per-end debounce counter advances only while the sensors press
//! toward the opposite state, and the state flips once the counter exceeds
//! the hysteresis window.
//!
//! [`HysteresisLock::update`] returns `true` only on the tick of transition
//! *into* the paused state. Callers must treat `false` strictly as "no lock
//! event this tick", never as "unlocked"; the paused level is queried
//! separately via [`HysteresisLock::is_paused`].

use crate::robot::End;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct EndState {
    paused: bool,
    counter: u64,
}

/// Debounced locking state machine for the two prismatic joints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HysteresisLock {
    hysteresis_seconds: f64,
    tick_rate_hz: f64,
    top: EndState,
    bottom: EndState,
}

impl HysteresisLock {
    /// Create a lock machine with the given debounce window and tick rate.
    #[must_use]
    pub fn new(hysteresis_seconds: f64, tick_rate_hz: f64) -> Self {
        Self {
            hysteresis_seconds,
            tick_rate_hz,
            top: EndState::default(),
            bottom: EndState::default(),
        }
    }

    /// Current debounce window (s).
    #[must_use]
    pub fn hysteresis_seconds(&self) -> f64 {
        self.hysteresis_seconds
    }

    /// Replace the debounce window. Applied from the next tick on; running
    /// counters are kept.
    pub fn set_hysteresis_seconds(&mut self, seconds: f64) {
        self.hysteresis_seconds = seconds;
    }

    /// Whether the given end is currently paused (joint locked).
    #[must_use]
    pub fn is_paused(&self, end: End) -> bool {
        self.state(end).paused
    }

    /// Current debounce counter for the given end, in ticks.
    #[must_use]
    pub fn counter(&self, end: End) -> u64 {
        self.state(end).counter
    }

    /// Reset both ends to unpaused with zeroed counters.
    pub fn reset(&mut self) {
        self.top = EndState::default();
        self.bottom = EndState::default();
    }

    /// "All sensors in contact" predicate. An empty snapshot is vacuously
    /// true, matching the reference behavior.
    #[must_use]
    pub fn all_touching(snapshot: &[bool]) -> bool {
        snapshot.iter().all(|&touching| touching)
    }

    /// Advance one end's state machine by one tick.
    ///
    /// `this_end` is the touch snapshot of the end being updated;
    /// `opposite_end` is the snapshot of the other end. Returns `true` only
    /// on the tick the end transitions into the paused state.
    #[allow(clippy::cast_precision_loss)]
    pub fn update(&mut self, end: End, this_end: &[bool], opposite_end: &[bool]) -> bool {
        let should_pause = Self::all_touching(this_end);
        let should_unpause = Self::all_touching(opposite_end);
        let max_count = self.hysteresis_seconds * self.tick_rate_hz;

        let state = self.state_mut(end);
        if (should_pause && !state.paused) || (should_unpause && state.paused) {
            state.counter += 1;
        }

        let mut locked = false;
        if should_pause && state.counter as f64 > max_count {
            if state.paused {
                state.paused = false;
            } else {
                state.paused = true;
                locked = true;
            }
            state.counter = 0;
        }
        locked
    }

    fn state(&self, end: End) -> &EndState {
        match end {
            End::Top => &self.top,
            End::Bottom => &self.bottom,
        }
    }

    fn state_mut(&mut self, end: End) -> &mut EndState {
        match end {
            End::Top => &mut self.top,
            End::Bottom => &mut self.bottom,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const CONTACT: [bool; 3] = [true, true, true];
    const PARTIAL: [bool; 3] = [true, false, true];
    const CLEAR: [bool; 3] = [false, false, false];

    fn lock_1s() -> HysteresisLock {
        // 1 s window at 1 kHz: flips after counter exceeds 1000 ticks.
        HysteresisLock::new(1.0, 1000.0)
    }

    #[test]
    fn no_contact_never_transitions() {
        let mut lock = lock_1s();
        for _ in 0..10_000 {
            assert!(!lock.update(End::Bottom, &CLEAR, &CLEAR));
        }
        assert!(!lock.is_paused(End::Bottom));
        assert_eq!(lock.counter(End::Bottom), 0);
    }

    #[test]
    fn partial_contact_never_transitions() {
        let mut lock = lock_1s();
        for _ in 0..10_000 {
            assert!(!lock.update(End::Top, &PARTIAL, &CLEAR));
        }
        assert!(!lock.is_paused(End::Top));
        assert_eq!(lock.counter(End::Top), 0);
    }

    #[test]
    fn sustained_contact_locks_exactly_once() {
        let mut lock = lock_1s();
        let mut events = 0;
        for _ in 0..3000 {
            if lock.update(End::Bottom, &CONTACT, &CLEAR) {
                events += 1;
            }
        }
        assert_eq!(events, 1);
        assert!(lock.is_paused(End::Bottom));
    }

    #[test]
    fn lock_fires_on_the_tick_after_the_window() {
        let mut lock = lock_1s();
        for tick in 1..=1002 {
            let event = lock.update(End::Bottom, &CONTACT, &CLEAR);
            // Counter must exceed 1000, so the event lands on tick 1001.
            assert_eq!(event, tick == 1001, "tick {tick}");
        }
    }

    #[test]
    fn opposite_end_contact_unlocks_without_an_event() {
        let mut lock = lock_1s();
        for _ in 0..1500 {
            lock.update(End::Bottom, &CONTACT, &CLEAR);
        }
        assert!(lock.is_paused(End::Bottom));

        // Opposite-end contact presses toward unpause; the flip itself is
        // gated on this end still reporting full contact.
        let mut events = 0;
        for _ in 0..1500 {
            if lock.update(End::Bottom, &CONTACT, &CONTACT) {
                events += 1;
            }
        }
        assert_eq!(events, 0);
        assert!(!lock.is_paused(End::Bottom));
    }

    #[test]
    fn counter_only_advances_toward_the_opposite_state() {
        let mut lock = lock_1s();

        // Unpaused with no pause pressure: counter stays put.
        lock.update(End::Top, &CLEAR, &CONTACT);
        assert_eq!(lock.counter(End::Top), 0);

        // Unpaused with pause pressure: counter advances.
        lock.update(End::Top, &CONTACT, &CLEAR);
        assert_eq!(lock.counter(End::Top), 1);
    }

    #[test]
    fn ends_are_independent() {
        let mut lock = lock_1s();
        for _ in 0..1500 {
            lock.update(End::Top, &CONTACT, &CLEAR);
        }
        assert!(lock.is_paused(End::Top));
        assert!(!lock.is_paused(End::Bottom));
        assert_eq!(lock.counter(End::Bottom), 0);
    }

    #[test]
    fn empty_snapshot_is_vacuous_contact() {
        assert!(HysteresisLock::all_touching(&[]));
        assert!(HysteresisLock::all_touching(&[true, true]));
        assert!(!HysteresisLock::all_touching(&[true, false]));
    }

    #[test]
    fn window_change_applies_to_later_ticks() {
        let mut lock = HysteresisLock::new(2.0, 1000.0);
        for _ in 0..1500 {
            assert!(!lock.update(End::Bottom, &CONTACT, &CLEAR));
        }
        // Shrinking the window lets the already-accumulated count flip.
        lock.set_hysteresis_seconds(1.0);
        assert!(lock.update(End::Bottom, &CONTACT, &CLEAR));
    }

    #[test]
    fn reset_clears_both_ends() {
        let mut lock = lock_1s();
        for _ in 0..1500 {
            lock.update(End::Top, &CONTACT, &CLEAR);
        }
        lock.reset();
        assert!(!lock.is_paused(End::Top));
        assert_eq!(lock.counter(End::Top), 0);
        assert_eq!(lock.counter(End::Bottom), 0);
    }
}
