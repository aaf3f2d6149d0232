//! Time sources and the periodic timer feeding interrupt line 0.
//!
//! The machine never reads wall time directly; it asks an injected
//! [`Clock`] for a monotonic count of abstract time units. [`WallClock`]
//! maps one unit to one elapsed second, matching the conventional LS-8
//! timer tick; [`ManualClock`] is advanced by hand for deterministic runs
//! and tests. Swapping clocks changes nothing about interrupt semantics.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic supplier of elapsed time units.
pub trait Clock {
    fn now(&self) -> u64;
}

/// One time unit per wall-clock second since construction.
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Hand-advanced clock. Clones share one counter, so a test can keep a
/// handle while the machine owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    units: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, units: u64) {
        self.units.set(self.units.get() + units);
    }

    pub fn set(&self, units: u64) {
        self.units.set(units);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.units.get()
    }
}

/// Periodic source keyed to an absolute next-fire deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    period: u64,
    next_fire: u64,
}

impl Timer {
    pub fn new(period: u64) -> Self {
        // A zero period could never roll the deadline forward.
        let period = period.max(1);
        Self {
            period,
            next_fire: period,
        }
    }

    /// Reports whether the deadline has passed, rolling it forward past
    /// `now`. At most one firing per call, however late the caller checks.
    pub fn fire(&mut self, now: u64) -> bool {
        if now < self.next_fire {
            return false;
        }
        while self.next_fire <= now {
            self.next_fire += self.period;
        }
        true
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub(crate) fn next_fire(&self) -> u64 {
        self.next_fire
    }

    pub(crate) fn restore(&mut self, next_fire: u64) {
        self.next_fire = next_fire;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_the_period_boundary() {
        let mut timer = Timer::new(3);
        assert!(!timer.fire(0));
        assert!(!timer.fire(2));
        assert!(timer.fire(3));
        assert!(!timer.fire(4));
        assert!(timer.fire(6));
    }

    #[test]
    fn late_check_fires_once_and_rolls_past_now() {
        let mut timer = Timer::new(1);
        assert!(timer.fire(10));
        assert!(!timer.fire(10));
        assert!(timer.fire(11));
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut timer = Timer::new(0);
        assert_eq!(timer.period(), 1);
        assert!(timer.fire(1));
    }

    #[test]
    fn manual_clock_handles_share_the_counter() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(5);
        assert_eq!(clock.now(), 5);
        clock.set(2);
        assert_eq!(handle.now(), 2);
    }
}
