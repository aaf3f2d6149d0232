//! Interrupt delivery gate, vector table layout, and the timer line.
//!
//! Mask and status live in the register file (R5/R6); this type never
//! caches them. It owns only what has no register alias: the delivery gate
//! and the timer source.

use crate::timer::Timer;

/// Base of the vector table; line i's handler address is stored in the
/// cell at `VECTOR_TABLE_BASE + i`.
pub const VECTOR_TABLE_BASE: u16 = 0xF8;
/// Interrupt lines (and vector table cells).
pub const NUM_LINES: u8 = 8;
/// Line wired to the periodic timer.
pub const TIMER_LINE: u8 = 0;

#[derive(Debug)]
pub struct InterruptController {
    gate_enabled: bool,
    timer: Option<Timer>,
}

impl InterruptController {
    pub fn new(timer: Option<Timer>) -> Self {
        Self {
            gate_enabled: true,
            timer,
        }
    }

    pub fn gate_enabled(&self) -> bool {
        self.gate_enabled
    }

    /// Closed on interrupt entry; nothing is delivered until IRET reopens
    /// it.
    pub fn close_gate(&mut self) {
        self.gate_enabled = false;
    }

    pub fn open_gate(&mut self) {
        self.gate_enabled = true;
    }

    pub fn set_timer(&mut self, timer: Option<Timer>) {
        self.timer = timer;
    }

    /// Polls the timer source. True means line 0 should be raised this
    /// cycle. A closed gate swallows nothing: the deadline stays pending
    /// and fires on the first poll after the gate reopens.
    pub fn timer_fired(&mut self, now: u64) -> bool {
        if !self.gate_enabled {
            return false;
        }
        match self.timer.as_mut() {
            Some(timer) => timer.fire(now),
            None => false,
        }
    }

    /// Lowest set line of `mask & status`, the one deliverable this cycle.
    pub fn lowest_pending(mask: u8, status: u8) -> Option<u8> {
        let pending = mask & status;
        if pending == 0 {
            None
        } else {
            Some(pending.trailing_zeros() as u8)
        }
    }

    /// Address of the vector cell for `line`.
    pub fn vector_address(line: u8) -> u16 {
        VECTOR_TABLE_BASE + line as u16
    }

    pub(crate) fn timer(&self) -> Option<&Timer> {
        self.timer.as_ref()
    }
}
