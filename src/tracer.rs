//! Leveled run diagnostics.
//!
//! The tracer is a plain value handed to the machine at construction, not
//! process-global state. It writes to stderr so traced runs keep program
//! output on stdout clean.

use std::fmt;

use crate::decode::OpcodeEntry;
use crate::registers::RegisterFile;

/// How much a run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Quiet,
    /// Interrupt entries and returns, halts.
    Events,
    /// Everything above plus one line per executed cycle.
    Cycles,
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        match level {
            0 => Verbosity::Quiet,
            1 => Verbosity::Events,
            _ => Verbosity::Cycles,
        }
    }
}

#[derive(Debug, Default)]
pub struct Tracer {
    verbosity: Verbosity,
}

impl Tracer {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// One line per cycle: fetched bytes, mnemonic, then the whole register
    /// file, pre-execution.
    pub fn cycle(
        &self,
        cycle: u64,
        pc: u16,
        entry: &OpcodeEntry,
        operands: &[u8],
        regs: &RegisterFile,
    ) {
        if self.verbosity < Verbosity::Cycles {
            return;
        }
        let mut bytes = format!("{:02X}", entry.opcode);
        for byte in operands {
            bytes.push_str(&format!(" {byte:02X}"));
        }
        let dump = regs
            .raw()
            .iter()
            .map(|value| format!("{value:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!(
            "cycle {cycle:>6} pc={pc:02X} {bytes:<8} {mnemonic:<4} | {dump}",
            mnemonic = entry.mnemonic
        );
    }

    /// Out-of-band events (interrupt entry/return, halt).
    pub fn event(&self, cycle: u64, message: fmt::Arguments) {
        if self.verbosity < Verbosity::Events {
            return;
        }
        eprintln!("cycle {cycle:>6} {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_from_flag_counts() {
        assert_eq!(Verbosity::from(0), Verbosity::Quiet);
        assert_eq!(Verbosity::from(1), Verbosity::Events);
        assert_eq!(Verbosity::from(2), Verbosity::Cycles);
        assert_eq!(Verbosity::from(7), Verbosity::Cycles);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(Verbosity::Quiet < Verbosity::Events);
        assert!(Verbosity::Events < Verbosity::Cycles);
    }
}
