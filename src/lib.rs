//! Emulator core for the LS-8, a small 8-bit stack-and-register machine.
//!
//! The machine is plain owned state: a 256-byte [`Memory`], an eight-slot
//! [`RegisterFile`] whose top three slots double as interrupt mask, interrupt
//! status, and stack pointer, and a [`Machine`] that runs the
//! fetch-decode-execute loop one cycle at a time. Instruction identity lives
//! in two sealed dispatch tables ([`decode`]); the timer-driven interrupt
//! path is deterministic under an injected [`Clock`]. The [`loader`] module
//! parses text program images, and the `ls8` binary wraps it all in a CLI.

use thiserror::Error;

pub mod alu;
pub mod decode;
pub mod interrupt;
pub mod loader;
pub mod machine;
pub mod memory;
pub mod registers;
pub mod snapshot;
pub mod stack;
pub mod timer;
pub mod tracer;

pub use alu::AluOp;
pub use decode::{lookup, operand_count, OpcodeEntry, Operation};
pub use interrupt::{InterruptController, NUM_LINES, TIMER_LINE, VECTOR_TABLE_BASE};
pub use loader::{load_program, parse_program};
pub use machine::{CycleOutcome, Machine, RunState};
pub use memory::{Memory, MEMORY_SIZE};
pub use registers::{RegisterFile, IM, IS, NUM_REGISTERS, SP, SP_INIT};
pub use snapshot::{MachineSnapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use timer::{Clock, ManualClock, Timer, WallClock};
pub use tracer::{Tracer, Verbosity};

pub type Result<T> = std::result::Result<T, Ls8Error>;

/// Machine and loader faults. Every machine variant is fatal to the run:
/// the loop stops with state as of the last successful write, and the
/// carried fields (opcode, PC, address) are what a postmortem needs.
#[derive(Debug, Error)]
pub enum Ls8Error {
    #[error("memory address out of bounds: {address:#06x}")]
    OutOfBounds { address: usize },
    #[error("bad register index {index} (valid: 0..8)")]
    BadRegister { index: u8 },
    #[error("unsupported opcode {opcode:#04x} at pc {pc:#04x}")]
    UnsupportedOperation { opcode: u8, pc: u16 },
    #[error("stack underflow at pc {pc:#04x}")]
    StackUnderflow { pc: u16 },
    #[error("stack overflow into the vector table at pc {pc:#04x}")]
    StackOverflow { pc: u16 },
    #[error("program line {line}: {reason}")]
    BadProgramLine { line: usize, reason: String },
    #[error("snapshot error: {0}")]
    InvalidSnapshot(String),
    #[error("serialize error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
