//! Eight-slot register file with aliased special registers.
//!
//! R7 doubles as the stack pointer, R6 as interrupt status, R5 as interrupt
//! mask. The named accessors are views over the same eight bytes as the
//! indexed ones; nothing else in the machine holds a copy of SP/IS/IM, so
//! the slot is always the truth. Any instruction may still address the three
//! as plain general registers.

use crate::{Ls8Error, Result};

/// Number of general-purpose register slots.
pub const NUM_REGISTERS: usize = 8;
/// Slot aliased as the interrupt mask.
pub const IM: u8 = 5;
/// Slot aliased as the interrupt status.
pub const IS: u8 = 6;
/// Slot aliased as the stack pointer.
pub const SP: u8 = 7;
/// Stack pointer of an empty stack; the first push lands one cell below.
pub const SP_INIT: u8 = 0xF4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u8; NUM_REGISTERS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        let mut regs = [0; NUM_REGISTERS];
        regs[SP as usize] = SP_INIT;
        Self { regs }
    }

    pub fn get(&self, index: u8) -> Result<u8> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(Ls8Error::BadRegister { index })
    }

    pub fn set(&mut self, index: u8, value: u8) -> Result<()> {
        match self.regs.get_mut(index as usize) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Ls8Error::BadRegister { index }),
        }
    }

    pub fn sp(&self) -> u8 {
        self.regs[SP as usize]
    }

    pub fn set_sp(&mut self, value: u8) {
        self.regs[SP as usize] = value;
    }

    pub fn int_status(&self) -> u8 {
        self.regs[IS as usize]
    }

    pub fn set_int_status(&mut self, value: u8) {
        self.regs[IS as usize] = value;
    }

    pub fn int_mask(&self) -> u8 {
        self.regs[IM as usize]
    }

    pub fn set_int_mask(&mut self, value: u8) {
        self.regs[IM as usize] = value;
    }

    /// All eight values in slot order, for traces and snapshots.
    pub fn raw(&self) -> [u8; NUM_REGISTERS] {
        self.regs
    }

    pub(crate) fn restore(&mut self, regs: [u8; NUM_REGISTERS]) {
        self.regs = regs;
    }
}
