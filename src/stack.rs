//! Stack primitives over RegisterFile slot 7.
//!
//! The stack grows downward from [`SP_INIT`]; the cells above it
//! (0xF5-0xFF) belong to the interrupt vector table. The pointer is read
//! and written through the register file on every operation. `pc` in both
//! signatures is error context only.

use crate::memory::Memory;
use crate::registers::{RegisterFile, SP_INIT};
use crate::{Ls8Error, Result};

/// Decrements SP and stores `value` at the new top. Decrementing past zero
/// would wrap the pointer into the vector table, so that is a fault.
pub fn push(memory: &mut Memory, regs: &mut RegisterFile, value: u8, pc: u16) -> Result<()> {
    let sp = regs.sp();
    let new_sp = sp.checked_sub(1).ok_or(Ls8Error::StackOverflow { pc })?;
    memory.write(new_sp as u16, value)?;
    regs.set_sp(new_sp);
    Ok(())
}

/// Loads the value at the top and increments SP. Popping with the pointer
/// at the empty sentinel is underflow.
pub fn pop(memory: &Memory, regs: &mut RegisterFile, pc: u16) -> Result<u8> {
    let sp = regs.sp();
    if sp == SP_INIT {
        return Err(Ls8Error::StackUnderflow { pc });
    }
    let value = memory.read(sp as u16)?;
    regs.set_sp(sp.wrapping_add(1));
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_moves_sp_down_one_cell() {
        let mut memory = Memory::new();
        let mut regs = RegisterFile::new();
        push(&mut memory, &mut regs, 0x42, 0).unwrap();
        assert_eq!(regs.sp(), SP_INIT - 1);
        assert_eq!(memory.read((SP_INIT - 1) as u16).unwrap(), 0x42);
    }

    #[test]
    fn pop_returns_last_pushed_value() {
        let mut memory = Memory::new();
        let mut regs = RegisterFile::new();
        push(&mut memory, &mut regs, 1, 0).unwrap();
        push(&mut memory, &mut regs, 2, 0).unwrap();
        assert_eq!(pop(&memory, &mut regs, 0).unwrap(), 2);
        assert_eq!(pop(&memory, &mut regs, 0).unwrap(), 1);
        assert_eq!(regs.sp(), SP_INIT);
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let memory = Memory::new();
        let mut regs = RegisterFile::new();
        let err = pop(&memory, &mut regs, 0x21).unwrap_err();
        assert!(matches!(err, Ls8Error::StackUnderflow { pc: 0x21 }));
        assert_eq!(regs.sp(), SP_INIT);
    }

    #[test]
    fn push_at_sp_zero_overflows() {
        let mut memory = Memory::new();
        let mut regs = RegisterFile::new();
        regs.set_sp(0);
        let err = push(&mut memory, &mut regs, 0xAA, 0x07).unwrap_err();
        assert!(matches!(err, Ls8Error::StackOverflow { pc: 0x07 }));
        assert_eq!(regs.sp(), 0);
    }

    #[test]
    fn sp_is_read_through_the_register_file() {
        let mut memory = Memory::new();
        let mut regs = RegisterFile::new();
        // A program is free to repoint R7; the stack must follow.
        regs.set(7, 0x80).unwrap();
        push(&mut memory, &mut regs, 0x11, 0).unwrap();
        assert_eq!(memory.read(0x7F).unwrap(), 0x11);
        assert_eq!(regs.get(7).unwrap(), 0x7F);
    }
}
