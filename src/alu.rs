//! Arithmetic unit: pure two-operand operations with 8-bit wraparound.

use crate::registers::RegisterFile;
use crate::Result;

/// Operations reachable through the ALU dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Mul,
}

impl AluOp {
    /// Computes over `reg[a]` and `reg[b]`, storing the result in `reg[a]`.
    /// Results wrap modulo 256 like the hardware would.
    pub fn apply(self, regs: &mut RegisterFile, a: u8, b: u8) -> Result<()> {
        let lhs = regs.get(a)?;
        let rhs = regs.get(b)?;
        let value = match self {
            AluOp::Add => lhs.wrapping_add(rhs),
            AluOp::Mul => lhs.wrapping_mul(rhs),
        };
        regs.set(a, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_stores_into_first_operand() {
        let mut regs = RegisterFile::new();
        regs.set(0, 10).unwrap();
        regs.set(1, 20).unwrap();
        AluOp::Add.apply(&mut regs, 0, 1).unwrap();
        assert_eq!(regs.get(0).unwrap(), 30);
        assert_eq!(regs.get(1).unwrap(), 20);
    }

    #[test]
    fn add_wraps_at_256() {
        let mut regs = RegisterFile::new();
        regs.set(0, 255).unwrap();
        regs.set(1, 2).unwrap();
        AluOp::Add.apply(&mut regs, 0, 1).unwrap();
        assert_eq!(regs.get(0).unwrap(), 1);
    }

    #[test]
    fn mul_wraps_at_256() {
        let mut regs = RegisterFile::new();
        regs.set(2, 16).unwrap();
        regs.set(3, 32).unwrap();
        AluOp::Mul.apply(&mut regs, 2, 3).unwrap();
        assert_eq!(regs.get(2).unwrap(), 0);
    }

    #[test]
    fn bad_register_propagates() {
        let mut regs = RegisterFile::new();
        assert!(AluOp::Add.apply(&mut regs, 9, 0).is_err());
        assert!(AluOp::Mul.apply(&mut regs, 0, 9).is_err());
    }
}
