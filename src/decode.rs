//! Opcode decoding: bit-field helpers and the two sealed dispatch tables.
//!
//! An opcode byte carries its own framing. Bits 7-6 give the operand count,
//! so the default PC advance is `count + 1`; bit 5 routes the byte to the
//! ALU table instead of the main one. The descriptor tables are fixed at
//! build time and the byte-keyed indexes over them are built once on first
//! use; nothing mutates them afterwards. A byte found in neither table is
//! not part of the instruction set.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::alu::AluOp;

pub const HLT: u8 = 0b0000_0001;
pub const LDI: u8 = 0b1000_0010;
pub const PRN: u8 = 0b0100_0111;
pub const PRA: u8 = 0b0100_1000;
pub const PUSH: u8 = 0b0100_0101;
pub const POP: u8 = 0b0100_0110;
pub const CALL: u8 = 0b0101_0000;
pub const RET: u8 = 0b0001_0001;
pub const IRET: u8 = 0b0001_0011;
pub const JMP: u8 = 0b0101_0100;
pub const ST: u8 = 0b1000_0100;
pub const ADD: u8 = 0b1010_0000;
pub const MUL: u8 = 0b1010_0010;

const ALU_SELECT_BIT: u8 = 0b0010_0000;

/// What an opcode does once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Halt,
    Ldi,
    Prn,
    Pra,
    Push,
    Pop,
    Call,
    Ret,
    Iret,
    Jmp,
    St,
    Alu(AluOp),
}

/// One row of a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub opcode: u8,
    pub operation: Operation,
    pub mnemonic: &'static str,
}

impl OpcodeEntry {
    /// Operand bytes following the opcode, per bits 7-6.
    pub fn operand_count(&self) -> u8 {
        operand_count(self.opcode)
    }
}

static MAIN_TABLE: &[OpcodeEntry] = &[
    OpcodeEntry { opcode: HLT, operation: Operation::Halt, mnemonic: "HLT" },
    OpcodeEntry { opcode: LDI, operation: Operation::Ldi, mnemonic: "LDI" },
    OpcodeEntry { opcode: PRN, operation: Operation::Prn, mnemonic: "PRN" },
    OpcodeEntry { opcode: PRA, operation: Operation::Pra, mnemonic: "PRA" },
    OpcodeEntry { opcode: PUSH, operation: Operation::Push, mnemonic: "PUSH" },
    OpcodeEntry { opcode: POP, operation: Operation::Pop, mnemonic: "POP" },
    OpcodeEntry { opcode: CALL, operation: Operation::Call, mnemonic: "CALL" },
    OpcodeEntry { opcode: RET, operation: Operation::Ret, mnemonic: "RET" },
    OpcodeEntry { opcode: IRET, operation: Operation::Iret, mnemonic: "IRET" },
    OpcodeEntry { opcode: JMP, operation: Operation::Jmp, mnemonic: "JMP" },
    OpcodeEntry { opcode: ST, operation: Operation::St, mnemonic: "ST" },
];

static ALU_TABLE: &[OpcodeEntry] = &[
    OpcodeEntry { opcode: ADD, operation: Operation::Alu(AluOp::Add), mnemonic: "ADD" },
    OpcodeEntry { opcode: MUL, operation: Operation::Alu(AluOp::Mul), mnemonic: "MUL" },
];

static MAIN_INDEX: Lazy<HashMap<u8, &'static OpcodeEntry>> = Lazy::new(|| index_of(MAIN_TABLE));
static ALU_INDEX: Lazy<HashMap<u8, &'static OpcodeEntry>> = Lazy::new(|| index_of(ALU_TABLE));

fn index_of(table: &'static [OpcodeEntry]) -> HashMap<u8, &'static OpcodeEntry> {
    table.iter().map(|entry| (entry.opcode, entry)).collect()
}

/// Number of operand bytes encoded in bits 7-6 of the opcode.
pub fn operand_count(opcode: u8) -> u8 {
    opcode >> 6
}

/// Whether bit 5 routes the opcode to the ALU table.
pub fn is_alu(opcode: u8) -> bool {
    opcode & ALU_SELECT_BIT != 0
}

/// Resolves an opcode in the table its ALU bit selects. `None` means the
/// byte is not an instruction.
pub fn lookup(opcode: u8) -> Option<&'static OpcodeEntry> {
    let index = if is_alu(opcode) { &ALU_INDEX } else { &MAIN_INDEX };
    index.get(&opcode).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_instruction_resolves() {
        for table in [MAIN_TABLE, ALU_TABLE] {
            for entry in table {
                let found = lookup(entry.opcode).unwrap();
                assert_eq!(found.mnemonic, entry.mnemonic);
                assert_eq!(found.operation, entry.operation);
            }
        }
    }

    #[test]
    fn alu_bit_is_consistent_with_the_tables() {
        for entry in MAIN_TABLE {
            assert!(!is_alu(entry.opcode), "{} misrouted", entry.mnemonic);
        }
        for entry in ALU_TABLE {
            assert!(is_alu(entry.opcode), "{} misrouted", entry.mnemonic);
        }
    }

    #[test]
    fn operand_counts_follow_the_top_bits() {
        assert_eq!(operand_count(HLT), 0);
        assert_eq!(operand_count(RET), 0);
        assert_eq!(operand_count(IRET), 0);
        assert_eq!(operand_count(PRN), 1);
        assert_eq!(operand_count(PUSH), 1);
        assert_eq!(operand_count(CALL), 1);
        assert_eq!(operand_count(JMP), 1);
        assert_eq!(operand_count(LDI), 2);
        assert_eq!(operand_count(ST), 2);
        assert_eq!(operand_count(ADD), 2);
        assert_eq!(operand_count(MUL), 2);
    }

    #[test]
    fn unknown_bytes_resolve_to_none() {
        assert!(lookup(0x00).is_none());
        assert!(lookup(0xFF).is_none());
        // ALU-flagged byte that is not in the ALU table.
        assert!(lookup(0b1010_0001).is_none());
        // CALL with the ALU bit forced on is not an instruction.
        assert!(lookup(CALL | ALU_SELECT_BIT).is_none());
    }
}
