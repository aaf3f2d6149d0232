//! Whole-machine state capture as JSON.
//!
//! Everything a run needs to resume lives in one flat struct: memory,
//! registers, PC, FL, the delivery gate, and the timer deadline. Clock,
//! console, and tracer are the host's business and are re-attached on
//! restore.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::memory::MEMORY_SIZE;
use crate::registers::NUM_REGISTERS;
use crate::{Ls8Error, Result};

pub const SNAPSHOT_MAGIC: &str = "ls8.snapshot";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub magic: String,
    pub version: u32,
    pub cycle_count: u64,
    pub pc: u16,
    pub fl: u8,
    pub registers: [u8; NUM_REGISTERS],
    pub memory: Vec<u8>,
    pub gate_enabled: bool,
    pub timer_period: Option<u64>,
    pub timer_next_fire: Option<u64>,
}

impl MachineSnapshot {
    pub fn validate(&self) -> Result<()> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(Ls8Error::InvalidSnapshot(format!(
                "bad magic {:?}",
                self.magic
            )));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(Ls8Error::InvalidSnapshot(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.memory.len() != MEMORY_SIZE {
            return Err(Ls8Error::InvalidSnapshot(format!(
                "memory dump is {} bytes, want {MEMORY_SIZE}",
                self.memory.len()
            )));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let snapshot: MachineSnapshot = serde_json::from_slice(&bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
