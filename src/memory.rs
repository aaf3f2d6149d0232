//! Flat byte-addressable machine memory.

use crate::{Ls8Error, Result};

/// Number of addressable byte cells.
pub const MEMORY_SIZE: usize = 256;

/// 256 byte cells, zero-initialized at boot.
///
/// Addresses come in as `u16` so a program counter that has run past the
/// last cell stays representable and faults instead of wrapping silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }

    pub fn read(&self, address: u16) -> Result<u8> {
        self.cells
            .get(address as usize)
            .copied()
            .ok_or(Ls8Error::OutOfBounds {
                address: address as usize,
            })
    }

    pub fn write(&mut self, address: u16, value: u8) -> Result<()> {
        match self.cells.get_mut(address as usize) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Ls8Error::OutOfBounds {
                address: address as usize,
            }),
        }
    }

    /// Copies a program image to addresses `0..image.len()`; the rest of
    /// memory is left as is.
    pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MEMORY_SIZE {
            return Err(Ls8Error::OutOfBounds {
                address: image.len() - 1,
            });
        }
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Raw view of every cell, for traces and snapshots.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}
