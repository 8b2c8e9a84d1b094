//! RAM-backed device
//!
//! Holds the whole image in a `Vec<u8>` and counts writes per address, which
//! makes wear distribution observable.

use crate::error::Result;

use super::{check_span, Device};

/// In-memory EEPROM image
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    /// Raw contents
    data: Vec<u8>,
    /// Number of `write_byte` calls per address
    writes: Vec<u32>,
}

impl MemoryDevice {
    /// Create a device of `size` bytes, all zero
    pub fn new(size: usize) -> Self {
        Self::filled(size, 0)
    }

    /// Create a device of `size` bytes set to `value` (0xFF mimics erased EEPROM)
    pub fn filled(size: usize, value: u8) -> Self {
        Self {
            data: vec![value; size],
            writes: vec![0; size],
        }
    }

    /// Wrap an existing image
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let writes = vec![0; bytes.len()];
        Self {
            data: bytes,
            writes,
        }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of writes `addr` has absorbed
    pub fn write_count(&self, addr: usize) -> u32 {
        self.writes.get(addr).copied().unwrap_or(0)
    }

    /// Forget write history (e.g. after formatting)
    pub fn reset_write_counts(&mut self) {
        self.writes.iter_mut().for_each(|count| *count = 0);
    }
}

impl Device for MemoryDevice {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn read_byte(&mut self, addr: usize) -> Result<u8> {
        check_span(self.data.len(), addr, 1)?;
        Ok(self.data[addr])
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        check_span(self.data.len(), addr, 1)?;
        self.data[addr] = value;
        self.writes[addr] += 1;
        Ok(())
    }
}
