//! Device Module
//!
//! Byte-addressable non-volatile memory the persistence engine writes to.
//!
//! ## Responsibilities
//! - Byte reads and writes at absolute addresses
//! - Bulk fill for formatting
//! - Envelope transfer for whole data slots
//! - Flush of any write-back cache
//!
//! Implementations only need `size`, `read_byte` and `write_byte`; everything
//! else is provided in terms of those.

mod file;
mod memory;

pub use file::FileDevice;
pub use memory::MemoryDevice;

use crate::error::{Result, StoreError};
use crate::record::{Envelope, Record};

/// Byte-addressable non-volatile storage (EEPROM and friends)
pub trait Device {
    /// Number of addressable bytes; valid addresses are `0..size()`
    fn size(&self) -> usize;

    fn read_byte(&mut self, addr: usize) -> Result<u8>;

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()>;

    /// Make completed writes durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write `value` into `len` consecutive bytes starting at `addr`
    fn fill(&mut self, addr: usize, len: usize, value: u8) -> Result<()> {
        check_span(self.size(), addr, len)?;
        for offset in 0..len {
            self.write_byte(addr + offset, value)?;
        }
        Ok(())
    }

    fn read_bytes(&mut self, addr: usize, buf: &mut [u8]) -> Result<()> {
        check_span(self.size(), addr, buf.len())?;
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr + offset)?;
        }
        Ok(())
    }

    fn write_bytes(&mut self, addr: usize, bytes: &[u8]) -> Result<()> {
        check_span(self.size(), addr, bytes.len())?;
        for (offset, byte) in bytes.iter().enumerate() {
            self.write_byte(addr + offset, *byte)?;
        }
        Ok(())
    }

    fn read_envelope<X: Record>(&mut self, addr: usize) -> Result<Envelope<X>>
    where
        Self: Sized,
    {
        let mut buf = vec![0u8; X::slot_size()];
        self.read_bytes(addr, &mut buf)?;
        Envelope::decode(&buf)
    }

    fn write_envelope<X: Record>(&mut self, addr: usize, envelope: &Envelope<X>) -> Result<()>
    where
        Self: Sized,
    {
        let bytes = envelope.encode()?;
        self.write_bytes(addr, &bytes)
    }
}

impl<D: Device + ?Sized> Device for &mut D {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn read_byte(&mut self, addr: usize) -> Result<u8> {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        (**self).write_byte(addr, value)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Reject spans reaching past the end of the device
pub(crate) fn check_span(size: usize, addr: usize, len: usize) -> Result<()> {
    match addr.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(StoreError::OutOfRange(format!(
            "{} bytes at 0x{:04x} exceed device size {}",
            len, addr, size
        ))),
    }
}
