//! File-backed device
//!
//! Treats a file as an EEPROM image. The image is cached in memory; `flush`
//! writes it back and syncs.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::{check_span, Device};

/// EEPROM image stored in a regular file
pub struct FileDevice {
    /// Image file path
    path: PathBuf,
    /// Open handle, kept for write-back
    file: File,
    /// Cached image
    data: Vec<u8>,
    /// Unflushed writes pending
    dirty: bool,
}

impl FileDevice {
    /// Open an image file, creating or growing it to `size` bytes.
    ///
    /// Bytes added by growing are zero. An existing larger file is kept and
    /// only its first `size` bytes are addressable.
    pub fn open(path: &Path, size: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;

        if (file.metadata()?.len() as usize) < size {
            file.set_len(size as u64)?;
        }

        let mut data = vec![0u8; size];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut data)?;

        tracing::debug!(path = %path.display(), size, "opened device image");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            data,
            dirty: false,
        })
    }

    /// Image file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether writes are waiting for `flush`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Device for FileDevice {
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
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.data)?;
        self.file.sync_all()?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for FileDevice {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = %self.path.display(), "failed to flush device image: {}", e);
        }
    }
}
