//! Persistence Engine
//!
//! Formats, validates and maintains the circular region on a device.
//!
//! ## Lifecycle
//! ```text
//! Unformatted ──init──▶ Formatted ──check──▶ Ready ──save/load──▶ Ready
//!      ▲                                       │
//!      └──────────── check fails ──────────────┘
//! ```

use std::marker::PhantomData;

use crate::device::Device;
use crate::error::{Result, StoreError};
use crate::record::{Envelope, Record};
use crate::table::WorkingTable;

use super::RingLayout;

/// Where the engine stands with its region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No region configured, or the last validation failed
    Unformatted,
    /// Header written or confirmed, ring not scanned yet
    Formatted,
    /// Header valid and top generation located
    Ready,
}

/// Snapshot of a region for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub start: usize,
    pub capacity: usize,
    pub slot_size: usize,
    /// Status byte per ring index
    pub ring: Vec<u8>,
    /// Ring index of the freshest generation
    pub top_index: usize,
    /// Data address of the freshest generation
    pub top_address: usize,
    /// Record count persisted with the freshest generation
    pub persisted_count: u8,
    /// First address past the region
    pub region_end: usize,
}

/// Wear-leveling persistence for records of type `X` on device `D`
///
/// `D` may be an owned device or `&mut` to one the caller keeps.
pub struct PersistenceEngine<X, D> {
    /// Backing non-volatile memory
    device: D,

    /// Geometry, set by `init` even when formatting later fails
    layout: Option<RingLayout>,

    state: EngineState,

    /// Ring position of the freshest generation (valid when Ready)
    top_position: usize,

    /// Data address paired with `top_position` (valid when Ready)
    top_address: usize,

    _record: PhantomData<fn() -> X>,
}

impl<X: Record, D: Device> PersistenceEngine<X, D> {
    /// Create an engine with no region configured
    pub fn new(device: D) -> Self {
        Self {
            device,
            layout: None,
            state: EngineState::Unformatted,
            top_position: 0,
            top_address: 0,
            _record: PhantomData,
        }
    }

    /// Configure the region at `start` with `capacity` slots
    ///
    /// If the header already on the device matches, existing data is kept.
    /// Otherwise the whole region is zeroed and a fresh header written,
    /// discarding anything persisted there. Always finishes with `check`.
    pub fn init(&mut self, start: usize, capacity: usize) -> Result<()> {
        self.layout = None;
        self.state = EngineState::Unformatted;

        let layout = RingLayout::new(start, capacity, X::slot_size())?;
        self.layout = Some(layout);

        if layout.region_end() > self.device.size() {
            return Err(StoreError::OutOfRange(format!(
                "region 0x{:04x}..0x{:04x} exceeds device size {}",
                layout.start(),
                layout.region_end(),
                self.device.size()
            )));
        }

        if self.header_matches(&layout)? {
            tracing::debug!(start, capacity, "existing region header matches");
        } else {
            tracing::info!(
                start,
                capacity,
                len = layout.region_len(),
                "formatting region"
            );
            self.device.fill(layout.start(), layout.region_len(), 0x00)?;
            for (addr, value) in layout.header() {
                self.device.write_byte(addr, value)?;
            }
            self.device.flush()?;
        }

        self.state = EngineState::Formatted;
        self.check()
    }

    /// Validate the header and locate the freshest generation
    pub fn check(&mut self) -> Result<()> {
        let layout = self.layout.ok_or_else(|| {
            StoreError::NotInitialized("no region configured".to_string())
        })?;

        if !self.header_matches(&layout)? {
            self.state = EngineState::Unformatted;
            tracing::warn!(start = layout.start(), "region header does not match");
            return Err(StoreError::Corrupt(format!(
                "header at 0x{:04x} does not describe a {}-slot ring",
                layout.start(),
                layout.capacity()
            )));
        }

        let top = self.scan_top(&layout)?;
        self.top_position = top;
        self.top_address = layout.data_address(top);
        self.state = EngineState::Ready;

        tracing::debug!(
            top_index = layout.index_of(top),
            top_address = self.top_address,
            "located freshest generation"
        );
        Ok(())
    }

    /// Persist the enabled records of `table` as the next generation
    ///
    /// Records go out in pool order into consecutive slots starting at the
    /// new top, wrapping around the ring. The write is verified by a fresh
    /// `check` and a read-back of the persisted count.
    pub fn save(&mut self, table: &WorkingTable<X>) -> Result<()> {
        let layout = self.require_ready()?;
        self.check()?;

        let count = table.counter();
        if count > layout.capacity() {
            return Err(StoreError::CapacityExceeded(format!(
                "{} enabled records, ring holds {}",
                count,
                layout.capacity()
            )));
        }

        // Wear leveling: bump the generation one position further
        let generation = self.device.read_byte(self.top_position)?.wrapping_add(1);
        let top = layout.advance(self.top_position);
        self.device.write_byte(top, generation)?;
        self.top_position = top;
        self.top_address = layout.data_address(top);

        let mut position = top;
        for record in table.iter() {
            let envelope = Envelope::new(record.clone(), true);
            self.device
                .write_envelope(layout.data_address(position), &envelope)?;
            position = layout.advance(position);
        }

        self.device
            .write_byte(layout.count_address(self.top_address), count as u8)?;
        self.device.flush()?;

        self.check()?;
        let persisted = self.device.read_byte(layout.count_address(self.top_address))?;
        if persisted as usize != count {
            tracing::warn!(persisted, expected = count, "save verification failed");
            return Err(StoreError::Corrupt(format!(
                "persisted count {} does not match {} records",
                persisted, count
            )));
        }

        tracing::debug!(
            generation,
            top_index = layout.index_of(top),
            records = count,
            "saved generation"
        );
        Ok(())
    }

    /// Replace the contents of `table` with the freshest generation
    pub fn load(&mut self, table: &mut WorkingTable<X>) -> Result<()> {
        let layout = self.require_ready()?;
        self.check()?;

        table.clean();

        let count = self.device.read_byte(layout.count_address(self.top_address))? as usize;
        if count > layout.capacity() {
            return Err(StoreError::Corrupt(format!(
                "persisted count {} exceeds ring capacity {}",
                count,
                layout.capacity()
            )));
        }

        let mut position = self.top_position;
        for _ in 0..count {
            let envelope: Envelope<X> =
                self.device.read_envelope(layout.data_address(position))?;
            let index = table.insert(envelope.payload)?;
            table.set_enabled(index, envelope.enabled);
            position = layout.advance(position);
        }

        tracing::debug!(
            top_index = layout.index_of(self.top_position),
            records = count,
            "loaded generation"
        );
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn layout(&self) -> Option<&RingLayout> {
        self.layout.as_ref()
    }

    /// Data address of the freshest generation, once Ready
    pub fn top_address(&self) -> Option<usize> {
        (self.state == EngineState::Ready).then_some(self.top_address)
    }

    /// First address past the configured region, `None` if never configured
    pub fn next_free_address(&self) -> Option<usize> {
        self.layout.map(|layout| layout.region_end())
    }

    /// CRC32 over every byte of the configured region
    pub fn checksum(&mut self) -> Result<u32> {
        let layout = self.layout.ok_or_else(|| {
            StoreError::NotInitialized("no region configured".to_string())
        })?;

        let mut bytes = vec![0u8; layout.region_len()];
        self.device.read_bytes(layout.start(), &mut bytes)?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&bytes);
        Ok(hasher.finalize())
    }

    /// Read the ring and top generation for diagnostics
    pub fn inspect(&mut self) -> Result<RegionInfo> {
        let layout = self.require_ready()?;

        let mut ring = vec![0u8; layout.capacity()];
        self.device.read_bytes(layout.first_position(), &mut ring)?;
        let persisted_count = self.device.read_byte(layout.count_address(self.top_address))?;

        Ok(RegionInfo {
            start: layout.start(),
            capacity: layout.capacity(),
            slot_size: layout.slot_size(),
            ring,
            top_index: layout.index_of(self.top_position),
            top_address: self.top_address,
            persisted_count,
            region_end: layout.region_end(),
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn require_ready(&self) -> Result<RingLayout> {
        match (self.state, self.layout) {
            (EngineState::Ready, Some(layout)) => Ok(layout),
            _ => Err(StoreError::NotInitialized(
                "storage is not formatted and validated".to_string(),
            )),
        }
    }

    fn header_matches(&mut self, layout: &RingLayout) -> Result<bool> {
        for (addr, expected) in layout.header() {
            if self.device.read_byte(addr)? != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Follow the chain of +1 generations from the first ring position
    ///
    /// Stops at the first break, or after one trip around the ring so a
    /// degenerate ring cannot loop forever.
    fn scan_top(&mut self, layout: &RingLayout) -> Result<usize> {
        let mut current = layout.first_position();
        let mut value = self.device.read_byte(current)?;

        for _ in 0..layout.capacity() {
            let next = layout.advance(current);
            let next_value = self.device.read_byte(next)?;
            if next_value != value.wrapping_add(1) {
                break;
            }
            current = next;
            value = next_value;
        }

        Ok(current)
    }
}
