//! Ring layout
//!
//! Pure address arithmetic for one configured region. Ring positions are
//! absolute device addresses of status bytes, `first_position()` through
//! `last_position()` inclusive.

use crate::config::MAX_RING_CAPACITY;
use crate::error::{Result, StoreError};

use super::{BEGIN_MARKER, END_MARKER, HEADER_OVERHEAD};

/// Geometry of a region at `start` holding `capacity` slots of `slot_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingLayout {
    start: usize,
    capacity: usize,
    slot_size: usize,
}

impl RingLayout {
    pub fn new(start: usize, capacity: usize, slot_size: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_RING_CAPACITY {
            return Err(StoreError::CapacityExceeded(format!(
                "ring capacity {} outside 1..={}",
                capacity, MAX_RING_CAPACITY
            )));
        }
        if slot_size == 0 {
            return Err(StoreError::Config("slot size must be at least 1".to_string()));
        }

        let layout = Self {
            start,
            capacity,
            slot_size,
        };

        // The region end must itself be representable
        capacity
            .checked_mul(slot_size)
            .and_then(|data| data.checked_add(capacity + HEADER_OVERHEAD))
            .and_then(|len| len.checked_add(start))
            .ok_or_else(|| {
                StoreError::OutOfRange(format!(
                    "region at 0x{:x} with {} slots overflows the address space",
                    start, capacity
                ))
            })?;

        Ok(layout)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    // =========================================================================
    // Header
    // =========================================================================

    pub fn begin_marker_address(&self) -> usize {
        self.start
    }

    pub fn capacity_address(&self) -> usize {
        self.start + 1
    }

    pub fn end_marker_address(&self) -> usize {
        self.start + self.capacity + 2
    }

    /// Header bytes as they must appear on the device, with their addresses
    pub fn header(&self) -> [(usize, u8); 3] {
        [
            (self.begin_marker_address(), BEGIN_MARKER),
            (self.capacity_address(), self.capacity as u8),
            (self.end_marker_address(), END_MARKER),
        ]
    }

    // =========================================================================
    // Status Ring
    // =========================================================================

    pub fn first_position(&self) -> usize {
        self.start + 2
    }

    pub fn last_position(&self) -> usize {
        self.start + self.capacity + 1
    }

    /// Next ring position, wrapping from the last back to the first
    pub fn advance(&self, position: usize) -> usize {
        if position + 1 > self.last_position() {
            self.first_position()
        } else {
            position + 1
        }
    }

    /// Ring index (0-based) of an absolute ring position
    pub fn index_of(&self, position: usize) -> usize {
        position - self.first_position()
    }

    /// All ring positions in order
    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.first_position()..=self.last_position()
    }

    // =========================================================================
    // Data Slots
    // =========================================================================

    /// Address of data slot 0
    pub fn data_base(&self) -> usize {
        self.start + self.capacity + HEADER_OVERHEAD
    }

    /// Data slot paired with a ring position
    pub fn data_address(&self, position: usize) -> usize {
        self.data_base() + self.index_of(position) * self.slot_size
    }

    /// Where the record count of the generation starting at `top_data` lives
    ///
    /// This is the byte right before the generation's first slot: the spare
    /// header byte for slot 0, otherwise the flag byte of the preceding slot.
    pub fn count_address(&self, top_data: usize) -> usize {
        top_data - 1
    }

    /// Total bytes the region occupies
    pub fn region_len(&self) -> usize {
        self.capacity * self.slot_size + self.capacity + HEADER_OVERHEAD
    }

    /// First address past the region
    pub fn region_end(&self) -> usize {
        self.start + self.region_len()
    }
}
