//! WorkingTable implementation
//!
//! Slot pool with tombstones and a movable cursor.

use crate::error::{Result, StoreError};

use super::Slot;

/// Fixed-capacity table of records
///
/// Starts uninitialized; `init` allocates the pool exactly once.
#[derive(Debug, Clone)]
pub struct WorkingTable<X> {
    /// Slot pool, empty until `init`
    slots: Vec<Slot<X>>,

    /// Currently selected slot
    cursor: Option<usize>,

    /// Number of enabled slots
    counter: usize,
}

impl<X> WorkingTable<X> {
    /// Create an uninitialized table
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: None,
            counter: 0,
        }
    }

    /// Allocate a pool of exactly `capacity` slots
    ///
    /// Fails if the table is already initialized, if `capacity` is zero, or
    /// if the pool cannot be allocated. On failure the table stays
    /// uninitialized.
    pub fn init(&mut self, capacity: usize) -> Result<()> {
        if self.is_initialized() {
            return Err(StoreError::AllocationFailure(
                "working table already initialized".to_string(),
            ));
        }
        if capacity == 0 {
            return Err(StoreError::CapacityExceeded(
                "working table capacity must be at least 1".to_string(),
            ));
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|e| {
            StoreError::AllocationFailure(format!("{} slots: {}", capacity, e))
        })?;
        slots.extend((0..capacity).map(|_| Slot::empty()));

        self.slots = slots;
        self.cursor = None;
        self.counter = 0;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Pool size (0 when uninitialized)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the selected slot
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of enabled records
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    /// Store `record` in the first slot that is unused or tombstoned
    ///
    /// The cursor moves to the written slot. Returns its index.
    pub fn insert(&mut self, record: X) -> Result<usize> {
        if !self.is_initialized() {
            return Err(StoreError::NotInitialized(
                "working table has no pool".to_string(),
            ));
        }

        let index = self
            .slots
            .iter()
            .position(|slot| !slot.enabled)
            .ok_or_else(|| {
                StoreError::CapacityExceeded(format!(
                    "all {} slots are in use",
                    self.slots.len()
                ))
            })?;

        let slot = &mut self.slots[index];
        slot.record = Some(record);
        slot.enabled = true;
        self.counter += 1;
        self.cursor = Some(index);

        Ok(index)
    }

    /// Record under the cursor, if the cursor is set and its slot is enabled
    pub fn select(&self) -> Option<&X> {
        let slot = self.slots.get(self.cursor?)?;
        if slot.enabled {
            slot.record.as_ref()
        } else {
            None
        }
    }

    /// Overwrite the payload under the cursor in place
    ///
    /// The enabled flag is left as it is.
    pub fn update(&mut self, record: X) -> Result<()> {
        let index = self.cursor.ok_or(StoreError::NoCursor)?;
        self.slots[index].record = Some(record);
        Ok(())
    }

    /// Tombstone the slot under the cursor
    ///
    /// The cursor stays on the (now disabled) slot. Deleting an already
    /// tombstoned slot succeeds and leaves the counter alone.
    pub fn delete(&mut self) -> Result<()> {
        let index = self.cursor.ok_or(StoreError::NoCursor)?;
        self.set_enabled(index, false);
        Ok(())
    }

    /// Tombstone every slot and reset cursor and counter
    ///
    /// The pool itself is kept.
    pub fn clean(&mut self) {
        for slot in &mut self.slots {
            slot.enabled = false;
        }
        self.cursor = None;
        self.counter = 0;
    }

    /// Move the cursor to the first enabled slot
    pub fn top(&mut self) -> bool {
        match self.next_enabled_from(0) {
            Some(index) => {
                self.cursor = Some(index);
                true
            }
            None => false,
        }
    }

    /// Move the cursor to the next enabled slot after the current one
    ///
    /// Returns `false` when there is no cursor or no further enabled slot;
    /// in the latter case the cursor is cleared.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let Some(current) = self.cursor else {
            return false;
        };

        self.cursor = self.next_enabled_from(current + 1);
        self.cursor.is_some()
    }

    /// Enabled records in pool order. Does not move the cursor.
    pub fn iter(&self) -> Iter<'_, X> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Flip a slot's enabled flag, keeping the counter consistent
    pub(crate) fn set_enabled(&mut self, index: usize, enabled: bool) {
        let slot = &mut self.slots[index];
        match (slot.enabled, enabled) {
            (false, true) => self.counter += 1,
            (true, false) => self.counter -= 1,
            _ => {}
        }
        slot.enabled = enabled;
    }

    fn next_enabled_from(&self, start: usize) -> Option<usize> {
        (start..self.slots.len()).find(|&index| self.slots[index].enabled)
    }
}

impl<X> Default for WorkingTable<X> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over enabled records in pool order
pub struct Iter<'a, X> {
    slots: std::slice::Iter<'a, Slot<X>>,
}

impl<'a, X> Iterator for Iter<'a, X> {
    type Item = &'a X;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .filter(|slot| slot.enabled)
            .find_map(|slot| slot.record.as_ref())
    }
}
