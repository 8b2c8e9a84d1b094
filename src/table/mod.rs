//! Working Table Module
//!
//! Fixed-capacity in-memory record set that save/load synchronize with the
//! device.
//!
//! ## Responsibilities
//! - Allocate the slot pool once, never grow or shrink it
//! - First-fit insertion into unused or tombstoned slots
//! - Soft delete (tombstones) without reclaiming slots
//! - Cursor navigation over enabled records in pool order
//!
//! ## Data Structure Choice
//! An index-addressed `Vec` of slots plus an optional cursor index:
//! - Pool order is the persisted order, so it must be stable
//! - No linked nodes, no dangling cursor

mod pool;

pub use pool::{Iter, WorkingTable};

/// One pool slot
#[derive(Debug, Clone)]
pub(crate) struct Slot<X> {
    /// Payload, `None` until the slot is first used
    pub(crate) record: Option<X>,

    /// Live (`true`) or tombstoned/unused (`false`)
    pub(crate) enabled: bool,
}

impl<X> Slot<X> {
    pub(crate) fn empty() -> Self {
        Self {
            record: None,
            enabled: false,
        }
    }
}
