//! Store Module
//!
//! Public CRUD + persistence surface composing the working table and the
//! persistence engine.
//!
//! ## Responsibilities
//! - Route record operations to the working table
//! - Route save/load to the persistence engine with the table borrowed
//! - One-call setup from a `Config`

use crate::config::Config;
use crate::device::Device;
use crate::error::Result;
use crate::record::Record;
use crate::storage::{EngineState, PersistenceEngine, RegionInfo};
use crate::table::{Iter, WorkingTable};

/// Record table with wear-leveled persistence
///
/// ## Access Model
/// Single owner, fully synchronous. Calls must not interleave (e.g. from an
/// interrupt handler during a save); wrap the store in a
/// [`SharedStore`](crate::SharedStore) when several threads need it.
pub struct Store<X, D> {
    /// In-memory record set
    table: WorkingTable<X>,

    /// Non-volatile region manager
    engine: PersistenceEngine<X, D>,
}

impl<X: Record, D: Device> Store<X, D> {
    /// Create a store with neither table nor region initialized
    pub fn new(device: D) -> Self {
        Self {
            table: WorkingTable::new(),
            engine: PersistenceEngine::new(device),
        }
    }

    /// Initialize table and region from `config`
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Allocate the working table
    /// 3. Validate (or format) the region
    /// 4. Load the freshest generation, if `load_on_open`
    pub fn open(config: Config, device: D) -> Result<Self> {
        config.validate()?;

        let mut store = Self::new(device);
        store.init_buffer(config.table_capacity)?;
        store.init_storage(config.region_start, config.ring_capacity)?;

        if config.load_on_open {
            store.load_storage()?;
            tracing::info!(records = store.counter(), "opened store");
        }

        Ok(store)
    }

    // =========================================================================
    // Working Table
    // =========================================================================

    pub fn init_buffer(&mut self, capacity: usize) -> Result<()> {
        self.table.init(capacity)
    }

    pub fn insert(&mut self, record: X) -> Result<usize> {
        self.table.insert(record)
    }

    pub fn select(&self) -> Option<&X> {
        self.table.select()
    }

    pub fn update(&mut self, record: X) -> Result<()> {
        self.table.update(record)
    }

    pub fn delete(&mut self) -> Result<()> {
        self.table.delete()
    }

    pub fn clean(&mut self) {
        self.table.clean()
    }

    pub fn counter(&self) -> usize {
        self.table.counter()
    }

    pub fn top(&mut self) -> bool {
        self.table.top()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.table.next()
    }

    /// Enabled records in pool order
    pub fn records(&self) -> Iter<'_, X> {
        self.table.iter()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn init_storage(&mut self, start: usize, capacity: usize) -> Result<()> {
        self.engine.init(start, capacity)
    }

    pub fn check_storage(&mut self) -> Result<()> {
        self.engine.check()
    }

    pub fn save_storage(&mut self) -> Result<()> {
        self.engine.save(&self.table)
    }

    pub fn load_storage(&mut self) -> Result<()> {
        self.engine.load(&mut self.table)
    }

    pub fn top_address(&self) -> Option<usize> {
        self.engine.top_address()
    }

    pub fn next_free_address(&self) -> Option<usize> {
        self.engine.next_free_address()
    }

    // =========================================================================
    // Accessors (for tooling and tests)
    // =========================================================================

    pub fn storage_state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn region_checksum(&mut self) -> Result<u32> {
        self.engine.checksum()
    }

    pub fn inspect(&mut self) -> Result<RegionInfo> {
        self.engine.inspect()
    }

    pub fn table(&self) -> &WorkingTable<X> {
        &self.table
    }

    pub fn device(&self) -> &D {
        self.engine.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.engine.device_mut()
    }

    pub fn into_device(self) -> D {
        self.engine.into_device()
    }
}
