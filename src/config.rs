//! Configuration for RingStore
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, StoreError};

/// Largest ring the one-byte capacity header can describe
pub const MAX_RING_CAPACITY: usize = 255;

/// Main configuration for a RingStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Non-volatile Region
    // -------------------------------------------------------------------------
    /// First device address of the region (begin marker lives here)
    pub region_start: usize,

    /// Number of ring positions / data slots (1..=255)
    pub ring_capacity: usize,

    // -------------------------------------------------------------------------
    // Working Table
    // -------------------------------------------------------------------------
    /// Number of slots in the in-memory table
    pub table_capacity: usize,

    /// Load the freshest generation right after opening
    pub load_on_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region_start: 0,
            ring_capacity: 8,
            table_capacity: 8,
            load_on_open: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check capacities before anything touches the device
    pub fn validate(&self) -> Result<()> {
        if self.ring_capacity == 0 || self.ring_capacity > MAX_RING_CAPACITY {
            return Err(StoreError::Config(format!(
                "ring capacity {} outside 1..={}",
                self.ring_capacity, MAX_RING_CAPACITY
            )));
        }
        if self.table_capacity == 0 {
            return Err(StoreError::Config(
                "table capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    table_capacity_set: bool,
}

impl ConfigBuilder {
    /// Set the first device address of the region
    pub fn region_start(mut self, start: usize) -> Self {
        self.config.region_start = start;
        self
    }

    /// Set the ring capacity (number of data slots on the device)
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.config.ring_capacity = capacity;
        self
    }

    /// Set the working table capacity (defaults to the ring capacity)
    pub fn table_capacity(mut self, capacity: usize) -> Self {
        self.config.table_capacity = capacity;
        self.table_capacity_set = true;
        self
    }

    /// Whether `Store::open` loads persisted records
    pub fn load_on_open(mut self, load: bool) -> Self {
        self.config.load_on_open = load;
        self
    }

    pub fn build(mut self) -> Config {
        if !self.table_capacity_set {
            self.config.table_capacity = self.config.ring_capacity;
        }
        self.config
    }
}
