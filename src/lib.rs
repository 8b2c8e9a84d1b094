//! # RingStore
//!
//! A wear-leveling record store for small EEPROM-like regions with:
//! - CRUD over a fixed-capacity in-memory working table
//! - Soft deletes (tombstones) and cursor navigation
//! - Generation ring that spreads saves over every data slot
//! - Header validation and idempotent formatting
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                                │
//! │        (insert / select / update / delete / save / load)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌──────────────┐        ┌───────────────────┐
//!   │ WorkingTable │◀───────│ PersistenceEngine │
//!   │ (slot pool)  │  save/ │  (status ring)    │
//!   └──────────────┘  load  └─────────┬─────────┘
//!                                     │
//!                                     ▼
//!                             ┌─────────────┐
//!                             │   Device    │
//!                             │  (EEPROM)   │
//!                             └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod device;
pub mod record;
pub mod table;
pub mod storage;
pub mod store;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use device::{Device, FileDevice, MemoryDevice};
pub use record::{Envelope, Record};
pub use table::WorkingTable;
pub use storage::{EngineState, PersistenceEngine, RegionInfo, RingLayout};
pub use store::Store;
pub use shared::SharedStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RingStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
