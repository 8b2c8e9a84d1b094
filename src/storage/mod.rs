//! Storage Module
//!
//! Wear-leveling persistence of the working table into a non-volatile region.
//!
//! ## Responsibilities
//! - Format and validate the region header
//! - Locate the freshest generation by scanning the status ring
//! - Append each save as the next generation, one ring position further
//! - Reload the freshest generation into the working table
//!
//! ## Region Format
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │ Header                                                             │
//! │ ┌──────────┬──────────┬─────────────────────┬──────────┬─────────┐ │
//! │ │ 0x42 (1) │ Cap (1)  │ Status Ring (Cap)   │ 0x45 (1) │ Pad (1) │ │
//! │ └──────────┴──────────┴─────────────────────┴──────────┴─────────┘ │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ Data Slots (Cap × slot size)                                       │
//! │ ┌───────────────────────┬─────────────┐                            │
//! │ │ Payload               │ Enabled (1) │  ... repeated Cap times    │
//! │ └───────────────────────┴─────────────┘                            │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each status byte is a generation counter (mod 256). A save bumps the
//! position after the current top, so every position absorbs one write per
//! trip around the ring.

mod engine;
mod layout;

pub use engine::{EngineState, PersistenceEngine, RegionInfo};
pub use layout::RingLayout;

// =============================================================================
// Shared Constants
// =============================================================================

/// First header byte
pub const BEGIN_MARKER: u8 = 0x42;

/// Header byte right after the status ring
pub const END_MARKER: u8 = 0x45;

/// Non-ring header bytes: begin marker, capacity, end marker, spare
pub const HEADER_OVERHEAD: usize = 4;
