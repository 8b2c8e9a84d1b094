//! Error types for RingStore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for RingStore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Capacity / Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("No record selected")]
    NoCursor,

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage corruption detected: {0}")]
    Corrupt(String),

    #[error("Address out of range: {0}")]
    OutOfRange(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
