//! Record envelope
//!
//! The unit persisted per data slot: a fixed-size payload followed by the
//! enabled (tombstone) flag.
//!
//! ## Slot Format
//! ```text
//! ┌──────────────────────────────────────┬─────────────┐
//! │ Payload (ENCODED_SIZE, zero padded)  │ Enabled (1) │
//! └──────────────────────────────────────┴─────────────┘
//! ```

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// A payload type that can live in a data slot.
///
/// Slot addressing depends on a constant slot size, so every record type
/// declares the upper bound of its bincode encoding. Fixed-size types
/// (integers, arrays, structs of those) encode to the same length every time.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Bytes reserved for the encoded payload
    const ENCODED_SIZE: usize;

    /// Bytes one envelope occupies on the device
    fn slot_size() -> usize {
        Self::ENCODED_SIZE + 1
    }
}

macro_rules! impl_record_for_int {
    ($($ty:ty),*) => {
        $(
            impl Record for $ty {
                const ENCODED_SIZE: usize = std::mem::size_of::<$ty>();
            }
        )*
    };
}

impl_record_for_int!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Payload paired with its enabled flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<X> {
    pub payload: X,
    pub enabled: bool,
}

impl<X: Record> Envelope<X> {
    pub fn new(payload: X, enabled: bool) -> Self {
        Self { payload, enabled }
    }

    /// Encode into exactly `X::slot_size()` bytes
    pub fn encode(&self) -> Result<BytesMut> {
        let payload = bincode::serialize(&self.payload)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if payload.len() > X::ENCODED_SIZE {
            return Err(StoreError::Serialization(format!(
                "payload encodes to {} bytes, slot holds {}",
                payload.len(),
                X::ENCODED_SIZE
            )));
        }

        let mut buf = BytesMut::with_capacity(X::slot_size());
        buf.put_slice(&payload);
        buf.put_bytes(0, X::ENCODED_SIZE - payload.len());
        buf.put_u8(self.enabled as u8);
        Ok(buf)
    }

    /// Decode from one slot's bytes. Any non-zero flag byte counts as enabled.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < X::slot_size() {
            return Err(StoreError::Serialization(format!(
                "envelope needs {} bytes, got {}",
                X::slot_size(),
                bytes.len()
            )));
        }

        let payload: X = bincode::deserialize(&bytes[..X::ENCODED_SIZE])
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(Self {
            payload,
            enabled: bytes[X::ENCODED_SIZE] != 0,
        })
    }
}
