//! Shared store
//!
//! A store is single-owner by design. `SharedStore` serializes access from
//! several threads behind one `parking_lot::Mutex`, so a save can never
//! interleave with a mutation.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::device::Device;
use crate::error::Result;
use crate::record::Record;
use crate::store::Store;

/// Cloneable handle to a mutex-guarded store
pub struct SharedStore<X, D> {
    inner: Arc<Mutex<Store<X, D>>>,
}

impl<X, D> Clone for SharedStore<X, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<X: Record, D: Device> SharedStore<X, D> {
    pub fn new(store: Store<X, D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Exclusive access for a sequence of operations (e.g. top/next walks)
    pub fn lock(&self) -> MutexGuard<'_, Store<X, D>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut Store<X, D>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn insert(&self, record: X) -> Result<usize> {
        self.inner.lock().insert(record)
    }

    pub fn counter(&self) -> usize {
        self.inner.lock().counter()
    }

    pub fn save(&self) -> Result<()> {
        self.inner.lock().save_storage()
    }

    pub fn load(&self) -> Result<()> {
        self.inner.lock().load_storage()
    }
}
