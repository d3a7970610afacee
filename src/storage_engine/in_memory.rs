//! An in-memory [`StorageEngine`] implementation
//!
//! This implementation uses a [`HashMap`] wrapped by a [`Mutex`] and does nothing fancy around performance.
//! Every check-then-act sequence (create, update) runs while holding the lock, so concurrent writers
//! to the same store are serialized.
use bytes::Bytes;
use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::instrument;

use super::StorageEngine;
use crate::error::{Error, Result};

/// Type alias for the underlying datastructure used to store the key/value pairs
type Store = HashMap<Bytes, Bytes>;

/// The InMemory [`StorageEngine`] definition
#[derive(Clone, Debug, Default)]
pub struct InMemory {
    inner: Arc<Mutex<Store>>,
}

impl InMemory {
    /// private function used to acquire a lock over the [`Store`].
    /// A fail to acquire a lock is considered a [`Error::Logic`] since the only reason why
    /// an [`Error`] should be returned is in case of [`Mutex`] poisoning
    fn acquire_lock(&self) -> Result<MutexGuard<Store>> {
        match self.inner.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => Err(Error::Logic {
                reason: "Unable to acquire lock for InMemory storage engine - poisoned..."
                    .to_string(),
            }),
        }
    }
}

impl StorageEngine for InMemory {
    #[instrument(name = "storage_engine::in_memory::get", level = "debug", skip(self))]
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let guard = self.acquire_lock()?;
        Ok(guard.get(key).cloned())
    }

    #[instrument(name = "storage_engine::in_memory::create", level = "debug", skip(self))]
    fn create(&self, key: Bytes, value: Bytes) -> Result<()> {
        let mut guard = self.acquire_lock()?;
        match guard.entry(key) {
            Entry::Occupied(entry) => Err(Error::KeyExists {
                key: entry.key().clone(),
                current: entry.get().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    #[instrument(name = "storage_engine::in_memory::update", level = "debug", skip(self))]
    fn update(&self, key: Bytes, value: Bytes) -> Result<()> {
        let mut guard = self.acquire_lock()?;
        match guard.get_mut(&key) {
            Some(current) => {
                *current = value;
                Ok(())
            }
            None => Err(Error::NotFound { key }),
        }
    }

    fn keys(&self) -> Result<Vec<Bytes>> {
        let guard = self.acquire_lock()?;
        Ok(guard.keys().map(Clone::clone).collect())
    }

    fn len(&self) -> Result<usize> {
        let guard = self.acquire_lock()?;
        Ok(guard.len())
    }
}
