//! This trait represents the interface for the key/value store each [`crate::Node`] carries.
//! Keys and values are opaque bytes and are not interpreted in any way by StorageEngine implementations.
//!
//! Unlike a blind `put`, creating and updating a key are distinct operations:
//! a caller that tries to create an existing key gets [`crate::error::Error::KeyExists`] back
//! and decides by itself whether it wants to update it instead.
use bytes::Bytes;
use std::fmt::Debug;

use crate::error::Result;

pub mod in_memory;

pub trait StorageEngine: Debug {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;
    /// stores a new key. Fails with [`crate::error::Error::KeyExists`] if the key is already present
    fn create(&self, key: Bytes, value: Bytes) -> Result<()>;
    /// overrides an existing key. Fails with [`crate::error::Error::NotFound`] if the key is absent
    fn update(&self, key: Bytes, value: Bytes) -> Result<()>;
    fn keys(&self) -> Result<Vec<Bytes>>;
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
