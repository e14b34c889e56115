//! Key-value persistence shared by the app and its widget
//!
//! The platform decides where bytes live (shared preferences, an app-group
//! container, a file); this crate only sees the [`KeyValueStore`] trait.
//! Values are encoded with postcard so every consumer reads the same layout.

pub mod defaults;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror_no_std::Error;

pub use defaults::{AppDefaults, LastKnown};

/// Errors raised while reading or writing stored values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to encode value for key {key}")]
    Encode { key: &'static str },
    #[error("Stored value for key {key} is corrupt")]
    Decode { key: &'static str },
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Byte-oriented key-value store
pub trait KeyValueStore {
    /// Bytes stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the bytes stored under `key`
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Forget `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, used by the simulator and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(String::from(key), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Read and decode the value under `key`.
pub(crate) fn load<S, T>(store: &S, key: &'static str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(bytes) => postcard::from_bytes(&bytes)
            .map(Some)
            .map_err(|_| StoreError::Decode { key }),
        None => Ok(None),
    }
}

/// Encode and write `value` under `key`.
pub(crate) fn save<S, T>(store: &mut S, key: &'static str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let bytes = postcard::to_allocvec(value).map_err(|_| StoreError::Encode { key })?;
    store.set(key, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip_and_remove() {
        let mut store = MemoryStore::new();
        store.set("a", &[1, 2, 3]).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(alloc::vec![1, 2, 3]));
        assert_eq!(store.get("b").unwrap(), None);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_bytes_are_reported() {
        let mut store = MemoryStore::new();
        // A bool is a single 0/1 byte in postcard
        store.set("flag", &[7]).unwrap();

        let result: Result<Option<bool>, _> = load(&store, "flag");
        assert_eq!(result, Err(StoreError::Decode { key: "flag" }));
    }
}
