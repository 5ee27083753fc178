//! Key-value storage seam.
//!
//! The services in this crate never talk to a concrete storage backend;
//! they go through [`KeyValueStore`], and the host decides what backs it.
//! Values are raw strings keyed by the constants below, which is all the
//! session flag needs. [`MemoryStore`] is the in-process implementation
//! used by the demos and tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Storage key under which the session token lives.
pub const SESSION_TOKEN_KEY: &str = "demo-token";

/// Raw string key-value storage.
///
/// Implementations must tolerate absent keys; `get` on a missing key is
/// `None`, `remove` on a missing key is a no-op.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Deletes the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-process [`KeyValueStore`]. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
