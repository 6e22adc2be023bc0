//! Key-value stores - the string-keyed storage a persistive collection writes to.
//!
//! The interface mirrors browser local storage: `get`, `set`, `remove`, no
//! transactions and no multi-key atomicity.
//!
//! ## Example
//!
//! ```ignore
//! use persistive_rust::{InMemoryStore, KeyValueStore};
//!
//! let store = InMemoryStore::new();
//! store.set("todos", "a,b")?;
//! assert_eq!(store.get("todos")?.as_deref(), Some("a,b"));
//! ```

mod file;
mod in_memory;
mod journal;

use std::fmt;
use std::sync::Arc;

/// Error type for key-value store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LockPoisoned(&'static str),
    /// The backing medium failed (disk full, permission denied, ...).
    Io(String),
    /// The backing medium holds data the store cannot read.
    Serde(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Io(msg) => write!(f, "store I/O error: {}", msg),
            StoreError::Serde(msg) => write!(f, "store serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// String-keyed storage with overwrite semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns None if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing whatever was there.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

pub use file::JsonFileStore;
pub use in_memory::InMemoryStore;
pub use journal::{JournalStore, StoreOp};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_handles_see_the_same_entries() {
        let store = InMemoryStore::new();
        {
            let borrowed: &InMemoryStore = &store;
            KeyValueStore::set(&borrowed, "a", "1").unwrap();
        }

        let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
        shared.set("b", "2").unwrap();

        assert_eq!(KeyValueStore::get(&shared, "a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
