#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use persistive_rust::{InMemoryStore, KeyValueStore, Record, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record)]
#[record(store_id = "todos")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub done: bool,
}

impl Todo {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            done: false,
        }
    }

    pub fn stored(&self) -> String {
        persistive_rust::encode(self).unwrap()
    }
}

/// A record type with no default namespace and a non-`id` key field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record)]
pub struct Contact {
    #[record(id)]
    pub email: String,
    pub name: String,
}

/// An in-memory store whose writes can be switched off to simulate a full or
/// unavailable backend.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    failing: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io("quota exceeded".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove(key)
    }
}
