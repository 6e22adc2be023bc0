//! JournalStore - a store wrapper that records every operation it forwards.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{KeyValueStore, StoreError};

/// One operation observed by a [`JournalStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get(String),
    Set(String, String),
    Remove(String),
}

impl StoreOp {
    pub fn key(&self) -> &str {
        match self {
            StoreOp::Get(key) | StoreOp::Set(key, _) | StoreOp::Remove(key) => key,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, StoreOp::Get(_))
    }
}

/// A store wrapper that records every operation into a shared buffer before
/// forwarding it to the inner store.
///
/// Used to assert which writes a mutation caused, and in which order. The
/// buffer is append-only, so a poisoned lock still holds a consistent journal
/// and is read through rather than reported.
#[derive(Clone)]
pub struct JournalStore<S> {
    inner: S,
    buffer: Arc<Mutex<Vec<StoreOp>>>,
}

impl<S: KeyValueStore> JournalStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_buffer(inner, Arc::new(Mutex::new(Vec::new())))
    }

    pub fn with_buffer(inner: S, buffer: Arc<Mutex<Vec<StoreOp>>>) -> Self {
        JournalStore { inner, buffer }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Every recorded operation, oldest first.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.journal().clone()
    }

    /// Recorded sets and removes, oldest first.
    pub fn writes(&self) -> Vec<StoreOp> {
        self.ops().into_iter().filter(StoreOp::is_write).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.journal().clear();
    }

    fn journal(&self) -> MutexGuard<'_, Vec<StoreOp>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: KeyValueStore> KeyValueStore for JournalStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.journal().push(StoreOp::Get(key.to_string()));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.journal().push(StoreOp::Set(key.to_string(), value.to_string()));
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.journal().push(StoreOp::Remove(key.to_string()));
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn records_operations_in_order() {
        let store = JournalStore::new(InMemoryStore::new());

        store.set("a", "1").unwrap();
        store.get("a").unwrap();
        store.remove("a").unwrap();

        assert_eq!(
            store.ops(),
            vec![
                StoreOp::Set("a".into(), "1".into()),
                StoreOp::Get("a".into()),
                StoreOp::Remove("a".into()),
            ]
        );
        assert_eq!(store.writes().len(), 2);
        assert!(store.inner().is_empty().unwrap());
    }

    #[test]
    fn poisoned_buffer_keeps_recording() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let store = JournalStore::with_buffer(InMemoryStore::new(), buffer.clone());
        store.set("a", "1").unwrap();

        let _ = std::thread::spawn(move || {
            let _guard = buffer.lock().unwrap();
            panic!("reader died holding the journal");
        })
        .join();

        store.set("b", "2").unwrap();
        assert_eq!(store.writes().len(), 2);

        store.clear();
        assert!(store.ops().is_empty());
    }

    #[test]
    fn shared_buffer_and_clear() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let store = JournalStore::with_buffer(InMemoryStore::new(), buffer.clone());

        store.set("k", "v").unwrap();
        assert_eq!(buffer.lock().unwrap().len(), 1);

        store.clear();
        assert!(store.ops().is_empty());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
