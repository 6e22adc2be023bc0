//! PersistiveCollection - a collection that keeps a key-value store in step
//! with itself.
//!
//! ## Example
//!
//! ```ignore
//! use persistive_rust::{CollectionOptions, InMemoryStore, PersistiveCollection, Record};
//!
//! #[derive(Clone, PartialEq, Serialize, Deserialize, Record)]
//! struct Todo {
//!     id: String,
//!     title: String,
//! }
//!
//! let store = InMemoryStore::new();
//! let mut todos = PersistiveCollection::<Todo, _>::open(
//!     store.clone(),
//!     CollectionOptions::new().namespace("todos"),
//! )?;
//!
//! todos.add(Todo { id: "1".into(), title: "Buy milk".into() })?;
//! // store now holds "todos" => "1" and "todos-1" => {"id":"1","title":"Buy milk"}
//! ```

use std::cmp::Ordering;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

use crate::collection::Collection;
use crate::error::Error;
use crate::namespace::Namespace;
use crate::record::Record;
use crate::rehydrate::{MissingRecordPolicy, Rehydrator};
use crate::router::EventRouter;
use crate::store::KeyValueStore;
use crate::sync::SyncExecutor;

/// Construction options for a [`PersistiveCollection`].
pub struct CollectionOptions<R> {
    namespace: Option<String>,
    records: Option<Vec<R>>,
    missing_records: MissingRecordPolicy,
    #[cfg(feature = "emitter")]
    emitter: Option<EventEmitter>,
}

impl<R> Default for CollectionOptions<R> {
    fn default() -> Self {
        Self {
            namespace: None,
            records: None,
            missing_records: MissingRecordPolicy::default(),
            #[cfg(feature = "emitter")]
            emitter: None,
        }
    }
}

impl<R> CollectionOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace for every key of the collection. Overrides `Record::STORE_ID`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Start from these records instead of rehydrating from the store.
    pub fn records(mut self, records: Vec<R>) -> Self {
        self.records = Some(records);
        self
    }

    /// How rehydration treats indexed records that can't be read.
    pub fn missing_records(mut self, policy: MissingRecordPolicy) -> Self {
        self.missing_records = policy;
        self
    }

    /// Publish store notifications (see `router::notifications`).
    #[cfg(feature = "emitter")]
    pub fn emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }
}

/// An ordered record collection persisted incrementally into `S`.
///
/// Every mutation is written through before it returns. When a store write
/// fails the error is returned, but the in-memory change stays applied.
pub struct PersistiveCollection<R, S> {
    inner: Collection<R, EventRouter<S>>,
}

impl<R, S> PersistiveCollection<R, S>
where
    R: Record,
    S: KeyValueStore,
{
    /// Open a collection.
    ///
    /// Without initial records the members are rehydrated from the store and
    /// nothing is written. With initial records the store is brought in line
    /// with them: departed records pruned, every record written, index
    /// rewritten.
    pub fn open(store: S, options: CollectionOptions<R>) -> Result<Self, Error> {
        let namespace = match options.namespace.as_deref().or(R::STORE_ID) {
            Some(namespace) => Namespace::new(namespace)?,
            None => return Err(Error::Config("`store_id` must be defined".into())),
        };

        let (records, supplied) = match options.records {
            Some(records) => (records, true),
            None => (
                Rehydrator::new(&store, &namespace).load(options.missing_records)?,
                false,
            ),
        };

        let router = EventRouter::new(SyncExecutor::new(store, namespace), &records);
        #[cfg(feature = "emitter")]
        let router = match options.emitter {
            Some(emitter) => router.with_emitter(emitter),
            None => router,
        };

        let mut inner = Collection::new(records, router)?;
        if supplied {
            let (router, members) = inner.listener_parts();
            router.resync(members)?;
        }

        tracing::debug!(
            namespace = %inner.listener().executor().namespace(),
            members = inner.len(),
            rehydrated = !supplied,
            "opened persistive collection"
        );

        Ok(Self { inner })
    }

    /// Open a collection rehydrated from `namespace`.
    pub fn new(store: S, namespace: impl Into<String>) -> Result<Self, Error> {
        Self::open(store, CollectionOptions::new().namespace(namespace))
    }

    pub fn namespace(&self) -> &Namespace {
        self.inner.listener().executor().namespace()
    }

    pub fn store(&self) -> &S {
        self.inner.listener().executor().store()
    }

    /// Whether changes to member `id` are currently persisted.
    pub fn is_observing(&self, id: &str) -> bool {
        self.inner.listener().is_observing(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.inner.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.inner.position(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.inner.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        self.inner.as_slice()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.inner.ids()
    }

    pub fn add(&mut self, record: R) -> Result<(), Error> {
        self.inner.add(record).map_err(Error::from)
    }

    pub fn add_at(&mut self, index: usize, record: R) -> Result<(), Error> {
        self.inner.add_at(index, record).map_err(Error::from)
    }

    pub fn add_all(&mut self, records: Vec<R>) -> Result<(), Error> {
        self.inner.add_all(records).map_err(Error::from)
    }

    pub fn remove(&mut self, id: &str) -> Result<R, Error> {
        self.inner.remove(id).map_err(Error::from)
    }

    /// Mutate member `id`; persisted only if it actually changed.
    pub fn update<F>(&mut self, id: &str, f: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut R),
    {
        self.inner.update(id, f).map_err(Error::from)
    }

    pub fn upsert(&mut self, record: R) -> Result<(), Error> {
        self.inner.upsert(record).map_err(Error::from)
    }

    pub fn move_to(&mut self, id: &str, index: usize) -> Result<(), Error> {
        self.inner.move_to(id, index).map_err(Error::from)
    }

    pub fn sort_by<F>(&mut self, compare: F) -> Result<(), Error>
    where
        F: FnMut(&R, &R) -> Ordering,
    {
        self.inner.sort_by(compare).map_err(Error::from)
    }

    pub fn sort_by_key<K, F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnMut(&R) -> K,
        K: Ord,
    {
        self.inner.sort_by_key(f).map_err(Error::from)
    }

    pub fn reset(&mut self, records: Vec<R>) -> Result<Vec<R>, Error> {
        self.inner.reset(records).map_err(Error::from)
    }

    pub fn clear(&mut self) -> Result<Vec<R>, Error> {
        self.inner.clear().map_err(Error::from)
    }

    /// Rewrite every member and the index, pruning records the stored index
    /// lists but the collection no longer holds.
    pub fn resync(&mut self) -> Result<(), Error> {
        let (router, members) = self.inner.listener_parts();
        router.resync(members)
    }
}

impl<'a, R, S> IntoIterator for &'a PersistiveCollection<R, S> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        (&self.inner).into_iter()
    }
}
