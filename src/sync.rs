//! SyncExecutor - the store-facing half of a persistive collection.
//!
//! Every operation here is a single idempotent store call (or a read followed
//! by deletes, for `prune_orphans`). Failures are returned immediately;
//! nothing is retried or compensated.

use std::collections::HashSet;

use crate::codec;
use crate::error::Error;
use crate::namespace::{IndexEntry, Namespace, INDEX_DELIMITER};
use crate::record::Record;
use crate::store::KeyValueStore;

pub struct SyncExecutor<S> {
    store: S,
    namespace: Namespace,
}

impl<S: KeyValueStore> SyncExecutor<S> {
    pub fn new(store: S, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Serialize `record` and write it at its record key, unconditionally.
    pub fn write_record<R: Record>(&self, record: &R) -> Result<(), Error> {
        let value = codec::encode(record)?;
        self.set_record(record.id(), &value)
    }

    /// Write `record` only if the stored value differs from its current
    /// encoding. Returns whether a write happened.
    pub fn sync_record<R: Record>(&self, record: &R) -> Result<bool, Error> {
        let value = codec::encode(record)?;
        let key = self.namespace.record_key(record.id());
        if self.store.get(&key)?.as_deref() == Some(value.as_str()) {
            tracing::trace!(key = %key, "record already current");
            return Ok(false);
        }
        self.set_record(record.id(), &value)?;
        Ok(true)
    }

    /// Remove the record key for `id`. Absent keys are not an error.
    pub fn delete_record(&self, id: &str) -> Result<(), Error> {
        let key = self.namespace.record_key(id);
        tracing::debug!(key = %key, "deleting record");
        self.store.remove(&key)?;
        Ok(())
    }

    /// Overwrite the index entry with `ids`, in order.
    pub fn rebuild_index<'a, I>(&self, ids: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let index = IndexEntry::new(ids);
        let value = index.encode();
        tracing::debug!(
            key = %self.namespace.index_key(),
            members = index.ids().len(),
            "writing index"
        );
        self.store.set(self.namespace.index_key(), &value)?;
        Ok(())
    }

    /// Delete the record of every id in the stored index that is not in
    /// `current_ids`. Returns the deleted ids.
    pub fn prune_orphans(&self, current_ids: &HashSet<&str>) -> Result<Vec<String>, Error> {
        let stored = self.read_index()?;
        let mut pruned = Vec::new();
        for id in stored.into_ids() {
            if current_ids.contains(id.as_str()) || pruned.contains(&id) {
                continue;
            }
            self.delete_record(&id)?;
            pruned.push(id);
        }
        Ok(pruned)
    }

    /// Read and parse the stored index entry.
    pub fn read_index(&self) -> Result<IndexEntry, Error> {
        let raw = self.store.get(self.namespace.index_key())?;
        Ok(IndexEntry::parse(raw.as_deref()))
    }

    /// Read and decode the stored record for `id`.
    pub fn read_record<R: Record>(&self, id: &str) -> Result<Option<R>, Error> {
        let raw = self.store.get(&self.namespace.record_key(id))?;
        Ok(codec::decode(raw.as_deref())?)
    }

    fn set_record(&self, id: &str, value: &str) -> Result<(), Error> {
        if id.contains(INDEX_DELIMITER) {
            tracing::warn!(
                namespace = %self.namespace,
                id = %id,
                "record id contains the index delimiter; the index entry will not round-trip"
            );
        }
        let key = self.namespace.record_key(id);
        tracing::debug!(key = %key, bytes = value.len(), "writing record");
        self.store.set(&key, value)?;
        Ok(())
    }
}
