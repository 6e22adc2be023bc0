//! Rehydrator - loads a collection's initial members from the store.
//!
//! Reads the index entry, then each referenced record key. This is a pure
//! read path: nothing is written, including when the index references records
//! that are missing or unreadable.

use std::collections::HashSet;

use crate::codec;
use crate::error::Error;
use crate::namespace::{IndexEntry, Namespace};
use crate::record::Record;
use crate::store::KeyValueStore;

/// What to do with an indexed id whose record is missing or unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingRecordPolicy {
    /// Leave the record out and keep loading.
    #[default]
    Skip,
    /// Abort with [`Error::MissingRecord`].
    Fail,
}

pub struct Rehydrator<'a, S> {
    store: &'a S,
    namespace: &'a Namespace,
}

impl<'a, S: KeyValueStore> Rehydrator<'a, S> {
    pub fn new(store: &'a S, namespace: &'a Namespace) -> Self {
        Self { store, namespace }
    }

    /// Every indexed position, in index order. A record that is missing,
    /// fails to decode, or carries a different id than the one indexed is
    /// `None`.
    pub fn load_initial<R: Record>(&self) -> Result<Vec<Option<R>>, Error> {
        Ok(self
            .load_entries()?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Load members ready for a collection, applying `policy` to holes.
    /// Repeated ids in the index keep their first position.
    pub fn load<R: Record>(&self, policy: MissingRecordPolicy) -> Result<Vec<R>, Error> {
        let entries = self.load_entries::<R>()?;
        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(entries.len());

        for (id, record) in entries {
            match record {
                Some(record) => {
                    if seen.insert(id) {
                        members.push(record);
                    } else {
                        tracing::warn!(
                            namespace = %self.namespace,
                            id = %record.id(),
                            "index lists record more than once"
                        );
                    }
                }
                None => match policy {
                    MissingRecordPolicy::Skip => {
                        tracing::warn!(
                            namespace = %self.namespace,
                            id = %id,
                            "skipping indexed record missing from store"
                        );
                    }
                    MissingRecordPolicy::Fail => return Err(Error::MissingRecord { id }),
                },
            }
        }

        tracing::debug!(
            namespace = %self.namespace,
            members = members.len(),
            "rehydrated collection"
        );
        Ok(members)
    }

    fn load_entries<R: Record>(&self) -> Result<Vec<(String, Option<R>)>, Error> {
        let raw = self.store.get(self.namespace.index_key())?;
        let index = IndexEntry::parse(raw.as_deref());

        let mut entries = Vec::with_capacity(index.ids().len());
        for id in index.into_ids() {
            let record = self.read(&id)?;
            entries.push((id, record));
        }
        Ok(entries)
    }

    fn read<R: Record>(&self, id: &str) -> Result<Option<R>, Error> {
        let key = self.namespace.record_key(id);
        let raw = self.store.get(&key)?;

        let record = match codec::decode::<R>(raw.as_deref()) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "stored record failed to decode");
                None
            }
        };

        Ok(record.filter(|record| {
            let matches = record.id() == id;
            if !matches {
                tracing::warn!(key = %key, found = %record.id(), "stored record has a different id");
            }
            matches
        }))
    }
}
