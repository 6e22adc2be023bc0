use std::cmp::Ordering;
use std::collections::HashSet;
use std::mem;

use super::{CollectionError, CollectionEvent, CollectionListener};
use crate::record::Record;

/// An ordered collection of records, unique by id.
///
/// Every mutation is reported to the collection's single listener before the
/// mutating call returns.
pub struct Collection<R, L> {
    members: Vec<R>,
    listener: L,
}

impl<R, L> Collection<R, L>
where
    R: Record,
    L: CollectionListener<R>,
{
    /// Build a collection from initial members. No events are emitted.
    pub fn new(records: Vec<R>, listener: L) -> Result<Self, CollectionError<L::Error>> {
        ensure_unique(&[], &records)?;
        Ok(Self {
            members: records,
            listener,
        })
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The listener together with the current members, for work the listener
    /// does outside of a mutation.
    pub fn listener_parts(&mut self) -> (&mut L, &[R]) {
        (&mut self.listener, &self.members)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.members.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|r| r.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.members.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.members
    }

    /// Member ids in collection order.
    pub fn ids(&self) -> Vec<&str> {
        self.members.iter().map(|r| r.id()).collect()
    }

    /// Append a record.
    pub fn add(&mut self, record: R) -> Result<(), CollectionError<L::Error>> {
        let index = self.members.len();
        self.add_at(index, record)
    }

    /// Insert a record at `index`, shifting later members back.
    pub fn add_at(&mut self, index: usize, record: R) -> Result<(), CollectionError<L::Error>> {
        if index > self.members.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.members.len(),
            });
        }
        if self.contains(record.id()) {
            return Err(CollectionError::DuplicateId(record.id().to_string()));
        }

        self.members.insert(index, record);
        self.listener
            .handle(
                CollectionEvent::Add {
                    record: &self.members[index],
                    index,
                },
                &self.members,
            )
            .map_err(CollectionError::Listener)
    }

    /// Append several records, one `Add` event each. All ids are checked
    /// before anything is added.
    pub fn add_all(&mut self, records: Vec<R>) -> Result<(), CollectionError<L::Error>> {
        ensure_unique(&self.members, &records)?;
        for record in records {
            self.add(record)?;
        }
        Ok(())
    }

    /// Remove the member with `id` and return it.
    pub fn remove(&mut self, id: &str) -> Result<R, CollectionError<L::Error>> {
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::UnknownId(id.to_string()))?;

        let removed = self.members.remove(index);
        self.listener
            .handle(
                CollectionEvent::Remove {
                    record: &removed,
                    index,
                },
                &self.members,
            )
            .map_err(CollectionError::Listener)?;
        Ok(removed)
    }

    /// Mutate the member with `id` in place.
    ///
    /// Emits `Change` only when the record actually differs afterwards and
    /// returns whether it did. Changing the id is rejected and undone.
    pub fn update<F>(&mut self, id: &str, f: F) -> Result<bool, CollectionError<L::Error>>
    where
        F: FnOnce(&mut R),
    {
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::UnknownId(id.to_string()))?;

        let before = self.members[index].clone();
        f(&mut self.members[index]);

        if self.members[index].id() != before.id() {
            let to = self.members[index].id().to_string();
            self.members[index] = before;
            return Err(CollectionError::IdentityChanged {
                from: id.to_string(),
                to,
            });
        }
        if self.members[index] == before {
            return Ok(false);
        }

        self.listener
            .handle(
                CollectionEvent::Change {
                    record: &self.members[index],
                },
                &self.members,
            )
            .map_err(CollectionError::Listener)?;
        Ok(true)
    }

    /// Replace the member with the same id, or append `record` if it is new.
    pub fn upsert(&mut self, record: R) -> Result<(), CollectionError<L::Error>> {
        if self.contains(record.id()) {
            let id = record.id().to_string();
            self.update(&id, |member| *member = record)?;
            Ok(())
        } else {
            self.add(record)
        }
    }

    /// Move the member with `id` to position `index`.
    pub fn move_to(&mut self, id: &str, index: usize) -> Result<(), CollectionError<L::Error>> {
        let from = self
            .position(id)
            .ok_or_else(|| CollectionError::UnknownId(id.to_string()))?;
        if index >= self.members.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.members.len(),
            });
        }
        if from == index {
            return Ok(());
        }

        let record = self.members.remove(from);
        self.members.insert(index, record);
        self.emit_sort()
    }

    /// Stable sort by `compare`. Always emits `Sort`.
    pub fn sort_by<F>(&mut self, compare: F) -> Result<(), CollectionError<L::Error>>
    where
        F: FnMut(&R, &R) -> Ordering,
    {
        self.members.sort_by(compare);
        self.emit_sort()
    }

    /// Stable sort by a key. Always emits `Sort`.
    pub fn sort_by_key<K, F>(&mut self, f: F) -> Result<(), CollectionError<L::Error>>
    where
        F: FnMut(&R) -> K,
        K: Ord,
    {
        self.members.sort_by_key(f);
        self.emit_sort()
    }

    /// Replace the whole membership and return the previous members.
    pub fn reset(&mut self, records: Vec<R>) -> Result<Vec<R>, CollectionError<L::Error>> {
        ensure_unique(&[], &records)?;

        let previous = mem::replace(&mut self.members, records);
        self.listener
            .handle(
                CollectionEvent::Reset {
                    previous: &previous,
                },
                &self.members,
            )
            .map_err(CollectionError::Listener)?;
        Ok(previous)
    }

    /// Remove every member, as a reset to nothing.
    pub fn clear(&mut self) -> Result<Vec<R>, CollectionError<L::Error>> {
        self.reset(Vec::new())
    }

    fn emit_sort(&mut self) -> Result<(), CollectionError<L::Error>> {
        self.listener
            .handle(CollectionEvent::Sort, &self.members)
            .map_err(CollectionError::Listener)
    }
}

impl<'a, R, L> IntoIterator for &'a Collection<R, L> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

fn ensure_unique<R: Record, E>(existing: &[R], incoming: &[R]) -> Result<(), CollectionError<E>> {
    let mut seen: HashSet<&str> = existing.iter().map(|r| r.id()).collect();
    for record in incoming {
        if !seen.insert(record.id()) {
            return Err(CollectionError::DuplicateId(record.id().to_string()));
        }
    }
    Ok(())
}
