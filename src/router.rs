//! EventRouter - turns collection lifecycle events into store operations.
//!
//! | event    | store operations                                           |
//! |----------|------------------------------------------------------------|
//! | `Add`    | write record, then index                                   |
//! | `Remove` | delete record, then index                                  |
//! | `Sort`   | index                                                      |
//! | `Reset`  | prune departed records, write stale members, then index    |
//! | `Change` | write record                                               |
//!
//! Record operations always run before the index rewrite, so an interrupted
//! reaction can leave an unindexed record but never an indexed id without a
//! record.

use std::collections::HashSet;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

use crate::collection::{CollectionEvent, CollectionListener};
use crate::error::Error;
use crate::record::Record;
use crate::store::KeyValueStore;
use crate::sync::SyncExecutor;

/// Notification names published when an emitter is attached. The payload is
/// the store key that was touched.
#[cfg(feature = "emitter")]
pub mod notifications {
    pub const RECORD_WRITTEN: &str = "record_written";
    pub const RECORD_DELETED: &str = "record_deleted";
    pub const INDEX_WRITTEN: &str = "index_written";
}

/// The single listener of a persistive collection.
///
/// Tracks the ids it currently observes for field changes; a member is
/// observed exactly once per membership episode. Observation follows
/// membership even when the store write that goes with it fails.
pub struct EventRouter<S> {
    executor: SyncExecutor<S>,
    observed: HashSet<String>,
    #[cfg(feature = "emitter")]
    emitter: Option<EventEmitter>,
}

impl<S: KeyValueStore> EventRouter<S> {
    /// Create a router already observing `members`.
    pub fn new<R: Record>(executor: SyncExecutor<S>, members: &[R]) -> Self {
        let mut router = Self {
            executor,
            observed: HashSet::with_capacity(members.len()),
            #[cfg(feature = "emitter")]
            emitter: None,
        };
        for record in members {
            router.observe(record.id());
        }
        router
    }

    /// Publish store notifications to `emitter`.
    #[cfg(feature = "emitter")]
    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn executor(&self) -> &SyncExecutor<S> {
        &self.executor
    }

    pub fn is_observing(&self, id: &str) -> bool {
        self.observed.contains(id)
    }

    pub fn observed_len(&self) -> usize {
        self.observed.len()
    }

    /// Full resync: prune departed records, write every member, rewrite the
    /// index. Used when memory and store are not known to agree.
    pub fn resync<R: Record>(&mut self, members: &[R]) -> Result<(), Error> {
        let current: HashSet<&str> = members.iter().map(|r| r.id()).collect();
        for id in self.executor.prune_orphans(&current)? {
            self.notify_deleted(&id);
        }
        for record in members {
            self.executor.write_record(record)?;
            self.notify_written(record.id());
        }
        self.write_index(members)
    }

    fn on_add<R: Record>(&mut self, record: &R, members: &[R]) -> Result<(), Error> {
        self.observe(record.id());
        self.executor.write_record(record)?;
        self.notify_written(record.id());
        self.write_index(members)
    }

    fn on_remove<R: Record>(&mut self, record: &R, members: &[R]) -> Result<(), Error> {
        self.unobserve(record.id());
        self.executor.delete_record(record.id())?;
        self.notify_deleted(record.id());
        self.write_index(members)
    }

    fn on_reset<R: Record>(&mut self, previous: &[R], members: &[R]) -> Result<(), Error> {
        let current: HashSet<&str> = members.iter().map(|r| r.id()).collect();

        let pruned = self.executor.prune_orphans(&current)?;
        for id in &pruned {
            self.notify_deleted(id);
        }
        // Departed members the stored index didn't know about.
        for record in previous {
            let id = record.id();
            if !current.contains(id) && !pruned.iter().any(|p| p == id) {
                self.executor.delete_record(id)?;
                self.notify_deleted(id);
            }
        }

        let departed: Vec<String> = self
            .observed
            .iter()
            .filter(|id| !current.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &departed {
            self.unobserve(id);
        }

        for record in members {
            if self.executor.sync_record(record)? {
                self.notify_written(record.id());
            }
            if !self.is_observing(record.id()) {
                self.observe(record.id());
            }
        }

        self.write_index(members)
    }

    fn on_change<R: Record>(&mut self, record: &R) -> Result<(), Error> {
        if !self.is_observing(record.id()) {
            tracing::warn!(
                namespace = %self.executor.namespace(),
                id = %record.id(),
                "change from unobserved record ignored"
            );
            return Ok(());
        }
        self.executor.write_record(record)?;
        self.notify_written(record.id());
        Ok(())
    }

    fn write_index<R: Record>(&mut self, members: &[R]) -> Result<(), Error> {
        self.executor.rebuild_index(members.iter().map(|r| r.id()))?;
        self.notify_indexed();
        Ok(())
    }

    fn observe(&mut self, id: &str) {
        if !self.observed.insert(id.to_string()) {
            tracing::warn!(
                namespace = %self.executor.namespace(),
                id = %id,
                "record already observed"
            );
        }
    }

    fn unobserve(&mut self, id: &str) {
        if !self.observed.remove(id) {
            tracing::warn!(
                namespace = %self.executor.namespace(),
                id = %id,
                "record was not observed"
            );
        }
    }

    #[cfg(feature = "emitter")]
    fn notify_written(&mut self, id: &str) {
        if let Some(emitter) = self.emitter.as_mut() {
            let key = self.executor.namespace().record_key(id);
            emitter.emit(notifications::RECORD_WRITTEN, key);
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn notify_written(&mut self, _id: &str) {}

    #[cfg(feature = "emitter")]
    fn notify_deleted(&mut self, id: &str) {
        if let Some(emitter) = self.emitter.as_mut() {
            let key = self.executor.namespace().record_key(id);
            emitter.emit(notifications::RECORD_DELETED, key);
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn notify_deleted(&mut self, _id: &str) {}

    #[cfg(feature = "emitter")]
    fn notify_indexed(&mut self) {
        if let Some(emitter) = self.emitter.as_mut() {
            let key = self.executor.namespace().index_key().to_string();
            emitter.emit(notifications::INDEX_WRITTEN, key);
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn notify_indexed(&mut self) {}
}

impl<R: Record, S: KeyValueStore> CollectionListener<R> for EventRouter<S> {
    type Error = Error;

    fn handle(&mut self, event: CollectionEvent<'_, R>, members: &[R]) -> Result<(), Error> {
        tracing::trace!(
            namespace = %self.executor.namespace(),
            event = event.name(),
            members = members.len(),
            "routing collection event"
        );
        match event {
            CollectionEvent::Add { record, .. } => self.on_add(record, members),
            CollectionEvent::Remove { record, .. } => self.on_remove(record, members),
            CollectionEvent::Sort => self.write_index(members),
            CollectionEvent::Reset { previous } => self.on_reset(previous, members),
            CollectionEvent::Change { record } => self.on_change(record),
        }
    }
}
