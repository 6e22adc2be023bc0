//! Ordered record collections that persist themselves into a key-value store.
//!
//! A [`PersistiveCollection`] holds records in memory and mirrors them into a
//! [`KeyValueStore`]: one entry per record at `namespace-id`, and one index
//! entry at `namespace` listing member ids in order. Each mutation writes
//! exactly what it changed before returning; opening a collection without
//! initial records rehydrates it from the store.

mod codec;
mod collection;
mod error;
mod namespace;
mod persistive;
mod record;
mod rehydrate;
mod router;
mod store;
mod sync;

pub use codec::{decode, encode, CodecError};
pub use collection::{Collection, CollectionError, CollectionEvent, CollectionListener};
pub use error::Error;
pub use namespace::{IndexEntry, Namespace, INDEX_DELIMITER, RECORD_KEY_SEPARATOR};
pub use persistive::{CollectionOptions, PersistiveCollection};
pub use record::Record;
pub use rehydrate::{MissingRecordPolicy, Rehydrator};
#[cfg(feature = "emitter")]
pub use router::notifications;
pub use router::EventRouter;
pub use store::{InMemoryStore, JournalStore, JsonFileStore, KeyValueStore, StoreError, StoreOp};
pub use sync::SyncExecutor;

// Re-export the derive macro
pub use persistive_rust_macros::Record;

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
