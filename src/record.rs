//! Record - the unit a persistive collection stores, one store entry per record.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be members of a persistive collection.
///
/// The identifier is assigned before the record is added and must not change
/// while the record is a member. `PartialEq` lets the collection tell a real
/// field change from a no-op update.
///
/// Usually implemented with `#[derive(Record)]`.
pub trait Record: Serialize + DeserializeOwned + Clone + PartialEq {
    /// Default namespace for collections of this type. Collection options
    /// override it.
    const STORE_ID: Option<&'static str> = None;

    /// Returns the unique identifier for this record.
    fn id(&self) -> &str;
}
