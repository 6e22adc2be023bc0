//! Collection - an ordered set of records that reports every mutation.
//!
//! A [`Collection`] owns exactly one [`CollectionListener`]. Each mutation
//! changes the in-memory members first and then hands the listener a
//! [`CollectionEvent`] together with the members as they are now. A listener
//! error is returned from the mutating call; the in-memory change is not
//! rolled back.

mod collection;

use std::convert::Infallible;
use std::fmt;

/// A lifecycle event emitted by a collection mutation.
#[derive(Debug, PartialEq)]
pub enum CollectionEvent<'a, R> {
    /// `record` became a member at `index`.
    Add { record: &'a R, index: usize },
    /// `record` stopped being a member; it was at `index`.
    Remove { record: &'a R, index: usize },
    /// Order changed, membership did not.
    Sort,
    /// Membership was replaced wholesale; `previous` is the old membership.
    Reset { previous: &'a [R] },
    /// A field of member `record` changed.
    Change { record: &'a R },
}

impl<R> CollectionEvent<'_, R> {
    pub fn name(&self) -> &'static str {
        match self {
            CollectionEvent::Add { .. } => "add",
            CollectionEvent::Remove { .. } => "remove",
            CollectionEvent::Sort => "sort",
            CollectionEvent::Reset { .. } => "reset",
            CollectionEvent::Change { .. } => "change",
        }
    }
}

/// Receives every lifecycle event of one collection.
pub trait CollectionListener<R> {
    type Error;

    /// Handle `event`. `members` is the membership after the mutation.
    fn handle(&mut self, event: CollectionEvent<'_, R>, members: &[R]) -> Result<(), Self::Error>;
}

/// A listener that ignores everything, for collections that persist nothing.
impl<R> CollectionListener<R> for () {
    type Error = Infallible;

    fn handle(&mut self, _event: CollectionEvent<'_, R>, _members: &[R]) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Error type for collection mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError<E> {
    DuplicateId(String),
    UnknownId(String),
    IndexOutOfBounds { index: usize, len: usize },
    IdentityChanged { from: String, to: String },
    /// The mutation was applied but the listener failed.
    Listener(E),
}

impl<E: fmt::Display> fmt::Display for CollectionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::DuplicateId(id) => write!(f, "record {} is already a member", id),
            CollectionError::UnknownId(id) => write!(f, "record {} is not a member", id),
            CollectionError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for collection of {}", index, len)
            }
            CollectionError::IdentityChanged { from, to } => {
                write!(f, "record identity is immutable ({} changed to {})", from, to)
            }
            CollectionError::Listener(err) => write!(f, "collection listener failed: {}", err),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for CollectionError<E> {}

pub use collection::Collection;
