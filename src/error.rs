use std::fmt;

use crate::codec::CodecError;
use crate::collection::CollectionError;
use crate::store::StoreError;

/// Error type for every fallible `PersistiveCollection` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The collection could not be configured (e.g. no namespace).
    Config(String),
    /// The key-value store rejected a read or write.
    Store(StoreError),
    /// A record could not be encoded for storage.
    Codec(CodecError),
    /// Rehydration found an indexed id without a readable record and the
    /// policy was `MissingRecordPolicy::Fail`.
    MissingRecord { id: String },
    DuplicateId(String),
    UnknownId(String),
    IndexOutOfBounds { index: usize, len: usize },
    /// An update tried to change the record's identifier.
    IdentityChanged { from: String, to: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(message) => write!(f, "configuration error: {}", message),
            Error::Store(err) => write!(f, "{}", err),
            Error::Codec(err) => write!(f, "{}", err),
            Error::MissingRecord { id } => {
                write!(f, "indexed record {} is missing from the store", id)
            }
            Error::DuplicateId(id) => write!(f, "record {} is already a member", id),
            Error::UnknownId(id) => write!(f, "record {} is not a member", id),
            Error::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for collection of {}", index, len)
            }
            Error::IdentityChanged { from, to } => {
                write!(f, "record identity is immutable ({} changed to {})", from, to)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Error::Codec(err)
    }
}

impl From<CollectionError<Error>> for Error {
    fn from(err: CollectionError<Error>) -> Self {
        match err {
            CollectionError::DuplicateId(id) => Error::DuplicateId(id),
            CollectionError::UnknownId(id) => Error::UnknownId(id),
            CollectionError::IndexOutOfBounds { index, len } => {
                Error::IndexOutOfBounds { index, len }
            }
            CollectionError::IdentityChanged { from, to } => Error::IdentityChanged { from, to },
            CollectionError::Listener(err) => err,
        }
    }
}
