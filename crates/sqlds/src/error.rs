//! Error types for `sqlds`.

use thiserror::Error;

/// A specialized `Result` type for datastore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the datastore.
#[derive(Debug, Error)]
pub enum Error {
    /// A value passed to a put was not a byte sequence.
    ///
    /// An absent value is a type error, not a delete; it is rejected
    /// before any backend call is made.
    #[error("value is not a byte sequence")]
    InvalidType,

    /// The requested key does not exist.
    ///
    /// Returned by `get` and by direct `delete`. `has` never returns
    /// this; it reports `false` instead.
    #[error("key not found")]
    NotFound,

    /// A failure from the backing store, passed through unchanged.
    #[error("backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    /// A result row could not be decoded into a (key, value) pair.
    ///
    /// Carried on the entry that failed; no further entries are
    /// produced for that query.
    #[error("failed to decode row: {0}")]
    RowDecode(String),

    /// The batch has already been committed or rolled back.
    #[error("batch is no longer open")]
    BatchClosed,

    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// An internal lock was poisoned (a thread panicked while holding it).
    #[error("internal lock poisoned: {0}")]
    LockPoisoned(String),
}

impl Error {
    /// Returns `true` if this error means the target key was absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns `true` if this error came from the backing store.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
