//! `sqlds`
//!
//! A key-value datastore adapter that exposes a uniform
//! get/put/delete/query/batch contract over a backing relational store.
//! Keys are opaque slash-separated paths, values are opaque byte blobs,
//! and a single logical table (`blocks`: key, data) is the persistence
//! unit.
//!
//! The SQL text for a given backend is supplied by a [`Dialect`]: a
//! small fixed set of statement templates and composable fragments that
//! the store injects at construction. The crate ships a SQLite dialect
//! in [`backends::sqlite`]; other backends implement [`Dialect`] and
//! reuse the store unchanged.
//!
//! # Modules
//!
//! - [`dialect`] - The statement-template contract backends implement
//! - [`store`] - The datastore: point operations, queries, batches
//! - [`query`] - Query descriptors, result entries, post-processing
//! - [`key`] - Canonical path keys
//! - [`backends`] - Concrete dialect implementations
//!
//! # Example
//!
//! ```ignore
//! use sqlds::backends::sqlite;
//! use sqlds::{Key, Query};
//!
//! let store = sqlite::in_memory()?;
//! store.put(&Key::new("/a/b"), Some(b"hello"))?;
//!
//! let entries = store.query(Query::new().prefix("/a/"))?.rest()?;
//! assert_eq!(entries.len(), 1);
//! ```

pub mod backends;
pub mod dialect;
pub mod error;
pub mod key;
pub mod query;
pub mod store;

pub use dialect::Dialect;
pub use error::{Error, Result};
pub use key::Key;
pub use query::{CompareOp, Entry, Filter, Order, Query, Results};
pub use store::{Batch, Datastore};
