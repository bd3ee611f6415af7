//! Concrete dialect implementations.
//!
//! # Available Backends
//!
//! - [`sqlite`] - Embedded SQLite via `rusqlite`

pub mod sqlite;

pub use sqlite::{SqliteConfig, SqliteDialect};
