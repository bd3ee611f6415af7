//! SQLite backend: dialect, configuration, and open helpers.
//!
//! This module provides the [`SqliteDialect`] statement templates and
//! convenience constructors that open a [`Datastore`] over an embedded
//! SQLite database, creating the backing table if it does not exist.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::store::Datastore;

/// The default backing table name.
pub const DEFAULT_TABLE: &str = "blocks";

/// Configuration options for the SQLite backend.
#[derive(Debug, Clone, Default)]
pub struct SqliteConfig {
    /// Path to the database file. In-memory when not set.
    path: Option<PathBuf>,

    /// Backing table name. [`DEFAULT_TABLE`] when not set.
    table: Option<String>,
}

impl SqliteConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database file path.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the backing table name.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// The SQL statement templates for SQLite.
///
/// Statements are rendered once, at construction, over the configured
/// table name. The prefix fragment embeds the prefix literal with
/// single quotes doubled; LIKE wildcards in the prefix are passed
/// through, per the dialect contract.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    table: String,
    delete: String,
    exists: String,
    get: String,
    put: String,
    query: String,
}

impl SqliteDialect {
    /// Templates over the given table name.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            delete: format!("DELETE FROM {table} WHERE key = ?1"),
            exists: format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE key = ?1)"),
            get: format!("SELECT data FROM {table} WHERE key = ?1"),
            put: format!("INSERT OR IGNORE INTO {table} (key, data) VALUES (?1, ?2)"),
            query: format!("SELECT key, data FROM {table}"),
        }
    }

    /// The backing table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl Dialect for SqliteDialect {
    fn delete(&self) -> &str {
        &self.delete
    }

    fn exists(&self) -> &str {
        &self.exists
    }

    fn get(&self) -> &str {
        &self.get
    }

    fn put(&self) -> &str {
        &self.put
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn prefix(&self, prefix: &str) -> String {
        let escaped = prefix.replace('\'', "''");
        format!(" WHERE key LIKE '{escaped}%' ORDER BY key")
    }

    fn limit(&self, limit: i64) -> String {
        // SQLite spells "no cap" as a negative limit.
        format!(" LIMIT {limit}")
    }

    fn offset(&self, offset: usize) -> String {
        format!(" OFFSET {offset}")
    }
}

/// Open a datastore over a SQLite database file with default
/// configuration.
///
/// # Errors
///
/// Returns [`Error::Open`] if the database cannot be opened or
/// created.
pub fn open(path: impl AsRef<Path>) -> Result<Datastore<SqliteDialect>> {
    open_with_config(SqliteConfig::new().path(path.as_ref()))
}

/// Open an in-memory datastore, lost when the store is dropped.
///
/// # Errors
///
/// Returns [`Error::Open`] if the database cannot be created.
pub fn in_memory() -> Result<Datastore<SqliteDialect>> {
    open_with_config(SqliteConfig::new())
}

/// Open a datastore with custom configuration.
///
/// Creates the backing table if it does not exist. File-backed
/// databases are put in WAL mode with FULL synchronous writes, so
/// data is on disk before a commit returns.
///
/// # Errors
///
/// Returns [`Error::Open`] if the database cannot be opened or
/// created.
pub fn open_with_config(config: SqliteConfig) -> Result<Datastore<SqliteDialect>> {
    let conn = match &config.path {
        Some(path) => {
            let conn = Connection::open(path).map_err(|err| Error::Open(err.to_string()))?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "FULL")?;
            conn
        }
        None => Connection::open_in_memory().map_err(|err| Error::Open(err.to_string()))?,
    };

    let dialect = SqliteDialect::new(config.table.as_deref().unwrap_or(DEFAULT_TABLE));
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (key TEXT PRIMARY KEY, data BLOB NOT NULL)",
            dialect.table()
        ),
        [],
    )?;

    tracing::debug!(table = dialect.table(), "opened sqlite datastore");
    Ok(Datastore::new(conn, dialect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn test_config_builder() {
        let config = SqliteConfig::new().path("/tmp/ds.sqlite").table("things");
        assert_eq!(config.path, Some(PathBuf::from("/tmp/ds.sqlite")));
        assert_eq!(config.table.as_deref(), Some("things"));
    }

    #[test]
    fn test_statements_use_table_name() {
        let dialect = SqliteDialect::new("things");
        assert_eq!(dialect.get(), "SELECT data FROM things WHERE key = ?1");
        assert_eq!(
            dialect.put(),
            "INSERT OR IGNORE INTO things (key, data) VALUES (?1, ?2)"
        );
        assert_eq!(dialect.query(), "SELECT key, data FROM things");
    }

    #[test]
    fn test_fragments() {
        let dialect = SqliteDialect::default();
        assert_eq!(
            dialect.prefix("/a/"),
            " WHERE key LIKE '/a/%' ORDER BY key"
        );
        assert_eq!(dialect.limit(2), " LIMIT 2");
        assert_eq!(dialect.limit(-1), " LIMIT -1");
        assert_eq!(dialect.offset(3), " OFFSET 3");
    }

    #[test]
    fn test_prefix_escapes_quotes() {
        let dialect = SqliteDialect::default();
        assert_eq!(
            dialect.prefix("/o'brien/"),
            " WHERE key LIKE '/o''brien/%' ORDER BY key"
        );
    }

    #[test]
    fn test_in_memory_round_trip() {
        let store = in_memory().expect("failed to open in-memory store");
        let key = Key::new("/a");
        store.put(&key, Some(b"value")).expect("failed to put");
        assert_eq!(store.get(&key).expect("failed to get"), b"value");
    }

    #[test]
    fn test_custom_table() {
        let store = open_with_config(SqliteConfig::new().table("things"))
            .expect("failed to open store");
        let key = Key::new("/a");
        store.put(&key, Some(b"value")).expect("failed to put");
        assert!(store.has(&key).expect("failed to check presence"));
    }
}
