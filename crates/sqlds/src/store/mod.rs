//! The datastore: point operations, query execution, batches.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::query::{postprocess, Entry, Query, Results};

mod batch;

pub use batch::Batch;

/// A key-value store over a relational backend.
///
/// The store executes the statements a [`Dialect`] supplies against a
/// shared connection. Cloning is cheap and clones share the
/// connection, so a `Datastore` can be used from multiple concurrent
/// callers; each operation takes the connection for the duration of
/// one backend round trip. A [`Batch`] holds the connection for its
/// whole lifetime, giving it exclusive ownership of its transaction.
///
/// # Example
///
/// ```ignore
/// use sqlds::backends::sqlite;
/// use sqlds::Key;
///
/// let store = sqlite::in_memory()?;
/// store.put(&Key::new("/a"), Some(b"value"))?;
/// assert!(store.has(&Key::new("/a"))?);
/// ```
pub struct Datastore<D: Dialect> {
    conn: Arc<Mutex<Connection>>,
    dialect: Arc<D>,
}

impl<D: Dialect> Clone for Datastore<D> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            dialect: Arc::clone(&self.dialect),
        }
    }
}

impl<D: Dialect> Datastore<D> {
    /// Create a store over an open connection with the given dialect.
    #[must_use]
    pub fn new(conn: Connection, dialect: D) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            dialect: Arc::new(dialect),
        }
    }

    /// Fetch the value stored under `key`.
    ///
    /// A zero-length value is valid and distinct from an absent key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record exists for the key.
    pub fn get(&self, key: &Key) -> Result<Vec<u8>> {
        let conn = self.conn()?;
        let value: Option<Vec<u8>> = conn
            .query_row(self.dialect.get(), params![key.as_str()], |row| row.get(0))
            .optional()?;
        value.ok_or(Error::NotFound)
    }

    /// Report whether a record exists under `key`.
    ///
    /// Never returns [`Error::NotFound`]; an absent key is `false`.
    pub fn has(&self, key: &Key) -> Result<bool> {
        let conn = self.conn()?;
        let present: Option<bool> = conn
            .query_row(self.dialect.exists(), params![key.as_str()], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(present.unwrap_or(false))
    }

    /// Store `value` under `key` unless the key already exists.
    ///
    /// Insert-if-absent: a repeated put of an existing key is a silent
    /// no-op, never an overwrite. An absent value is rejected before
    /// any backend call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] when `value` is `None`.
    pub fn put(&self, key: &Key, value: Option<&[u8]>) -> Result<()> {
        let value = value.ok_or(Error::InvalidType)?;
        let conn = self.conn()?;
        conn.execute(self.dialect.put(), params![key.as_str(), value])?;
        Ok(())
    }

    /// Delete the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the statement affected no
    /// rows. (A batched delete deliberately skips this check; see
    /// [`Batch::delete`].)
    pub fn delete(&self, key: &Key) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(self.dialect.delete(), params![key.as_str()])?;
        if affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Execute a range query.
    ///
    /// Prefix, limit, and offset are compiled into one SQL statement
    /// via the dialect's fragments; filters and orders the backend
    /// cannot express are applied to the materialized rows afterwards.
    /// The backend cursor is fully consumed and released before this
    /// returns.
    ///
    /// Note that limit/offset paging happens at the SQL level, on the
    /// prefix clause's implicit key order, before any requested order
    /// is applied; asking for a different order alongside paging
    /// reorders the already-paged subset.
    pub fn query(&self, query: Query) -> Result<Results> {
        let sql = self.compile(&query);
        tracing::trace!(sql = %sql, "compiled query statement");

        let mut entries = Vec::new();
        let mut pending_error = None;
        {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            loop {
                match rows.next() {
                    Ok(Some(row)) => match decode_row(row, query.keys_only) {
                        Ok(entry) => entries.push(entry),
                        Err(err) => {
                            pending_error = Some(err);
                            break;
                        }
                    },
                    Ok(None) => break,
                    Err(err) => {
                        pending_error = Some(Error::Backend(err));
                        break;
                    }
                }
            }
        }

        let mut entries = postprocess::apply_filters(entries, &query.filters);
        postprocess::apply_orders(&mut entries, &query.orders);
        Ok(Results::new(entries, pending_error))
    }

    /// Begin a batch of writes in one backend transaction.
    ///
    /// The batch holds the connection until committed, rolled back, or
    /// dropped; other operations on this store block for that long.
    pub fn batch(&self) -> Result<Batch<'_, D>> {
        Batch::begin(self.conn()?, self.dialect.as_ref())
    }

    /// Close the backing connection.
    ///
    /// A no-op when other clones of this store are still alive.
    pub fn close(self) -> Result<()> {
        if let Some(mutex) = Arc::into_inner(self.conn) {
            let conn = mutex
                .into_inner()
                .map_err(|err| Error::LockPoisoned(err.to_string()))?;
            conn.close().map_err(|(_, err)| Error::Backend(err))?;
        }
        Ok(())
    }

    /// Compose the base query template with the dialect's fragments.
    ///
    /// Fragment order is fixed: prefix, limit, offset. SQLite (and
    /// others) cannot express an offset without a limit, so a limit
    /// fragment with the dialect's "no cap" sentinel is emitted
    /// whenever only an offset was requested.
    fn compile(&self, query: &Query) -> String {
        let mut sql = self.dialect.query().to_string();

        if let Some(prefix) = query.prefix.as_deref().filter(|p| !p.is_empty()) {
            sql.push_str(&self.dialect.prefix(prefix));
        }
        let offset = query.offset.filter(|offset| *offset > 0);
        if query.limit.is_some() || offset.is_some() {
            let limit = query
                .limit
                .map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
            sql.push_str(&self.dialect.limit(limit));
        }
        if let Some(offset) = offset {
            sql.push_str(&self.dialect.offset(offset));
        }
        sql
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|err| Error::LockPoisoned(err.to_string()))
    }
}

/// Decode one result row into an entry.
///
/// Any column that fails to decode terminates the query's row
/// production; the error is carried on the offending entry and no
/// partial row is emitted.
fn decode_row(row: &rusqlite::Row<'_>, keys_only: bool) -> Result<Entry> {
    let key: String = row
        .get(0)
        .map_err(|err| Error::RowDecode(err.to_string()))?;
    let value = if keys_only {
        None
    } else {
        Some(
            row.get(1)
                .map_err(|err| Error::RowDecode(err.to_string()))?,
        )
    };
    Ok(Entry {
        key: Key::new(&key),
        value,
    })
}
