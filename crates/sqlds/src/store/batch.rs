//! Transactional write batches.

use std::sync::MutexGuard;

use rusqlite::{params, Connection};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::key::Key;

/// Lifecycle of a batch: open, then exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Committed,
    RolledBack,
}

/// A single-use accumulator of writes bound to one backend
/// transaction.
///
/// Each `put` and `delete` is sent to the backend immediately but is
/// not durable until [`commit`](Batch::commit). A statement-level
/// backend error rolls the whole transaction back; after that (or
/// after a commit) further operations return [`Error::BatchClosed`].
/// Dropping an open batch rolls it back.
///
/// The batch holds the store's connection lock, so its transaction is
/// exclusively owned by the single caller that created it.
pub struct Batch<'a, D: Dialect> {
    conn: MutexGuard<'a, Connection>,
    dialect: &'a D,
    state: State,
}

impl<'a, D: Dialect> Batch<'a, D> {
    pub(crate) fn begin(conn: MutexGuard<'a, Connection>, dialect: &'a D) -> Result<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            dialect,
            state: State::Open,
        })
    }

    /// Stage an insert-if-absent of `value` under `key`.
    ///
    /// An absent value fails with [`Error::InvalidType`] and leaves
    /// the batch open; it does not invalidate the transaction.
    pub fn put(&mut self, key: &Key, value: Option<&[u8]>) -> Result<()> {
        self.ensure_open()?;
        let value = value.ok_or(Error::InvalidType)?;
        let sql = self.dialect.put();
        self.exec(sql, params![key.as_str(), value])
    }

    /// Stage a delete of `key`.
    ///
    /// Fire-and-forget at the statement level: unlike
    /// [`Datastore::delete`](crate::Datastore::delete), rows-affected
    /// is not checked, so deleting a non-existent key succeeds
    /// silently.
    pub fn delete(&mut self, key: &Key) -> Result<()> {
        self.ensure_open()?;
        let sql = self.dialect.delete();
        self.exec(sql, params![key.as_str()])
    }

    /// Commit the transaction, making the staged writes durable.
    ///
    /// On failure the transaction did not apply; the batch ends up
    /// rolled back and the backend error is surfaced unchanged.
    pub fn commit(mut self) -> Result<()> {
        self.ensure_open()?;
        match self.conn.execute_batch("COMMIT") {
            Ok(()) => {
                self.state = State::Committed;
                Ok(())
            }
            Err(err) => {
                self.roll_back();
                Err(Error::Backend(err))
            }
        }
    }

    /// Discard the staged writes.
    pub fn rollback(mut self) -> Result<()> {
        self.ensure_open()?;
        self.state = State::RolledBack;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn exec<P: rusqlite::Params>(&mut self, sql: &str, params: P) -> Result<()> {
        match self.conn.execute(sql, params) {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "batch statement failed; rolling back");
                self.roll_back();
                Err(Error::Backend(err))
            }
        }
    }

    fn roll_back(&mut self) {
        self.state = State::RolledBack;
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!(error = %err, "failed to roll back batch transaction");
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == State::Open {
            Ok(())
        } else {
            Err(Error::BatchClosed)
        }
    }
}

impl<D: Dialect> Drop for Batch<'_, D> {
    fn drop(&mut self) {
        if self.state == State::Open {
            tracing::debug!("batch dropped while open; rolling back");
            self.roll_back();
        }
    }
}
