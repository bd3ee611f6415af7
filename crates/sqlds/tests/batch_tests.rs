//! Integration tests for transactional batches.

mod common;

use rusqlite::Connection;
use sqlds::backends::sqlite::SqliteDialect;
use sqlds::{Datastore, Dialect, Error, Key, Query};

use common::{new_store, populated_store, TEST_CASES};

#[test]
fn test_batch_put_then_commit() {
    let store = new_store();

    {
        let mut batch = store.batch().expect("failed to begin batch");
        for (key, value) in TEST_CASES {
            batch
                .put(&Key::new(key), Some(value.as_bytes()))
                .expect("failed to put in batch");
        }

        // An absent value is a type error that leaves the batch open.
        let err = batch
            .put(&Key::new("/foo"), None)
            .expect_err("put of None must fail");
        assert!(matches!(err, Error::InvalidType));

        batch.commit().expect("failed to commit");
    }

    for (key, value) in TEST_CASES {
        let got = store.get(&Key::new(key)).expect("failed to get");
        assert_eq!(got, value.as_bytes(), "value mismatch for {key}");
    }
    assert!(!store
        .has(&Key::new("/foo"))
        .expect("failed to check presence"));
}

#[test]
fn test_batch_delete_leaves_survivors() {
    let store = populated_store();

    {
        let mut batch = store.batch().expect("failed to begin batch");
        batch
            .delete(&Key::new("/a/b"))
            .expect("failed to delete in batch");
        batch
            .delete(&Key::new("/a/b/c"))
            .expect("failed to delete in batch");
        batch.commit().expect("failed to commit");
    }

    let entries = store
        .query(Query::new().prefix("/"))
        .expect("failed to query")
        .rest()
        .expect("failed to drain results");

    let mut got: Vec<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();
    got.sort_unstable();
    assert_eq!(got, vec!["/a", "/a/b/d", "/a/c", "/a/d", "/e", "/f", "/g"]);
}

#[test]
fn test_batched_delete_of_missing_key_succeeds() {
    let store = new_store();

    // Batched delete is fire-and-forget at the statement level.
    {
        let mut batch = store.batch().expect("failed to begin batch");
        batch
            .delete(&Key::new("/missing"))
            .expect("batched delete of missing key must succeed");
        batch.commit().expect("failed to commit");
    }

    // The direct path checks rows-affected and reports the absence.
    let err = store
        .delete(&Key::new("/missing"))
        .expect_err("direct delete of missing key must fail");
    assert!(err.is_not_found());
}

#[test]
fn test_dropped_batch_rolls_back() {
    let store = new_store();
    let key = Key::new("/discarded");

    {
        let mut batch = store.batch().expect("failed to begin batch");
        batch
            .put(&key, Some(b"value"))
            .expect("failed to put in batch");
        // Dropped without commit.
    }

    assert!(!store.has(&key).expect("failed to check presence"));
}

#[test]
fn test_explicit_rollback_discards_writes() {
    let store = new_store();
    let key = Key::new("/discarded");

    let mut batch = store.batch().expect("failed to begin batch");
    batch
        .put(&key, Some(b"value"))
        .expect("failed to put in batch");
    batch.rollback().expect("failed to roll back");

    assert!(!store.has(&key).expect("failed to check presence"));
}

/// A dialect whose put statement targets a table that does not exist,
/// to force a statement-level backend error inside a batch.
struct BrokenPutDialect {
    inner: SqliteDialect,
    put: String,
}

impl BrokenPutDialect {
    fn new() -> Self {
        Self {
            inner: SqliteDialect::default(),
            put: "INSERT INTO no_such_table (key, data) VALUES (?1, ?2)".to_string(),
        }
    }
}

impl Dialect for BrokenPutDialect {
    fn delete(&self) -> &str {
        self.inner.delete()
    }

    fn exists(&self) -> &str {
        self.inner.exists()
    }

    fn get(&self) -> &str {
        self.inner.get()
    }

    fn put(&self) -> &str {
        &self.put
    }

    fn query(&self) -> &str {
        self.inner.query()
    }

    fn prefix(&self, prefix: &str) -> String {
        self.inner.prefix(prefix)
    }

    fn limit(&self, limit: i64) -> String {
        self.inner.limit(limit)
    }

    fn offset(&self, offset: usize) -> String {
        self.inner.offset(offset)
    }
}

#[test]
fn test_backend_error_rolls_the_batch_back() {
    let conn = Connection::open_in_memory().expect("failed to open connection");
    conn.execute(
        "CREATE TABLE blocks (key TEXT PRIMARY KEY, data BLOB NOT NULL)",
        [],
    )
    .expect("failed to create table");
    let store = Datastore::new(conn, BrokenPutDialect::new());

    let mut batch = store.batch().expect("failed to begin batch");
    batch
        .delete(&Key::new("/anything"))
        .expect("batched delete must succeed");

    let err = batch
        .put(&Key::new("/a"), Some(b"value"))
        .expect_err("put through the broken dialect must fail");
    assert!(err.is_backend());

    // The statement failure rolled the transaction back; the batch is
    // terminal and rejects further use.
    let err = batch
        .delete(&Key::new("/a"))
        .expect_err("operations after rollback must fail");
    assert!(matches!(err, Error::BatchClosed));
}
