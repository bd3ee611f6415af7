//! Shared helpers for the datastore integration tests.

use sqlds::backends::sqlite::{self, SqliteDialect};
use sqlds::{Datastore, Key};

/// The standard key set used across the tests. `/g` deliberately holds
/// a zero-length value.
pub const TEST_CASES: &[(&str, &str)] = &[
    ("/a", "a"),
    ("/a/b", "ab"),
    ("/a/b/c", "abc"),
    ("/a/b/d", "abd"),
    ("/a/c", "ac"),
    ("/a/d", "ad"),
    ("/e", "e"),
    ("/f", "f"),
    ("/g", ""),
];

/// An empty in-memory store.
pub fn new_store() -> Datastore<SqliteDialect> {
    sqlite::in_memory().expect("failed to open in-memory store")
}

/// An in-memory store pre-populated with [`TEST_CASES`].
pub fn populated_store() -> Datastore<SqliteDialect> {
    let store = new_store();
    for (key, value) in TEST_CASES {
        store
            .put(&Key::new(key), Some(value.as_bytes()))
            .expect("failed to put test case");
    }
    store
}
