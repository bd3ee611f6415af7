//! The SQL statement-template contract backends implement.
//!
//! A [`Dialect`] is pure data: a fixed set of named statement templates
//! and three composable fragments. The store executes the statements
//! with positional parameters; the fragments are appended to the base
//! query with their values substituted directly into the text, so the
//! dialect implementation is responsible for escaping the prefix
//! literal for its backend.

/// Backend-specific SQL for one fixed logical table shape
/// (`key` textual unique, `data` binary).
///
/// The five statement producers return parameterized SQL executed with
/// bound values. The three fragment producers return text appended to
/// the base [`query`](Dialect::query) statement, in the fixed order
/// prefix, limit, offset.
pub trait Dialect: Send + Sync {
    /// Statement deleting one row by key. One parameter: the key.
    fn delete(&self) -> &str;

    /// Statement returning a boolean for key presence. One parameter:
    /// the key.
    fn exists(&self) -> &str;

    /// Statement selecting the data column for one key. One parameter:
    /// the key.
    fn get(&self) -> &str;

    /// Statement inserting (key, data) only if the key is absent.
    /// Two parameters: the key and the value. A repeated put must be a
    /// silent no-op, never an overwrite and never a uniqueness
    /// violation.
    fn put(&self) -> &str;

    /// Statement selecting all (key, data) rows, with no WHERE clause.
    fn query(&self) -> &str;

    /// Fragment restricting the query to keys starting with `prefix`
    /// and imposing a deterministic `ORDER BY key`, so that limit and
    /// offset paging is stable. The prefix is embedded literally; the
    /// dialect escapes it.
    fn prefix(&self, prefix: &str) -> String;

    /// Fragment capping the row count. A negative `limit` means "no
    /// cap" and is rendered in the backend's spelling; the store uses
    /// it when an offset is requested without a limit.
    fn limit(&self, limit: i64) -> String;

    /// Fragment skipping the first `offset` rows. Always preceded by a
    /// limit fragment in the composed statement.
    fn offset(&self, offset: usize) -> String;
}
