//! Query descriptors and result sequences.
//!
//! A [`Query`] is an immutable descriptor built by the caller and
//! consumed once by [`Datastore::query`](crate::Datastore::query).
//! Prefix, limit, and offset are pushed down to the backend through
//! the dialect's fragments; [`Filter`]s and [`Order`]s the backend
//! cannot express are fixed up in memory by [`postprocess`].

use std::cmp::Ordering;
use std::vec;

use crate::error::{Error, Result};
use crate::key::Key;

pub mod postprocess;

/// A request for a range of entries.
///
/// Built with the consuming setters and handed to
/// [`Datastore::query`](crate::Datastore::query).
///
/// # Example
///
/// ```
/// use sqlds::{CompareOp, Filter, Key, Order, Query};
///
/// let query = Query::new()
///     .prefix("/users/")
///     .filter(Filter::key_compare(CompareOp::GreaterThan, Key::new("/users/m")))
///     .order(Order::ByKeyDescending)
///     .limit(10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Restrict results to keys starting with this literal prefix.
    pub prefix: Option<String>,
    /// Maximum number of rows the backend returns.
    pub limit: Option<usize>,
    /// Number of leading rows the backend skips.
    pub offset: Option<usize>,
    /// Predicates every returned entry must satisfy, applied in order.
    pub filters: Vec<Filter>,
    /// Sort orders; the first is primary, later ones break ties.
    pub orders: Vec<Order>,
    /// Suppress value materialization; entries carry keys only.
    pub keys_only: bool,
}

impl Query {
    /// Create an empty query matching every entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict results to keys starting with `prefix`.
    ///
    /// The prefix is matched literally against the canonical key form;
    /// `/a/` selects the descendants of `/a` but not `/a` itself.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Cap the number of rows returned by the backend.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows at the backend.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Add a predicate every returned entry must satisfy.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a sort order; orders added later break ties.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    /// Return keys only, skipping value materialization.
    #[must_use]
    pub fn keys_only(mut self) -> Self {
        self.keys_only = true;
        self
    }
}

/// One (key, value) unit produced by a query.
///
/// The value is `None` when the query was keys-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry's key.
    pub key: Key,
    /// The entry's value, absent for keys-only queries.
    pub value: Option<Vec<u8>>,
}

/// Comparison operator for key filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// The key equals the reference key.
    Equal,
    /// The key does not equal the reference key.
    NotEqual,
    /// The key sorts after the reference key.
    GreaterThan,
    /// The key sorts at or after the reference key.
    GreaterThanOrEqual,
    /// The key sorts before the reference key.
    LessThan,
    /// The key sorts at or before the reference key.
    LessThanOrEqual,
}

impl CompareOp {
    /// Whether an ordering between entry key and reference key
    /// satisfies this operator.
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterThanOrEqual => ordering != Ordering::Less,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }
}

/// A predicate tested against one entry.
///
/// Filters the dialect cannot push into SQL; they are applied to the
/// materialized entries by [`postprocess::apply_filters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Compare the entry's key to a reference key.
    KeyCompare {
        /// How to compare.
        op: CompareOp,
        /// The reference key.
        key: Key,
    },
}

impl Filter {
    /// A key-comparison filter.
    #[must_use]
    pub fn key_compare(op: CompareOp, key: Key) -> Self {
        Self::KeyCompare { op, key }
    }

    /// Whether the entry satisfies this predicate.
    #[must_use]
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::KeyCompare { op, key } => op.accepts(entry.key.cmp(key)),
        }
    }
}

/// A sort order over entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Ascending lexicographic key order.
    ByKey,
    /// Descending lexicographic key order.
    ByKeyDescending,
}

impl Order {
    /// Compare two entries under this order.
    #[must_use]
    pub fn compare(self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            Self::ByKey => a.key.cmp(&b.key),
            Self::ByKeyDescending => b.key.cmp(&a.key),
        }
    }
}

/// The lazy, single-pass result sequence of one query.
///
/// Yields `Ok` entries until exhausted. If a row failed to decode, the
/// error is yielded as the final item and nothing further is produced.
/// Not restartable; re-querying requires a new [`Query`].
#[derive(Debug)]
pub struct Results {
    entries: vec::IntoIter<Entry>,
    /// Error carried by the row that terminated iteration, if any.
    pending_error: Option<Error>,
    finished: bool,
}

impl Results {
    pub(crate) fn new(entries: Vec<Entry>, pending_error: Option<Error>) -> Self {
        Self {
            entries: entries.into_iter(),
            pending_error,
            finished: false,
        }
    }

    /// Drain the remaining entries into a list.
    ///
    /// Returns the terminating error instead if one is pending.
    pub fn rest(mut self) -> Result<Vec<Entry>> {
        let entries = self.entries.by_ref().collect();
        match self.pending_error.take() {
            Some(err) => Err(err),
            None => Ok(entries),
        }
    }
}

impl Iterator for Results {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(entry) = self.entries.next() {
            return Some(Ok(entry));
        }
        self.finished = true;
        self.pending_error.take().map(Err)
    }
}
