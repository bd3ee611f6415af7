//! Backend-agnostic fixups for query results.
//!
//! The dialect can only push a key prefix, a limit, and an offset into
//! SQL. Anything else a [`Query`](super::Query) asks for (predicate
//! filters, explicit orders including descending) is applied here, as
//! pure functions over the materialized entries, independent of the
//! backend.
//!
//! Note the paging order: the backend applies limit/offset on its own
//! (prefix-induced) key order before these fixups run, so a requested
//! order different from the implicit one reorders the already-paged
//! subset rather than paging a globally ordered set.

use std::cmp::Ordering;

use super::{Entry, Filter, Order};

/// Keep only the entries satisfying every filter, in the order the
/// filters were supplied.
///
/// Idempotent: re-filtering with the same predicate set changes
/// nothing.
pub fn apply_filters(mut entries: Vec<Entry>, filters: &[Filter]) -> Vec<Entry> {
    if filters.is_empty() {
        return entries;
    }
    entries.retain(|entry| filters.iter().all(|filter| filter.matches(entry)));
    entries
}

/// Sort the entries by the given orders.
///
/// The sort is stable and the first order is primary, so a sequence
/// already satisfying all orders is returned unchanged.
pub fn apply_orders(entries: &mut [Entry], orders: &[Order]) {
    if orders.is_empty() {
        return;
    }
    entries.sort_by(|a, b| {
        orders
            .iter()
            .map(|order| order.compare(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::query::CompareOp;

    fn entries(keys: &[&str]) -> Vec<Entry> {
        keys.iter()
            .map(|key| Entry {
                key: Key::new(key),
                value: None,
            })
            .collect()
    }

    fn keys(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.key.as_str()).collect()
    }

    #[test]
    fn test_filters_are_anded() {
        let filters = vec![
            Filter::key_compare(CompareOp::GreaterThan, Key::new("/a")),
            Filter::key_compare(CompareOp::LessThan, Key::new("/d")),
        ];
        let filtered = apply_filters(entries(&["/a", "/b", "/c", "/d"]), &filters);
        assert_eq!(keys(&filtered), vec!["/b", "/c"]);
    }

    #[test]
    fn test_filters_are_idempotent() {
        let filters = vec![Filter::key_compare(CompareOp::NotEqual, Key::new("/b"))];
        let once = apply_filters(entries(&["/a", "/b", "/c"]), &filters);
        let twice = apply_filters(once.clone(), &filters);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_orders_sort_descending() {
        let mut sorted = entries(&["/a/b", "/a/c", "/a/a"]);
        apply_orders(&mut sorted, &[Order::ByKeyDescending]);
        assert_eq!(keys(&sorted), vec!["/a/c", "/a/b", "/a/a"]);
    }

    #[test]
    fn test_orders_keep_satisfying_sequence() {
        let original = entries(&["/a", "/b", "/c"]);
        let mut sorted = original.clone();
        apply_orders(&mut sorted, &[Order::ByKey]);
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_later_orders_break_ties() {
        // Same key twice: the secondary order cannot reorder equal
        // keys because the sort is stable.
        let mut sorted = entries(&["/b", "/a", "/b"]);
        apply_orders(&mut sorted, &[Order::ByKey, Order::ByKeyDescending]);
        assert_eq!(keys(&sorted), vec!["/a", "/b", "/b"]);
    }

    #[test]
    fn test_empty_pipelines_are_noops() {
        let original = entries(&["/b", "/a"]);
        let filtered = apply_filters(original.clone(), &[]);
        assert_eq!(filtered, original);

        let mut unsorted = original.clone();
        apply_orders(&mut unsorted, &[]);
        assert_eq!(unsorted, original);
    }
}
