//! Generic algorithms over stores

use super::{Collection, Split, Table};
use crate::error::Result;
use crate::order::Order;
use std::cmp::Ordering;

/// Iteration position of the first element equal to `item` under the
/// store's equality.
pub fn position<C>(store: &C, item: &C::Item) -> Option<usize>
where
    C: Collection + ?Sized,
{
    let equality = store.equality();
    store
        .iter()
        .position(|candidate| equality.are_equal(&candidate, item))
}

/// Iteration position of the last element equal to `item`.
pub fn last_position<C>(store: &C, item: &C::Item) -> Option<usize>
where
    C: Collection + ?Sized,
{
    let equality = store.equality();
    let size = store.size();
    store
        .iter_rev()
        .position(|candidate| equality.are_equal(&candidate, item))
        .map(|from_end| size - 1 - from_end)
}

/// Insertion point of `item` in `table[start..start + length]`, which must
/// be sorted by `order`.
///
/// Compares against the middle element and recurses into the half the
/// comparison points to; the insertion point is found once the half is
/// empty. Elements equal to `item` stay before the returned position.
pub fn insertion_index_of<T>(
    table: &T,
    item: &T::Item,
    order: &dyn Order<T::Item>,
    start: usize,
    length: usize,
) -> usize
where
    T: Table + ?Sized,
{
    if length == 0 {
        return start;
    }
    let half = length / 2;
    let middle = start + half;
    let ordering = match table.get(middle) {
        Ok(pivot) => order.compare(item, &pivot),
        Err(_) => return start,
    };
    match ordering {
        Ordering::Less => insertion_index_of(table, item, order, start, half),
        Ordering::Equal | Ordering::Greater => {
            insertion_index_of(table, item, order, middle + 1, length - half - 1)
        }
    }
}

/// Position of an element equal to `item` in a table sorted by `order`.
pub fn binary_search<T>(table: &T, item: &T::Item, order: &dyn Order<T::Item>) -> Option<usize>
where
    T: Table + ?Sized,
{
    let mut low = 0;
    let mut high = table.size();
    while low < high {
        let middle = low + (high - low) / 2;
        let pivot = table.get(middle).ok()?;
        match order.compare(item, &pivot) {
            Ordering::Less => high = middle,
            Ordering::Greater => low = middle + 1,
            Ordering::Equal => return Some(middle),
        }
    }
    None
}

/// Stable in-place sort of `table` by `order`.
///
/// The table is drained from the back, sorted, and rebuilt by positional
/// insertion, so views that remap positions end up sorted in their own
/// iteration order.
pub fn sort<T>(table: &mut T, order: &dyn Order<T::Item>) -> Result<()>
where
    T: Table + ?Sized,
{
    let mut items = Vec::with_capacity(table.size());
    while table.size() > 0 {
        items.push(table.remove_nth(table.size() - 1)?);
    }
    items.reverse();
    items.sort_by(|left, right| order.compare(left, right));
    for (index, item) in items.into_iter().enumerate() {
        table.insert(index, item)?;
    }
    Ok(())
}

/// Splits `store` into at most `n` consecutive sub-views of near-equal size.
///
/// An empty store yields a single empty sub-view; `n == 0` is treated as 1.
pub fn split<C>(store: &C, n: usize) -> Vec<Split<'_, C>>
where
    C: Collection + ?Sized,
{
    let size = store.size();
    let parts = n.max(1).min(size.max(1));
    let base = size / parts;
    let extra = size % parts;
    let mut splits = Vec::with_capacity(parts);
    let mut start = 0;
    for part in 0..parts {
        let length = base + usize::from(part < extra);
        splits.push(Split::new(store, start..start + length));
        start += length;
    }
    splits
}
