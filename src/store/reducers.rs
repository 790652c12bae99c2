//! Stock associative operators for [`Collection::reduce`] and
//! [`ParallelView::reduce`]
//!
//! Every operator here is associative, so a fork-join reduction over any
//! split agrees with the sequential one. Ties in [`min`] and [`max`] keep the
//! earlier element.
//!
//! ```rust
//! use fractal_collections::{order, reducers, Collection, FastTable};
//!
//! let table: FastTable<i32> = vec![4, -2, 9, 3].into_iter().collect();
//! assert_eq!(table.reduce(reducers::max(order::natural())), Some(9));
//! assert_eq!(table.reduce(reducers::sum()), Some(14));
//! ```
//!
//! [`Collection::reduce`]: crate::store::Collection::reduce
//! [`ParallelView::reduce`]: crate::concurrency::ParallelView::reduce

use crate::order::SharedOrder;
use std::ops::Add;

/// Keeps the first element; reduces to some element of the store.
pub fn any<T>() -> impl Fn(T, T) -> T + Send + Sync + Copy {
    |first, _| first
}

/// Greatest element under `order`.
pub fn max<T>(order: SharedOrder<T>) -> impl Fn(T, T) -> T + Send + Sync + Clone {
    move |left, right| {
        if order.compare(&left, &right).is_lt() {
            right
        } else {
            left
        }
    }
}

/// Least element under `order`.
pub fn min<T>(order: SharedOrder<T>) -> impl Fn(T, T) -> T + Send + Sync + Clone {
    move |left, right| {
        if order.compare(&right, &left).is_lt() {
            right
        } else {
            left
        }
    }
}

/// Logical and; `Some(true)` when every element is true.
pub fn and() -> impl Fn(bool, bool) -> bool + Send + Sync + Copy {
    |left, right| left && right
}

/// Logical or; `Some(true)` when any element is true.
pub fn or() -> impl Fn(bool, bool) -> bool + Send + Sync + Copy {
    |left, right| left || right
}

/// Sum of the elements.
pub fn sum<T: Add<Output = T>>() -> impl Fn(T, T) -> T + Send + Sync + Copy {
    |left, right| left + right
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::{ConcurrentContext, ParallelView};
    use crate::config::ConcurrencyConfig;
    use crate::containers::FastTable;
    use crate::order;
    use crate::store::Collection;
    use std::sync::Arc;

    fn parallel<T>(table: &FastTable<T>, parts: usize) -> ParallelView<FastTable<T>>
    where
        T: Clone,
    {
        let context = ConcurrentContext::new(ConcurrencyConfig::with_concurrency(2)).unwrap();
        ParallelView::with_context(table.clone(), Arc::new(context)).with_split_factor(parts)
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table: FastTable<i64> = (0..1000).map(|i| (i * 7_919) % 1_009 - 500).collect();
        for parts in [1, 3, 4, 7] {
            let view = parallel(&table, parts);
            assert_eq!(view.reduce(any()).unwrap(), table.reduce(any()));
            assert_eq!(view.reduce(sum()).unwrap(), table.reduce(sum()));
            assert_eq!(
                view.reduce(max(order::natural())).unwrap(),
                table.reduce(max(order::natural()))
            );
            assert_eq!(
                view.reduce(min(order::natural())).unwrap(),
                table.reduce(min(order::natural()))
            );
        }
        assert_eq!(table.reduce(any()), Some(-500));
        assert_eq!(table.reduce(max(order::natural())), table.iter().copied().max());
        assert_eq!(table.reduce(min(order::natural())), table.iter().copied().min());
    }

    #[test]
    fn test_boolean_reducers() {
        let flags: FastTable<bool> = (0..200).map(|i| i != 137).collect();
        let all_true: FastTable<bool> = (0..200).map(|_| true).collect();
        for parts in [1, 2, 5] {
            assert_eq!(parallel(&flags, parts).reduce(and()).unwrap(), Some(false));
            assert_eq!(parallel(&flags, parts).reduce(or()).unwrap(), Some(true));
            assert_eq!(parallel(&all_true, parts).reduce(and()).unwrap(), Some(true));
        }
        assert_eq!(flags.reduce(and()), Some(false));
        assert_eq!(FastTable::<bool>::new().reduce(or()), None);
    }

    #[test]
    fn test_ties_keep_earlier_element() {
        let by_len = order::comparator(|a: &String, b: &String| a.len().cmp(&b.len()));
        let words: FastTable<String> = ["bb", "aa", "c", "dd", "e"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        assert_eq!(words.reduce(max(by_len.clone())).as_deref(), Some("bb"));
        assert_eq!(words.reduce(min(by_len.clone())).as_deref(), Some("c"));
        let view = parallel(&words, 3);
        assert_eq!(view.reduce(max(by_len.clone())).unwrap().as_deref(), Some("bb"));
        assert_eq!(view.reduce(min(by_len)).unwrap().as_deref(), Some("c"));
    }
}
