use crate::error::{CollectionError, Result};
use crate::order::{SharedEquality, SharedOrder};
use crate::store::algorithms;
use crate::store::{Collection, StoreIter, Table};
use std::ops::Range;
use std::sync::Arc;

/// Table kept sorted by an order.
///
/// The inner table is sorted once when the view is built; `add` then places
/// each element at its insertion point (after equal elements), so iteration
/// is always ascending. Positional `insert` and `set` would break the order
/// and are rejected.
///
/// ```rust
/// use fractal_collections::{order, Collection, FastTable, Table};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let table: FastTable<i32> = vec![5, 3, 8].into_iter().collect();
/// let mut sorted = table.sorted(order::natural())?;
/// sorted.add(1)?;
/// assert_eq!(sorted.to_vec(), vec![1, 3, 5, 8]);
/// assert!(sorted.insert(0, 9).is_err());
/// # Ok(())
/// # }
/// ```
pub struct Sorted<T: Table> {
    inner: T,
    order: SharedOrder<T::Item>,
}

impl<T: Table> Sorted<T> {
    /// Sort `inner` by `order` and wrap it.
    pub fn new(mut inner: T, order: SharedOrder<T::Item>) -> Result<Self> {
        algorithms::sort(&mut inner, order.as_ref())?;
        Ok(Self { inner, order })
    }

    /// The order the view is kept in.
    pub fn order(&self) -> &SharedOrder<T::Item> {
        &self.order
    }

    /// The wrapped table.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwrap the table.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Position of an element comparing equal to `item`, by binary search.
    pub fn position_of(&self, item: &T::Item) -> Option<usize> {
        algorithms::binary_search(&self.inner, item, self.order.as_ref())
    }
}

impl<T: Table> Collection for Sorted<T> {
    type Item = T::Item;
    type Ref<'a> = T::Ref<'a> where Self: 'a;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn iter(&self) -> StoreIter<'_, T::Ref<'_>> {
        self.inner.iter()
    }

    fn iter_rev(&self) -> StoreIter<'_, T::Ref<'_>> {
        self.inner.iter_rev()
    }

    fn iter_range(&self, range: Range<usize>) -> StoreIter<'_, T::Ref<'_>> {
        self.inner.iter_range(range)
    }

    fn add(&mut self, item: T::Item) -> Result<bool> {
        let at = algorithms::insertion_index_of(
            &self.inner,
            &item,
            self.order.as_ref(),
            0,
            self.inner.size(),
        );
        self.inner.insert(at, item)?;
        Ok(true)
    }

    fn remove_nth(&mut self, position: usize) -> Result<T::Item> {
        self.inner.remove_nth(position)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }

    fn equality(&self) -> SharedEquality<T::Item> {
        self.inner.equality()
    }

    fn get_nth(&self, position: usize) -> Option<T::Ref<'_>> {
        self.inner.get_nth(position)
    }
}

impl<T: Table> Table for Sorted<T> {
    fn get(&self, index: usize) -> Result<T::Ref<'_>> {
        self.inner.get(index)
    }

    fn set(&mut self, _index: usize, _item: T::Item) -> Result<T::Item> {
        Err(CollectionError::unsupported("set on a sorted view"))
    }

    fn insert(&mut self, _index: usize, _item: T::Item) -> Result<()> {
        Err(CollectionError::unsupported("positional insert on a sorted view"))
    }

    /// Re-sorting by the current order leaves the view untouched; another
    /// order re-sorts the inner table and becomes the view's order.
    fn sort(&mut self, order: &SharedOrder<T::Item>) -> Result<()> {
        if Arc::ptr_eq(order, &self.order) {
            return Ok(());
        }
        algorithms::sort(&mut self.inner, order.as_ref())?;
        self.order = Arc::clone(order);
        Ok(())
    }
}
