use crate::error::Result;
use crate::order::SharedEquality;
use crate::store::{Collection, StoreIter, Table};
use std::ops::Range;

/// Replaces a store's equality.
///
/// Membership, removal by value and `iter_from` follow the supplied
/// equality; storage and iteration are the inner store's.
pub struct CustomEquality<C: Collection> {
    inner: C,
    equality: SharedEquality<C::Item>,
}

impl<C: Collection> CustomEquality<C> {
    /// Wrap `inner` under `equality`.
    pub fn new(inner: C, equality: SharedEquality<C::Item>) -> Self {
        Self { inner, equality }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Collection> Collection for CustomEquality<C> {
    type Item = C::Item;
    type Ref<'a> = C::Ref<'a> where Self: 'a;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn iter(&self) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter()
    }

    fn iter_rev(&self) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter_rev()
    }

    fn iter_range(&self, range: Range<usize>) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter_range(range)
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        self.inner.add(item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        self.inner.remove_nth(position)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.equality.clone()
    }

    fn get_nth(&self, position: usize) -> Option<C::Ref<'_>> {
        self.inner.get_nth(position)
    }
}

impl<T: Table> Table for CustomEquality<T> {
    fn get(&self, index: usize) -> Result<T::Ref<'_>> {
        self.inner.get(index)
    }

    fn set(&mut self, index: usize, item: T::Item) -> Result<T::Item> {
        self.inner.set(index, item)
    }

    fn insert(&mut self, index: usize, item: T::Item) -> Result<()> {
        self.inner.insert(index, item)
    }
}
