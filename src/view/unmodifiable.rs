use crate::error::{CollectionError, Result};
use crate::order::{SharedEquality, SharedOrder};
use crate::sparse::Entry;
use crate::store::{Collection, Map, StoreIter, Table};
use std::ops::Range;

/// Read-only view: every mutation fails with
/// [`CollectionError::UnsupportedOperation`], including removal through a
/// cursor.
pub struct Unmodifiable<C> {
    inner: C,
}

impl<C> Unmodifiable<C> {
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
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

fn rejected(operation: &str) -> CollectionError {
    CollectionError::unsupported(format!("{} on an unmodifiable view", operation))
}

impl<C: Collection> Collection for Unmodifiable<C> {
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

    fn add(&mut self, _item: C::Item) -> Result<bool> {
        Err(rejected("add"))
    }

    fn remove_nth(&mut self, _position: usize) -> Result<C::Item> {
        Err(rejected("remove"))
    }

    fn clear(&mut self) -> Result<()> {
        Err(rejected("clear"))
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.inner.equality()
    }

    fn get_nth(&self, position: usize) -> Option<C::Ref<'_>> {
        self.inner.get_nth(position)
    }

    fn contains(&self, item: &C::Item) -> bool {
        self.inner.contains(item)
    }

    fn remove(&mut self, _item: &C::Item) -> Result<bool> {
        Err(rejected("remove"))
    }

    fn remove_if<P>(&mut self, _predicate: P) -> Result<usize>
    where
        P: FnMut(&C::Item) -> bool,
    {
        Err(rejected("remove_if"))
    }
}

impl<T: Table> Table for Unmodifiable<T> {
    fn get(&self, index: usize) -> Result<T::Ref<'_>> {
        self.inner.get(index)
    }

    fn set(&mut self, _index: usize, _item: T::Item) -> Result<T::Item> {
        Err(rejected("set"))
    }

    fn insert(&mut self, _index: usize, _item: T::Item) -> Result<()> {
        Err(rejected("insert"))
    }

    fn sort(&mut self, _order: &SharedOrder<T::Item>) -> Result<()> {
        Err(rejected("sort"))
    }
}

impl<M: Map> Map for Unmodifiable<M> {
    type Key = M::Key;
    type Value = M::Value;

    fn get_entry(&self, key: &M::Key) -> Option<&Entry<M::Key, M::Value>> {
        self.inner.get_entry(key)
    }

    fn put_entry(&mut self, _key: M::Key, _value: M::Value) -> Result<Option<M::Value>> {
        Err(rejected("put"))
    }

    fn remove_entry(&mut self, _key: &M::Key) -> Result<Option<Entry<M::Key, M::Value>>> {
        Err(rejected("remove"))
    }

    fn key_order(&self) -> SharedOrder<M::Key> {
        self.inner.key_order()
    }
}
