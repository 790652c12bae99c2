use crate::error::{CollectionError, Result};
use crate::order::SharedEquality;
use crate::store::{Collection, StoreIter};

/// Holds each element at most once under the store's equality.
///
/// `add` declines elements already present. Duplicates the inner store held
/// before the view was built are hidden: only the first occurrence is
/// visible, and removing it removes every occurrence.
///
/// Iteration, `size` and positional removal compare each inner element with
/// the distinct elements before it: O(n * d) for `n` elements of which `d`
/// are distinct.
pub struct Distinct<C> {
    inner: C,
}

impl<C> Distinct<C> {
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

impl<C: Collection> Distinct<C> {
    /// Inner positions of first occurrences, in iteration order.
    ///
    /// One pass over the inner store, comparing each element with the
    /// distinct elements kept so far.
    fn firsts(&self) -> Vec<(usize, C::Ref<'_>)> {
        let equality = self.inner.equality();
        let mut kept: Vec<(usize, C::Ref<'_>)> = Vec::new();
        for (at, item) in self.inner.iter().enumerate() {
            if !kept.iter().any(|(_, seen)| equality.are_equal(seen, &item)) {
                kept.push((at, item));
            }
        }
        kept
    }
}

impl<C: Collection> Collection for Distinct<C> {
    type Item = C::Item;
    type Ref<'a> = C::Ref<'a> where Self: 'a;

    fn size(&self) -> usize {
        self.firsts().len()
    }

    fn iter(&self) -> StoreIter<'_, C::Ref<'_>> {
        Box::new(self.firsts().into_iter().map(|(_, item)| item))
    }

    fn iter_rev(&self) -> StoreIter<'_, C::Ref<'_>> {
        Box::new(self.firsts().into_iter().rev().map(|(_, item)| item))
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        if self.inner.contains(&item) {
            return Ok(false);
        }
        self.inner.add(item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        let at = self
            .firsts()
            .into_iter()
            .nth(position)
            .map(|(at, _)| at)
            .ok_or_else(|| CollectionError::out_of_bounds(position, self.size()))?;
        let removed = self.inner.remove_nth(at)?;
        for _ in 0..self.inner.size() {
            if !self.inner.remove(&removed)? {
                break;
            }
        }
        Ok(removed)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.inner.equality()
    }

    fn contains(&self, item: &C::Item) -> bool {
        self.inner.contains(item)
    }
}
