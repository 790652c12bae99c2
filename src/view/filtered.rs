use crate::error::{CollectionError, Result};
use crate::order::SharedEquality;
use crate::store::{Collection, StoreIter};

/// Shows and accepts only the elements matching a predicate.
///
/// Elements of the inner store failing the predicate are invisible: they are
/// skipped by iteration, not counted, not found, and left alone by `clear`.
pub struct Filtered<C, P> {
    inner: C,
    predicate: P,
}

impl<C, P> Filtered<C, P> {
    /// Wrap `inner`.
    pub fn new(inner: C, predicate: P) -> Self {
        Self { inner, predicate }
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

impl<C, P> Filtered<C, P>
where
    C: Collection,
    P: Fn(&C::Item) -> bool,
{
    fn inner_position(&self, position: usize) -> Option<usize> {
        self.inner
            .iter()
            .enumerate()
            .filter(|(_, item)| (self.predicate)(item))
            .map(|(at, _)| at)
            .nth(position)
    }
}

impl<C, P> Collection for Filtered<C, P>
where
    C: Collection,
    P: Fn(&C::Item) -> bool,
{
    type Item = C::Item;
    type Ref<'a> = C::Ref<'a> where Self: 'a;

    fn size(&self) -> usize {
        self.inner
            .iter()
            .filter(|item| (self.predicate)(item))
            .count()
    }

    fn iter(&self) -> StoreIter<'_, C::Ref<'_>> {
        Box::new(self.inner.iter().filter(move |item| (self.predicate)(item)))
    }

    fn iter_rev(&self) -> StoreIter<'_, C::Ref<'_>> {
        Box::new(
            self.inner
                .iter_rev()
                .filter(move |item| (self.predicate)(item)),
        )
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        if !(self.predicate)(&item) {
            return Ok(false);
        }
        self.inner.add(item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        let at = self
            .inner_position(position)
            .ok_or_else(|| CollectionError::out_of_bounds(position, self.size()))?;
        self.inner.remove_nth(at)
    }

    fn clear(&mut self) -> Result<()> {
        let predicate = &self.predicate;
        self.inner.remove_if(|item| predicate(item)).map(|_| ())
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.inner.equality()
    }

    fn contains(&self, item: &C::Item) -> bool {
        (self.predicate)(item) && self.inner.contains(item)
    }

    fn remove(&mut self, item: &C::Item) -> Result<bool> {
        if !(self.predicate)(item) {
            return Ok(false);
        }
        self.inner.remove(item)
    }
}
