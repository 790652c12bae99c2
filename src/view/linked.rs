use crate::containers::FastTable;
use crate::error::{CollectionError, Result};
use crate::order::SharedEquality;
use crate::store::{Collection, StoreIter};

/// Iterates a store in the order elements were added through the view.
///
/// A table of clones records insertion order and is updated in lockstep
/// with the inner store. Elements already present when the view is built
/// keep the inner store's iteration order.
pub struct Linked<C: Collection> {
    inner: C,
    arrivals: FastTable<C::Item>,
}

impl<C: Collection> Linked<C>
where
    C::Item: Clone,
{
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        let mut arrivals = FastTable::with_equality(inner.equality());
        arrivals.extend(inner.iter().map(|item| (*item).clone()));
        Self { inner, arrivals }
    }
}

impl<C: Collection> Linked<C> {
    /// The wrapped store.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Collection> Collection for Linked<C>
where
    C::Item: Clone,
{
    type Item = C::Item;
    type Ref<'a> = &'a C::Item where Self: 'a;

    fn size(&self) -> usize {
        self.arrivals.len()
    }

    fn iter(&self) -> StoreIter<'_, &'_ C::Item> {
        Box::new(self.arrivals.iter())
    }

    fn iter_rev(&self) -> StoreIter<'_, &'_ C::Item> {
        Box::new(self.arrivals.iter().rev())
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        if !self.inner.add(item.clone())? {
            return Ok(false);
        }
        self.arrivals.push_back(item);
        Ok(true)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        let item = self
            .arrivals
            .get(position)
            .ok_or_else(|| CollectionError::out_of_bounds(position, self.arrivals.len()))?;
        if !self.inner.remove(item)? {
            return Err(CollectionError::illegal_state(
                "linked element missing from the inner store",
            ));
        }
        self.arrivals.remove_at(position)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()?;
        self.arrivals.clear();
        Ok(())
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.inner.equality()
    }

    fn get_nth(&self, position: usize) -> Option<&C::Item> {
        self.arrivals.get(position)
    }

    fn contains(&self, item: &C::Item) -> bool {
        self.inner.contains(item)
    }
}
