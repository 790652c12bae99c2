use super::{Collection, StoreIter};
use std::fmt;
use std::ops::Range;

/// A consecutive range of another store's iteration positions.
///
/// Sub-views borrow the store they came from; they are `Send` whenever the
/// store is `Sync`, which is what parallel execution relies on.
pub struct Split<'a, C: ?Sized> {
    store: &'a C,
    range: Range<usize>,
}

impl<'a, C> Split<'a, C>
where
    C: Collection + ?Sized,
{
    pub(crate) fn new(store: &'a C, range: Range<usize>) -> Self {
        Self { store, range }
    }

    /// Number of elements in this part.
    pub fn size(&self) -> usize {
        self.range.len()
    }

    /// Whether this part is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Positions covered in the parent store.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Elements of this part in iteration order.
    pub fn iter(&self) -> StoreIter<'a, C::Ref<'a>> {
        self.store.iter_range(self.range.clone())
    }

    /// Store this part was split from.
    pub fn store(&self) -> &'a C {
        self.store
    }
}

impl<C: ?Sized> Clone for Split<'_, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            range: self.range.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Split<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Split").field("range", &self.range).finish()
    }
}
