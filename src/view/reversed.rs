use crate::error::{check_bounds, CollectionError, Result};
use crate::order::SharedEquality;
use crate::store::{Collection, StoreIter, Table};

/// Iterates a store last to first.
///
/// Positions are mirrored: position `i` of the view is position
/// `size - 1 - i` of the inner store.
pub struct Reversed<C> {
    inner: C,
}

impl<C> Reversed<C> {
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

impl<C: Collection> Reversed<C> {
    fn mirror(&self, position: usize) -> Result<usize> {
        let size = self.inner.size();
        check_bounds(position, size)?;
        Ok(size - 1 - position)
    }
}

impl<C: Collection> Collection for Reversed<C> {
    type Item = C::Item;
    type Ref<'a> = C::Ref<'a> where Self: 'a;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn iter(&self) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter_rev()
    }

    fn iter_rev(&self) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter()
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        self.inner.add(item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        let at = self.mirror(position)?;
        self.inner.remove_nth(at)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.inner.equality()
    }

    fn get_nth(&self, position: usize) -> Option<C::Ref<'_>> {
        let at = self.mirror(position).ok()?;
        self.inner.get_nth(at)
    }

    fn contains(&self, item: &C::Item) -> bool {
        self.inner.contains(item)
    }
}

impl<T: Table> Table for Reversed<T> {
    fn get(&self, index: usize) -> Result<T::Ref<'_>> {
        let at = self.mirror(index)?;
        self.inner.get(at)
    }

    fn set(&mut self, index: usize, item: T::Item) -> Result<T::Item> {
        let at = self.mirror(index)?;
        self.inner.set(at, item)
    }

    fn insert(&mut self, index: usize, item: T::Item) -> Result<()> {
        let size = self.inner.size();
        if index > size {
            return Err(CollectionError::out_of_bounds(index, size));
        }
        self.inner.insert(size - index, item)
    }
}

#[cfg(test)]
mod tests {
    use crate::containers::FastTable;
    use crate::store::{Collection, Table};

    #[test]
    fn test_mirrored_positions() {
        let table: FastTable<i32> = (1..=4).collect();
        let mut reversed = table.reversed();
        assert_eq!(reversed.to_vec(), vec![4, 3, 2, 1]);
        assert_eq!(*reversed.get(0).unwrap(), 4);
        assert_eq!(reversed.get_nth(3).map(|x| *x), Some(1));
        assert!(reversed.get(4).is_err());

        reversed.insert(0, 5).unwrap();
        reversed.insert(5, 0).unwrap();
        assert_eq!(reversed.to_vec(), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(reversed.set(1, 40).unwrap(), 4);
        assert_eq!(reversed.remove_nth(0).unwrap(), 5);
        assert_eq!(reversed.into_inner().to_vec(), vec![0, 1, 2, 3, 40]);
    }

    #[test]
    fn test_double_reverse_is_identity() {
        let table: FastTable<char> = "abc".chars().collect();
        let twice = table.reversed().reversed();
        assert_eq!(twice.to_vec(), vec!['a', 'b', 'c']);
        assert_eq!(
            twice.iter_rev().map(|c| *c).collect::<String>(),
            "cba"
        );
    }
}
