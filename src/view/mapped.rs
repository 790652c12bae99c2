use crate::error::{CollectionError, Result};
use crate::order::{self, SharedEquality};
use crate::store::{Collection, Owned, StoreIter};

/// Read-only projection of a store through a transform.
///
/// Elements are computed on every access. Adding is rejected since a
/// projected value cannot be mapped back; removal, `size` and `clear` act on
/// the inner store and removal reports the projected value.
pub struct Mapped<C, F, U> {
    inner: C,
    transform: F,
    equality: SharedEquality<U>,
}

impl<C, F, U: PartialEq> Mapped<C, F, U> {
    /// Wrap `inner`; projected values compare with `==`.
    pub fn new(inner: C, transform: F) -> Self {
        Self {
            inner,
            transform,
            equality: order::standard(),
        }
    }
}

impl<C, F, U> Mapped<C, F, U> {
    /// The wrapped store.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C, F, U> Collection for Mapped<C, F, U>
where
    C: Collection,
    F: Fn(&C::Item) -> U,
{
    type Item = U;
    type Ref<'a> = Owned<U> where Self: 'a;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn iter(&self) -> StoreIter<'_, Owned<U>> {
        Box::new(self.inner.iter().map(move |item| Owned((self.transform)(&item))))
    }

    fn iter_rev(&self) -> StoreIter<'_, Owned<U>> {
        Box::new(
            self.inner
                .iter_rev()
                .map(move |item| Owned((self.transform)(&item))),
        )
    }

    fn add(&mut self, _item: U) -> Result<bool> {
        Err(CollectionError::unsupported("add on a mapped view"))
    }

    fn remove_nth(&mut self, position: usize) -> Result<U> {
        let removed = self.inner.remove_nth(position)?;
        Ok((self.transform)(&removed))
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }

    fn equality(&self) -> SharedEquality<U> {
        self.equality.clone()
    }

    fn get_nth(&self, position: usize) -> Option<Owned<U>> {
        self.inner
            .get_nth(position)
            .map(|item| Owned((self.transform)(&item)))
    }
}

#[cfg(test)]
mod tests {
    use crate::containers::FastTable;
    use crate::error::CollectionError;
    use crate::store::Collection;

    #[test]
    fn test_projection() {
        let table: FastTable<&str> = ["one", "three", "five"].into_iter().collect();
        let mut lengths = table.map(|s: &&str| s.len());
        assert_eq!(lengths.to_vec(), vec![3, 5, 4]);
        assert!(lengths.contains(&5));
        assert_eq!(lengths.get_nth(2).map(|n| *n), Some(4));
        assert!(matches!(
            lengths.add(9),
            Err(CollectionError::UnsupportedOperation { .. })
        ));
        assert!(lengths.remove(&5).unwrap());
        assert_eq!(lengths.size(), 2);
        assert_eq!(lengths.inner().to_vec(), vec!["one", "five"]);
        lengths.clear().unwrap();
        assert!(lengths.into_inner().is_empty());
    }
}
