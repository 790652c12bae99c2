use super::entry::Entry;
use super::map::{SparseMap, SubMap};
use crate::error::Result;
use crate::order::{self, SharedEquality, SharedOrder};
use crate::store::{Collection, StoreIter};
use std::fmt;
use std::hash::Hash;
use std::ops::Bound;

/// Ordered set on the sparse bucket trie
///
/// ```rust
/// use fractal_collections::{order, SparseSet};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut set = SparseSet::with_order(order::natural::<i32>());
/// for value in [5, 3, 8, 1, 3] {
///     set.insert(value)?;
/// }
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 8]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SparseSet<T> {
    map: SparseMap<T, ()>,
}

impl<T: Hash + Ord + 'static> SparseSet<T> {
    /// Create an empty set under the hash order
    pub fn new() -> Self {
        Self::with_order(order::hash())
    }
}

impl<T: Hash + Ord + 'static> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SparseSet<T> {
    /// Create an empty set under `order`
    pub fn with_order(order: SharedOrder<T>) -> Self {
        Self {
            map: SparseMap::with_order(order),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Order of the elements
    pub fn order(&self) -> &SharedOrder<T> {
        self.map.order()
    }

    /// Whether an element equal to `value` is present
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Stored element equal to `value`
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.entry(value).map(Entry::key)
    }

    /// Add `value` unless an equal element is present
    pub fn insert(&mut self, value: T) -> Result<bool> {
        if self.map.contains_key(&value) {
            return Ok(false);
        }
        self.map.put(value, ())?;
        Ok(true)
    }

    /// Remove and return the element equal to `value`
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.map.take_entry(value).map(Entry::into_key)
    }

    /// Smallest element
    pub fn first(&self) -> Option<&T> {
        self.map.first_entry().map(Entry::key)
    }

    /// Largest element
    pub fn last(&self) -> Option<&T> {
        self.map.last_entry().map(Entry::key)
    }

    /// Elements in order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.map.iter().map(Entry::key)
    }

    /// Elements in reverse order
    pub fn iter_rev(&self) -> impl Iterator<Item = &T> + '_ {
        self.map.iter_rev().map(Entry::key)
    }

    /// Read view of the elements between `from` and `to`
    pub fn sub_set(&self, from: Bound<T>, to: Bound<T>) -> SubSet<'_, T> {
        SubSet {
            inner: self.map.sub_map(from, to),
        }
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<T: 'static> Collection for SparseSet<T> {
    type Item = T;
    type Ref<'a> = &'a T where Self: 'a;

    fn size(&self) -> usize {
        self.map.len()
    }

    fn iter(&self) -> StoreIter<'_, &'_ T> {
        Box::new(self.map.iter().map(Entry::key))
    }

    fn iter_rev(&self) -> StoreIter<'_, &'_ T> {
        Box::new(self.map.iter_rev().map(Entry::key))
    }

    fn add(&mut self, item: T) -> Result<bool> {
        self.insert(item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<T> {
        self.map.remove_nth_entry(position).map(Entry::into_key)
    }

    fn clear(&mut self) -> Result<()> {
        self.map.clear();
        Ok(())
    }

    fn equality(&self) -> SharedEquality<T> {
        order::as_equality(self.map.order().clone())
    }

    fn get_nth(&self, position: usize) -> Option<&T> {
        self.map.nth_entry(position).map(Entry::key)
    }

    fn contains(&self, item: &T) -> bool {
        self.map.contains_key(item)
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        Ok(self.take(item).is_some())
    }
}

impl<T: Hash + Ord + 'static> FromIterator<T> for SparseSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: 'static> Extend<T> for SparseSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(error) = self.insert(value) {
                log::warn!("sparse set dropped an element: {}", error);
            }
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for SparseSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(SparseSet::iter(self)).finish()
    }
}

/// Elements of a [`SparseSet`] within two bounds.
pub struct SubSet<'a, T> {
    inner: SubMap<'a, T, ()>,
}

impl<'a, T: 'static> SubSet<'a, T> {
    /// Whether `value` lies within the bounds and is present
    pub fn contains(&self, value: &T) -> bool {
        self.inner.contains_key(value)
    }

    /// Elements within the bounds, in order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.inner.iter().map(Entry::key)
    }

    /// Elements within the bounds, in reverse order
    pub fn iter_rev(&self) -> impl Iterator<Item = &T> + '_ {
        self.inner.iter_rev().map(Entry::key)
    }

    /// Number of elements within the bounds
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no element lies within the bounds
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
