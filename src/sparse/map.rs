use super::entry::{Entry, KeyOrder};
use super::trie::{Iter, Trie};
use crate::error::{CollectionError, Result};
use crate::order::{self, Order, SharedEquality, SharedOrder};
use crate::store::{Collection, Map, StoreIter};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::ops::Bound;
use std::sync::Arc;

/// Ordered map on the sparse bucket trie
///
/// Keys are bucketed by their order's `index_of` and iterate in the order's
/// `compare` order. Replacing the value of an existing key updates the entry
/// in place.
///
/// # Examples
///
/// ```rust
/// use fractal_collections::{order, SparseMap};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut map = SparseMap::with_order(order::lexical::<String>());
/// map.put("pear".to_string(), 3)?;
/// map.put("apple".to_string(), 1)?;
/// assert_eq!(map.put("pear".to_string(), 4)?, Some(3));
/// let keys: Vec<&str> = map.keys().map(String::as_str).collect();
/// assert_eq!(keys, vec!["apple", "pear"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SparseMap<K, V> {
    trie: Trie<K, V>,
}

impl<K: Hash + Ord + 'static, V> SparseMap<K, V> {
    /// Create an empty map under the hash order
    pub fn new() -> Self {
        Self::with_order(order::hash())
    }
}

impl<K: Hash + Ord + 'static, V> Default for SparseMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static, V> SparseMap<K, V> {
    /// Create an empty map under `order`
    pub fn with_order(order: SharedOrder<K>) -> Self {
        Self {
            trie: Trie::new(order),
        }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// Whether the map is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trie.len() == 0
    }

    /// Order of the keys
    pub fn order(&self) -> &SharedOrder<K> {
        self.trie.order()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.trie.get(key).map(Entry::value)
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.trie.get_mut(key).map(Entry::value_mut)
    }

    /// Entry stored under `key`
    pub fn entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.trie.get(key)
    }

    /// Whether an entry exists under `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.trie.get(key).is_some()
    }

    /// Store `value` under `key`, returning the value it replaced
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.trie.put(Entry::new(key, value))
    }

    /// Remove the entry under `key`, returning its value
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        self.trie.remove(key).map(Entry::into_value)
    }

    /// Entry with the smallest key
    pub fn first_entry(&self) -> Option<&Entry<K, V>> {
        self.trie.iter().next()
    }

    /// Entry with the largest key
    pub fn last_entry(&self) -> Option<&Entry<K, V>> {
        self.trie.iter_rev().next()
    }

    /// Entry at `position` in key order
    pub fn nth_entry(&self, position: usize) -> Option<&Entry<K, V>> {
        self.trie.get_nth(position)
    }

    /// Entries in key order
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.trie.iter()
    }

    /// Entries in reverse key order
    pub fn iter_rev(&self) -> Iter<'_, K, V> {
        self.trie.iter_rev()
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.trie.iter().map(Entry::key)
    }

    /// Values in key order
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.trie.iter().map(Entry::value)
    }

    /// Read view of the entries whose keys lie between `from` and `to`
    pub fn sub_map(&self, from: Bound<K>, to: Bound<K>) -> SubMap<'_, K, V> {
        SubMap {
            map: self,
            from,
            to,
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.trie.clear();
    }

    pub(crate) fn take_entry(&mut self, key: &K) -> Option<Entry<K, V>> {
        self.trie.remove(key)
    }

    pub(crate) fn remove_nth_entry(&mut self, position: usize) -> Result<Entry<K, V>> {
        let size = self.trie.len();
        self.trie
            .remove_nth(position)
            .ok_or_else(|| CollectionError::out_of_bounds(position, size))
    }
}

impl<K: 'static, V: 'static> Collection for SparseMap<K, V> {
    type Item = Entry<K, V>;
    type Ref<'a> = &'a Entry<K, V> where Self: 'a;

    fn size(&self) -> usize {
        self.trie.len()
    }

    fn iter(&self) -> StoreIter<'_, &'_ Entry<K, V>> {
        Box::new(self.trie.iter())
    }

    fn iter_rev(&self) -> StoreIter<'_, &'_ Entry<K, V>> {
        Box::new(self.trie.iter_rev())
    }

    fn add(&mut self, item: Entry<K, V>) -> Result<bool> {
        if self.contains_key(item.key()) {
            return Ok(false);
        }
        self.trie.put(item)?;
        Ok(true)
    }

    fn remove_nth(&mut self, position: usize) -> Result<Entry<K, V>> {
        self.remove_nth_entry(position)
    }

    fn clear(&mut self) -> Result<()> {
        self.trie.clear();
        Ok(())
    }

    fn equality(&self) -> SharedEquality<Entry<K, V>> {
        Arc::new(KeyOrder::new(Arc::clone(self.trie.order())))
    }

    fn get_nth(&self, position: usize) -> Option<&Entry<K, V>> {
        self.trie.get_nth(position)
    }

    fn contains(&self, item: &Entry<K, V>) -> bool {
        self.contains_key(item.key())
    }

    fn remove(&mut self, item: &Entry<K, V>) -> Result<bool> {
        Ok(self.trie.remove(item.key()).is_some())
    }
}

impl<K: 'static, V: 'static> Map for SparseMap<K, V> {
    type Key = K;
    type Value = V;

    fn get_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.trie.get(key)
    }

    fn put_entry(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.put(key, value)
    }

    fn remove_entry(&mut self, key: &K) -> Result<Option<Entry<K, V>>> {
        Ok(self.trie.remove(key))
    }

    fn key_order(&self) -> SharedOrder<K> {
        Arc::clone(self.trie.order())
    }
}

impl<'a, K, V> IntoIterator for &'a SparseMap<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.trie.iter()
    }
}

impl<K: Hash + Ord + 'static, V> FromIterator<(K, V)> for SparseMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: 'static, V> Extend<(K, V)> for SparseMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(error) = self.put(key, value) {
                log::warn!("sparse map dropped an entry: {}", error);
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SparseMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.trie.iter().map(|entry| (entry.key(), entry.value())))
            .finish()
    }
}

fn above_lower<K>(order: &dyn Order<K>, key: &K, from: &Bound<K>) -> bool {
    match from {
        Bound::Included(from) => order.compare(key, from) != Ordering::Less,
        Bound::Excluded(from) => order.compare(key, from) == Ordering::Greater,
        Bound::Unbounded => true,
    }
}

fn below_upper<K>(order: &dyn Order<K>, key: &K, to: &Bound<K>) -> bool {
    match to {
        Bound::Included(to) => order.compare(key, to) != Ordering::Greater,
        Bound::Excluded(to) => order.compare(key, to) == Ordering::Less,
        Bound::Unbounded => true,
    }
}

/// Entries of a [`SparseMap`] whose keys lie within two bounds.
///
/// Each bound is tested with its own inclusivity.
pub struct SubMap<'a, K, V> {
    map: &'a SparseMap<K, V>,
    from: Bound<K>,
    to: Bound<K>,
}

impl<'a, K: 'static, V> SubMap<'a, K, V> {
    /// Whether `key` lies within the bounds
    pub fn in_range(&self, key: &K) -> bool {
        let order = self.map.order().as_ref();
        above_lower(order, key, &self.from) && below_upper(order, key, &self.to)
    }

    /// Value under `key` when it lies within the bounds
    pub fn get(&self, key: &K) -> Option<&'a V> {
        if self.in_range(key) {
            self.map.get(key)
        } else {
            None
        }
    }

    /// Whether an entry within the bounds exists under `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.in_range(key) && self.map.contains_key(key)
    }

    /// Entries within the bounds, in key order
    pub fn iter(&self) -> Range<'_, K, V> {
        Range::new(self, false)
    }

    /// Entries within the bounds, in reverse key order
    pub fn iter_rev(&self) -> Range<'_, K, V> {
        Range::new(self, true)
    }

    /// Number of entries within the bounds
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no entry lies within the bounds
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Entry with the smallest key within the bounds
    pub fn first_entry(&self) -> Option<&Entry<K, V>> {
        self.iter().next()
    }

    /// Entry with the largest key within the bounds
    pub fn last_entry(&self) -> Option<&Entry<K, V>> {
        self.iter_rev().next()
    }
}

/// Iterator over a [`SubMap`].
pub struct Range<'s, K, V> {
    entries: Iter<'s, K, V>,
    order: &'s dyn Order<K>,
    from: &'s Bound<K>,
    to: &'s Bound<K>,
    reverse: bool,
    started: bool,
    finished: bool,
}

impl<'s, K: 'static, V> Range<'s, K, V> {
    fn new(sub_map: &'s SubMap<'_, K, V>, reverse: bool) -> Self {
        let entries = if reverse {
            sub_map.map.iter_rev()
        } else {
            sub_map.map.iter()
        };
        Self {
            entries,
            order: sub_map.map.order().as_ref(),
            from: &sub_map.from,
            to: &sub_map.to,
            reverse,
            started: false,
            finished: false,
        }
    }
}

impl<'s, K, V> Iterator for Range<'s, K, V> {
    type Item = &'s Entry<K, V>;

    fn next(&mut self) -> Option<&'s Entry<K, V>> {
        if self.finished {
            return None;
        }
        for entry in self.entries.by_ref() {
            let key = entry.key();
            let (entered, within) = if self.reverse {
                (below_upper(self.order, key, self.to), above_lower(self.order, key, self.from))
            } else {
                (above_lower(self.order, key, self.from), below_upper(self.order, key, self.to))
            };
            if !self.started {
                if !entered {
                    continue;
                }
                self.started = true;
            }
            if !within {
                break;
            }
            return Some(entry);
        }
        self.finished = true;
        None
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}
