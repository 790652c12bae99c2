use super::entry::{Entry, KeyOrder};
use super::map::SparseMap;
use crate::containers::FastTable;
use crate::error::{CollectionError, Result};
use crate::order::{self, SharedEquality, SharedOrder};
use crate::store::{Collection, Map, StoreIter, Table};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Map iterating in insertion order
///
/// Keys are looked up through a [`SparseMap`]; a table of keys records the
/// order in which they were first put. Both are updated together by every
/// mutation, including positional removal through a cursor.
///
/// ```rust
/// use fractal_collections::LinkedMap;
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut map = LinkedMap::new();
/// map.put("zebra", 1)?;
/// map.put("ant", 2)?;
/// map.put("zebra", 3)?;
/// let keys: Vec<&str> = map.keys().copied().collect();
/// assert_eq!(keys, vec!["zebra", "ant"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LinkedMap<K, V> {
    map: SparseMap<K, V>,
    keys: FastTable<K>,
}

impl<K: Hash + Ord + Clone + 'static, V> LinkedMap<K, V> {
    /// Create an empty map under the hash order
    pub fn new() -> Self {
        Self::with_order(order::hash())
    }
}

impl<K: Hash + Ord + Clone + 'static, V> Default for LinkedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + 'static, V> LinkedMap<K, V> {
    /// Create an empty map under `order`
    pub fn with_order(order: SharedOrder<K>) -> Self {
        Self {
            keys: FastTable::with_equality(order::as_equality(Arc::clone(&order))),
            map: SparseMap::with_order(order),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Order of the keys
    pub fn order(&self) -> &SharedOrder<K> {
        self.map.order()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    /// Whether an entry exists under `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Store `value` under `key`; a new key goes last, an existing key keeps
    /// its position
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        if let Some(current) = self.map.get_mut(&key) {
            return Ok(Some(std::mem::replace(current, value)));
        }
        self.map.put(key.clone(), value)?;
        self.keys.push_back(key);
        Ok(None)
    }

    /// Remove the entry under `key`, returning its value
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        self.take_entry(key).map(Entry::into_value)
    }

    /// Oldest entry
    pub fn first_entry(&self) -> Option<&Entry<K, V>> {
        self.keys.first().and_then(|key| self.map.entry(key))
    }

    /// Newest entry
    pub fn last_entry(&self) -> Option<&Entry<K, V>> {
        self.keys.last().and_then(|key| self.map.entry(key))
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entry<K, V>> + '_ {
        self.keys.iter().filter_map(move |key| self.map.entry(key))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.keys.iter()
    }

    /// Values in insertion order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.iter().map(Entry::value)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.map.clear();
        self.keys.clear();
    }

    fn take_entry(&mut self, key: &K) -> Option<Entry<K, V>> {
        let entry = self.map.take_entry(key)?;
        if let Some(position) = Table::index_of(&self.keys, key) {
            if let Err(error) = self.keys.remove_at(position) {
                log::warn!("linked map lost track of a key: {}", error);
            }
        }
        Some(entry)
    }
}

impl<K: Clone + 'static, V: 'static> Collection for LinkedMap<K, V> {
    type Item = Entry<K, V>;
    type Ref<'a> = &'a Entry<K, V> where Self: 'a;

    fn size(&self) -> usize {
        self.map.len()
    }

    fn iter(&self) -> StoreIter<'_, &'_ Entry<K, V>> {
        Box::new(LinkedMap::iter(self))
    }

    fn iter_rev(&self) -> StoreIter<'_, &'_ Entry<K, V>> {
        Box::new(LinkedMap::iter(self).rev())
    }

    fn add(&mut self, item: Entry<K, V>) -> Result<bool> {
        if self.contains_key(item.key()) {
            return Ok(false);
        }
        let (key, value) = item.into_parts();
        self.put(key, value)?;
        Ok(true)
    }

    fn remove_nth(&mut self, position: usize) -> Result<Entry<K, V>> {
        let key = self.keys.remove_at(position)?;
        self.map
            .take_entry(&key)
            .ok_or_else(|| CollectionError::illegal_state("linked key without an entry"))
    }

    fn clear(&mut self) -> Result<()> {
        LinkedMap::clear(self);
        Ok(())
    }

    fn equality(&self) -> SharedEquality<Entry<K, V>> {
        Arc::new(KeyOrder::new(Arc::clone(self.map.order())))
    }

    fn get_nth(&self, position: usize) -> Option<&Entry<K, V>> {
        self.keys.get(position).and_then(|key| self.map.entry(key))
    }

    fn contains(&self, item: &Entry<K, V>) -> bool {
        self.contains_key(item.key())
    }
}

impl<K: Clone + 'static, V: 'static> Map for LinkedMap<K, V> {
    type Key = K;
    type Value = V;

    fn get_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.map.entry(key)
    }

    fn put_entry(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.put(key, value)
    }

    fn remove_entry(&mut self, key: &K) -> Result<Option<Entry<K, V>>> {
        Ok(self.take_entry(key))
    }

    fn key_order(&self) -> SharedOrder<K> {
        Arc::clone(self.map.order())
    }
}

impl<K: fmt::Debug + Clone + 'static, V: fmt::Debug> fmt::Debug for LinkedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(LinkedMap::iter(self).map(|entry| (entry.key(), entry.value())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut map = LinkedMap::new();
        for (key, value) in [("c", 1), ("a", 2), ("b", 3)] {
            map.put(key, value).unwrap();
        }
        assert_eq!(map.put("a", 20).unwrap(), Some(2));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 20, 3]);
        assert_eq!(map.first_entry().map(|e| *e.key()), Some("c"));
        assert_eq!(map.last_entry().map(|e| *e.key()), Some("b"));
    }

    #[test]
    fn test_remove_keeps_index_in_lockstep() {
        let mut map = LinkedMap::new();
        map.put(1u32, "a").unwrap();
        map.put(2, "b").unwrap();
        assert_eq!(map.remove_key(&1), Some("a"));
        map.put(3, "c").unwrap();
        map.put(1, "again").unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(map.len(), 3);
        assert!(map.remove_key(&9).is_none());
        assert_eq!(map.keys().count(), 3);
    }

    #[test]
    fn test_cursor_removal_updates_both() {
        let mut map = LinkedMap::new();
        for k in 0..6u32 {
            map.put(k, k * k).unwrap();
        }
        let mut cursor = map.cursor();
        while let Some(key) = cursor.next().map(|e| *e.key()) {
            if key % 2 == 1 {
                cursor.remove().unwrap();
            }
        }
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert!(!map.contains_key(&3));
        assert_eq!(Collection::size(&map), 3);
    }

    #[test]
    fn test_map_trait_and_reverse() {
        let mut map = LinkedMap::new();
        map.put_entry("x", 1).unwrap();
        map.put_entry("y", 2).unwrap();
        assert!(!Collection::add(&mut map, Entry::new("x", 5)).unwrap());
        assert_eq!(map.get_value(&"x"), Some(&1));
        let reversed: Vec<&str> = Collection::iter_rev(&map).map(|e| *e.key()).collect();
        assert_eq!(reversed, vec!["y", "x"]);
        assert_eq!(map.remove_entry(&"x").unwrap().map(Entry::into_value), Some(1));
        assert_eq!(map.len(), 1);
    }
}
