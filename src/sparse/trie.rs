//! Bucket trie behind sparse maps and sets
//!
//! Keys are routed by the 32-bit `index_of` of their order, four bits per
//! level, through nodes of sixteen buckets (each node a 16-position fractal
//! array). A bucket holds one entry, a child node, or a group of entries
//! sharing the same index: a nested trie under the order's sub-order when
//! there is one, a run sorted by `compare` otherwise.
//!
//! Entries sit at the shallowest level where their slot is free; child
//! nodes are only introduced down to the first nibble where two indices
//! differ, and removal folds single-bucket nodes and single-entry groups
//! back up, so the structure stays as shallow as the keys allow.

use super::entry::{Entry, KeyOrder};
use crate::containers::{FastTable, Iter as TableIter};
use crate::error::Result;
use crate::fractal::FractalArray;
use crate::order::{Order, SharedOrder};
use crate::store::algorithms;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

const NODE_BITS: u32 = 4;
const NODE_SLOTS: usize = 1 << NODE_BITS;
const INDEX_BITS: u32 = u32::BITS;

#[inline]
fn slot_of(index: u32, depth: u32) -> usize {
    ((index >> (INDEX_BITS - NODE_BITS * (depth + 1))) as usize) & (NODE_SLOTS - 1)
}

#[derive(Clone)]
pub(crate) struct Trie<K, V> {
    order: SharedOrder<K>,
    root: Node<K, V>,
}

#[derive(Clone)]
struct Node<K, V> {
    slots: FractalArray<Bucket<K, V>>,
    /// Occupied slots.
    used: usize,
    /// Entries in the whole subtree.
    len: usize,
}

#[derive(Clone)]
enum Bucket<K, V> {
    Entry { index: u32, entry: Entry<K, V> },
    Nested { index: u32, trie: Box<Trie<K, V>> },
    Sorted { index: u32, entries: FastTable<Entry<K, V>> },
    Node(Box<Node<K, V>>),
}

enum Target<'k, K> {
    Key { index: u32, key: &'k K },
    Nth(usize),
}

impl<K> Clone for Target<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Target<'_, K> {}

impl<K: 'static, V> Trie<K, V> {
    pub(crate) fn new(order: SharedOrder<K>) -> Self {
        Self {
            order,
            root: Node::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.root.len
    }

    #[inline]
    pub(crate) fn order(&self) -> &SharedOrder<K> {
        &self.order
    }

    pub(crate) fn get(&self, key: &K) -> Option<&Entry<K, V>> {
        let index = self.order.index_of(key);
        self.root.get(self.order.as_ref(), 0, index, key)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        let index = self.order.index_of(key);
        self.root.get_mut(self.order.as_ref(), 0, index, key)
    }

    pub(crate) fn get_nth(&self, position: usize) -> Option<&Entry<K, V>> {
        self.root.get_nth(position)
    }

    /// Stores `entry`; an existing entry with an equal key keeps its key and
    /// takes the new value, which is returned.
    pub(crate) fn put(&mut self, entry: Entry<K, V>) -> Result<Option<V>> {
        let index = self.order.index_of(entry.key());
        self.root.put(&self.order, 0, index, entry)
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<Entry<K, V>> {
        let index = self.order.index_of(key);
        self.root
            .remove(self.order.as_ref(), 0, Target::Key { index, key })
    }

    pub(crate) fn remove_nth(&mut self, position: usize) -> Option<Entry<K, V>> {
        self.root
            .remove(self.order.as_ref(), 0, Target::Nth(position))
    }

    pub(crate) fn clear(&mut self) {
        self.root = Node::new();
    }
}

impl<K, V> Trie<K, V> {
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self, false)
    }

    pub(crate) fn iter_rev(&self) -> Iter<'_, K, V> {
        Iter::new(self, true)
    }

    /// Deepest node level in use, root included.
    #[cfg(test)]
    fn height(&self) -> usize {
        self.root.height()
    }
}

impl<K, V> Node<K, V> {
    fn new() -> Self {
        Self {
            slots: FractalArray::with_capacity(NODE_SLOTS),
            used: 0,
            len: 0,
        }
    }

    fn place(&mut self, depth: u32, bucket: Bucket<K, V>) {
        let slot = slot_of(bucket.index().unwrap_or_default(), depth);
        self.len += bucket.len();
        self.used += 1;
        self.slots.set(slot, bucket);
    }

    /// Slot holding the entry at `position` and the position within it.
    fn locate(&self, mut position: usize) -> Option<(usize, usize)> {
        for slot in 0..NODE_SLOTS {
            if let Some(bucket) = self.slots.get(slot) {
                let len = bucket.len();
                if position < len {
                    return Some((slot, position));
                }
                position -= len;
            }
        }
        None
    }

    fn get_nth(&self, position: usize) -> Option<&Entry<K, V>> {
        let (slot, rest) = self.locate(position)?;
        match self.slots.get(slot)? {
            Bucket::Entry { entry, .. } => Some(entry),
            Bucket::Node(child) => child.get_nth(rest),
            Bucket::Nested { trie, .. } => trie.root.get_nth(rest),
            Bucket::Sorted { entries, .. } => entries.get(rest),
        }
    }

    #[cfg(test)]
    fn height(&self) -> usize {
        (0..NODE_SLOTS)
            .filter_map(|slot| match self.slots.get(slot) {
                Some(Bucket::Node(child)) => Some(child.height()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl<K: 'static, V> Node<K, V> {
    fn get(&self, order: &dyn Order<K>, depth: u32, index: u32, key: &K) -> Option<&Entry<K, V>> {
        match self.slots.get(slot_of(index, depth))? {
            Bucket::Node(child) => child.get(order, depth + 1, index, key),
            Bucket::Entry { index: at, entry } => {
                (*at == index && order.are_equal(entry.key(), key)).then_some(entry)
            }
            Bucket::Nested { index: at, trie } if *at == index => trie.get(key),
            Bucket::Sorted { index: at, entries } if *at == index => {
                sorted_find(entries, order, key).and_then(|position| entries.get(position))
            }
            _ => None,
        }
    }

    fn get_mut(
        &mut self,
        order: &dyn Order<K>,
        depth: u32,
        index: u32,
        key: &K,
    ) -> Option<&mut Entry<K, V>> {
        match self.slots.get_mut(slot_of(index, depth))? {
            Bucket::Node(child) => child.get_mut(order, depth + 1, index, key),
            Bucket::Entry { index: at, entry } => {
                (*at == index && order.are_equal(entry.key(), key)).then_some(entry)
            }
            Bucket::Nested { index: at, trie } if *at == index => trie.get_mut(key),
            Bucket::Sorted { index: at, entries } if *at == index => {
                let position = sorted_find(entries, order, key)?;
                entries.get_mut(position)
            }
            _ => None,
        }
    }

    fn put(
        &mut self,
        order: &SharedOrder<K>,
        depth: u32,
        index: u32,
        entry: Entry<K, V>,
    ) -> Result<Option<V>> {
        let slot = slot_of(index, depth);
        let Some(bucket) = self.slots.take(slot) else {
            self.slots.set(slot, Bucket::Entry { index, entry });
            self.used += 1;
            self.len += 1;
            return Ok(None);
        };
        let (bucket, previous) = match bucket {
            Bucket::Node(mut child) => {
                let previous = child.put(order, depth + 1, index, entry);
                (Bucket::Node(child), previous)
            }
            Bucket::Entry {
                index: at,
                entry: mut current,
            } if at == index => {
                if order.are_equal(current.key(), entry.key()) {
                    let previous = current.set_value(entry.into_value());
                    (
                        Bucket::Entry {
                            index,
                            entry: current,
                        },
                        Ok(Some(previous)),
                    )
                } else {
                    match Bucket::collision(order, index, current, entry) {
                        Ok(group) => (group, Ok(None)),
                        Err(error) => return Err(error),
                    }
                }
            }
            Bucket::Nested { index: at, mut trie } if at == index => {
                let previous = trie.put(entry);
                (Bucket::Nested { index, trie }, previous)
            }
            Bucket::Sorted {
                index: at,
                mut entries,
            } if at == index => {
                let previous = sorted_put(&mut entries, order, entry);
                (Bucket::Sorted { index, entries }, previous)
            }
            other => {
                let mut child = Node::new();
                child.place(depth + 1, other);
                let previous = child.put(order, depth + 1, index, entry);
                (Bucket::Node(Box::new(child)), previous)
            }
        };
        self.slots.set(slot, bucket);
        let previous = previous?;
        if previous.is_none() {
            self.len += 1;
        }
        Ok(previous)
    }

    fn remove(
        &mut self,
        order: &dyn Order<K>,
        depth: u32,
        target: Target<'_, K>,
    ) -> Option<Entry<K, V>> {
        let (slot, target) = match target {
            Target::Key { index, .. } => (slot_of(index, depth), target),
            Target::Nth(position) => {
                let (slot, rest) = self.locate(position)?;
                (slot, Target::Nth(rest))
            }
        };
        let bucket = self.slots.take(slot)?;
        let (bucket, removed) = bucket.remove(order, depth, target);
        match bucket {
            Some(bucket) => {
                self.slots.set(slot, bucket);
            }
            None => self.used -= 1,
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// What this node reduces to once emptied down to at most one bucket.
    fn collapse(mut self: Box<Self>) -> Option<Bucket<K, V>> {
        match self.used {
            0 => None,
            1 => {
                let slot = (0..NODE_SLOTS).find(|&slot| self.slots.get(slot).is_some());
                match slot {
                    Some(slot) if !matches!(self.slots.get(slot), Some(Bucket::Node(_))) => {
                        self.slots.take(slot)
                    }
                    _ => Some(Bucket::Node(self)),
                }
            }
            _ => Some(Bucket::Node(self)),
        }
    }
}

impl<K, V> Bucket<K, V> {
    fn index(&self) -> Option<u32> {
        match self {
            Bucket::Entry { index, .. }
            | Bucket::Nested { index, .. }
            | Bucket::Sorted { index, .. } => Some(*index),
            Bucket::Node(_) => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            Bucket::Entry { .. } => 1,
            Bucket::Nested { trie, .. } => trie.root.len,
            Bucket::Sorted { entries, .. } => entries.len(),
            Bucket::Node(node) => node.len,
        }
    }
}

impl<K: 'static, V> Bucket<K, V> {
    /// Group for two distinct keys sharing `index`.
    fn collision(
        order: &SharedOrder<K>,
        index: u32,
        current: Entry<K, V>,
        added: Entry<K, V>,
    ) -> Result<Self> {
        match order.sub_order(added.key()) {
            Some(sub_order) => {
                let mut trie = Trie::new(sub_order);
                trie.put(current)?;
                trie.put(added)?;
                Ok(Bucket::Nested {
                    index,
                    trie: Box::new(trie),
                })
            }
            None => {
                let mut entries: FastTable<Entry<K, V>> =
                    FastTable::with_equality(Arc::new(KeyOrder::new(Arc::clone(order))));
                sorted_put(&mut entries, order, current)?;
                sorted_put(&mut entries, order, added)?;
                Ok(Bucket::Sorted { index, entries })
            }
        }
    }

    fn remove(
        self,
        order: &dyn Order<K>,
        depth: u32,
        target: Target<'_, K>,
    ) -> (Option<Self>, Option<Entry<K, V>>) {
        match self {
            Bucket::Node(mut child) => {
                let removed = child.remove(order, depth + 1, target);
                (child.collapse(), removed)
            }
            Bucket::Entry { index, entry } => {
                let hit = match target {
                    Target::Key { index: wanted, key } => {
                        wanted == index && order.are_equal(entry.key(), key)
                    }
                    Target::Nth(position) => position == 0,
                };
                if hit {
                    (None, Some(entry))
                } else {
                    (Some(Bucket::Entry { index, entry }), None)
                }
            }
            Bucket::Nested { index, mut trie } => {
                let removed = match target {
                    Target::Key { index: wanted, key } if wanted == index => trie.remove(key),
                    Target::Key { .. } => None,
                    Target::Nth(position) => trie.remove_nth(position),
                };
                (Some(Bucket::Nested { index, trie }.fold_group()), removed)
            }
            Bucket::Sorted { index, mut entries } => {
                let position = match target {
                    Target::Key { index: wanted, key } if wanted == index => {
                        sorted_find(&entries, order, key)
                    }
                    Target::Key { .. } => None,
                    Target::Nth(position) => Some(position),
                };
                let removed = position.and_then(|position| entries.remove_at(position).ok());
                (Some(Bucket::Sorted { index, entries }.fold_group()), removed)
            }
        }
    }

    /// A group left with a single entry becomes that entry.
    fn fold_group(self) -> Self {
        match self {
            Bucket::Nested { index, mut trie } if trie.len() == 1 => match trie.remove_nth(0) {
                Some(entry) => Bucket::Entry { index, entry },
                None => Bucket::Nested { index, trie },
            },
            Bucket::Sorted { index, mut entries } if entries.len() == 1 => {
                match entries.pop_front() {
                    Some(entry) => Bucket::Entry { index, entry },
                    None => Bucket::Sorted { index, entries },
                }
            }
            other => other,
        }
    }
}

fn sorted_find<K, V>(
    entries: &FastTable<Entry<K, V>>,
    order: &dyn Order<K>,
    key: &K,
) -> Option<usize> {
    let mut low = 0;
    let mut high = entries.len();
    while low < high {
        let middle = low + (high - low) / 2;
        let candidate = entries.get(middle)?;
        match order.compare(key, candidate.key()) {
            Ordering::Less => high = middle,
            Ordering::Greater => low = middle + 1,
            Ordering::Equal => return Some(middle),
        }
    }
    None
}

fn sorted_put<K: 'static, V>(
    entries: &mut FastTable<Entry<K, V>>,
    order: &SharedOrder<K>,
    entry: Entry<K, V>,
) -> Result<Option<V>> {
    if let Some(position) = sorted_find(entries, order.as_ref(), entry.key()) {
        return Ok(entries
            .get_mut(position)
            .map(|current| current.set_value(entry.into_value())));
    }
    let by_key = KeyOrder::new(Arc::clone(order));
    let position = algorithms::insertion_index_of(&*entries, &entry, &by_key, 0, entries.len());
    entries.insert(position, entry)?;
    Ok(None)
}

/// Ordered iterator over the entries of a sparse map.
pub struct Iter<'a, K, V> {
    stack: Vec<Frame<'a, K, V>>,
    reverse: bool,
    remaining: usize,
}

enum Frame<'a, K, V> {
    Node {
        node: &'a Node<K, V>,
        front: usize,
        back: usize,
    },
    Sorted(TableIter<'a, Entry<K, V>>),
}

impl<'a, K, V> Frame<'a, K, V> {
    fn node(node: &'a Node<K, V>) -> Self {
        Frame::Node {
            node,
            front: 0,
            back: NODE_SLOTS,
        }
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(trie: &'a Trie<K, V>, reverse: bool) -> Self {
        Self {
            stack: vec![Frame::node(&trie.root)],
            reverse,
            remaining: trie.root.len,
        }
    }

    fn yielded(&mut self, entry: &'a Entry<K, V>) -> Option<&'a Entry<K, V>> {
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<&'a Entry<K, V>> {
        loop {
            let reverse = self.reverse;
            let frame = self.stack.last_mut()?;
            let bucket = match frame {
                Frame::Node { node, front, back } => {
                    if *front == *back {
                        self.stack.pop();
                        continue;
                    }
                    let slot = if reverse {
                        *back -= 1;
                        *back
                    } else {
                        *front += 1;
                        *front - 1
                    };
                    let node: &'a Node<K, V> = *node;
                    match node.slots.get(slot) {
                        Some(bucket) => bucket,
                        None => continue,
                    }
                }
                Frame::Sorted(entries) => {
                    let next = if reverse {
                        entries.next_back()
                    } else {
                        entries.next()
                    };
                    match next {
                        Some(entry) => return self.yielded(entry),
                        None => {
                            self.stack.pop();
                            continue;
                        }
                    }
                }
            };
            match bucket {
                Bucket::Entry { entry, .. } => return self.yielded(entry),
                Bucket::Node(child) => self.stack.push(Frame::node(child)),
                Bucket::Nested { trie, .. } => self.stack.push(Frame::node(&trie.root)),
                Bucket::Sorted { entries, .. } => self.stack.push(Frame::Sorted(entries.iter())),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Trie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{self, Equality, IndexOrder};

    /// Buckets numbers by tens, refining collisions by the number itself.
    struct Decades;

    impl Equality<u32> for Decades {
        fn are_equal(&self, left: &u32, right: &u32) -> bool {
            left == right
        }
    }

    impl Order<u32> for Decades {
        fn compare(&self, left: &u32, right: &u32) -> Ordering {
            left.cmp(right)
        }

        fn index_of(&self, value: &u32) -> u32 {
            value / 10
        }

        fn sub_order(&self, _value: &u32) -> Option<SharedOrder<u32>> {
            Some(Arc::new(IndexOrder))
        }
    }

    fn keys<V>(trie: &Trie<u32, V>) -> Vec<u32> {
        trie.iter().map(|entry| *entry.key()).collect()
    }

    #[test]
    fn test_put_get_replace() {
        let mut trie = Trie::new(order::index::<u32>());
        assert_eq!(trie.put(Entry::new(7, "a")).unwrap(), None);
        assert_eq!(trie.put(Entry::new(7, "b")).unwrap(), Some("a"));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get(&7).map(|e| *e.value()), Some("b"));
        assert!(trie.get(&8).is_none());
        if let Some(entry) = trie.get_mut(&7) {
            entry.set_value("c");
        }
        assert_eq!(trie.get(&7).map(|e| *e.value()), Some("c"));
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut trie = Trie::new(order::index::<u32>());
        let values = [900_000u32, 3, 70_000, 0, 15, u32::MAX, 16, 1 << 28];
        for v in values {
            trie.put(Entry::new(v, ())).unwrap();
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        assert_eq!(keys(&trie), sorted);
        let reversed: Vec<u32> = trie.iter_rev().map(|e| *e.key()).collect();
        sorted.reverse();
        assert_eq!(reversed, sorted);
        assert_eq!(trie.iter().len(), values.len());
    }

    #[test]
    fn test_nodes_only_where_indices_diverge() {
        let mut trie = Trie::new(order::index::<u32>());
        trie.put(Entry::new(0x1000_0000, ())).unwrap();
        trie.put(Entry::new(0x2000_0000, ())).unwrap();
        assert_eq!(trie.height(), 1);
        trie.put(Entry::new(0x1000_0001, ())).unwrap();
        assert_eq!(trie.height(), 8);
        trie.remove(&0x1000_0001);
        assert_eq!(trie.height(), 1);
        assert_eq!(keys(&trie), vec![0x1000_0000, 0x2000_0000]);
    }

    #[test]
    fn test_sorted_collisions() {
        let mut trie = Trie::new(order::natural::<u32>());
        for v in [5, 3, 8, 1, 9] {
            trie.put(Entry::new(v, v * 10)).unwrap();
        }
        assert_eq!(keys(&trie), vec![1, 3, 5, 8, 9]);
        assert_eq!(trie.put(Entry::new(8, 0)).unwrap(), Some(80));
        assert_eq!(trie.get(&8).map(|e| *e.value()), Some(0));
        assert_eq!(trie.remove(&3).map(|e| *e.key()), Some(3));
        assert!(trie.remove(&3).is_none());
        for v in [1, 5, 8] {
            trie.remove(&v);
        }
        assert_eq!(keys(&trie), vec![9]);
        assert_eq!(trie.get(&9).map(|e| *e.value()), Some(90));
    }

    #[test]
    fn test_nested_collisions() {
        let mut trie = Trie::new(Arc::new(Decades) as SharedOrder<u32>);
        for v in [42, 47, 41, 3, 45, 90] {
            trie.put(Entry::new(v, ())).unwrap();
        }
        assert_eq!(keys(&trie), vec![3, 41, 42, 45, 47, 90]);
        assert!(trie.get(&45).is_some());
        assert!(trie.get(&44).is_none());
        assert!(trie.remove(&44).is_none());
        for v in [41, 42, 45] {
            assert!(trie.remove(&v).is_some());
        }
        assert_eq!(keys(&trie), vec![3, 47, 90]);
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_positional_access() {
        let mut trie = Trie::new(Arc::new(Decades) as SharedOrder<u32>);
        for v in [12, 10, 11, 200, 7] {
            trie.put(Entry::new(v, ())).unwrap();
        }
        let by_position: Vec<u32> = (0..5)
            .filter_map(|i| trie.get_nth(i).map(|e| *e.key()))
            .collect();
        assert_eq!(by_position, vec![7, 10, 11, 12, 200]);
        assert!(trie.get_nth(5).is_none());
        assert_eq!(trie.remove_nth(2).map(|e| *e.key()), Some(11));
        assert_eq!(trie.remove_nth(3).map(|e| *e.key()), Some(200));
        assert_eq!(keys(&trie), vec![7, 10, 12]);
    }

    #[test]
    fn test_clear_and_clone() {
        let mut trie = Trie::new(order::index::<u32>());
        for v in 0..100 {
            trie.put(Entry::new(v, v)).unwrap();
        }
        let copy = trie.clone();
        trie.clear();
        assert_eq!(trie.len(), 0);
        assert!(trie.iter().next().is_none());
        assert_eq!(copy.len(), 100);
        assert_eq!(keys(&copy), (0..100).collect::<Vec<_>>());
    }
}
