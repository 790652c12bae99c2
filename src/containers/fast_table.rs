//! FastTable: positional table on a fractal array
//!
//! Insertion and removal at any position cost amortized O(1): the fractal
//! array shifts the elements between the position and the closer end, and
//! shifts that cross whole children rotate those children instead of moving
//! their elements. Both ends behave like a deque.

use crate::error::{CollectionError, Result};
use crate::fractal::{FractalArray, MIN_CAPACITY};
use crate::memory::{Heap, NodeAllocator};
use crate::order::{self, Order, SharedEquality};
use crate::store::{Collection, StoreIter, Table};
use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Index, Range};
use std::sync::Arc;

/// Table with amortized O(1) insertion and removal at any position
///
/// Wasted capacity is bounded: capacity never exceeds
/// `max(4 * len, 16)` once an operation completes.
///
/// # Examples
///
/// ```rust
/// use fractal_collections::FastTable;
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut table = FastTable::new();
/// table.push_back(2);
/// table.push_front(0);
/// table.insert(1, 1)?;
/// assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
/// assert_eq!(table.remove_at(1)?, 1);
/// assert_eq!(table[1], 2);
/// # Ok(())
/// # }
/// ```
pub struct FastTable<T> {
    array: FractalArray<T>,
    len: usize,
    equality: SharedEquality<T>,
    allocator: Option<Arc<dyn NodeAllocator<T>>>,
}

impl<T: PartialEq> FastTable<T> {
    /// Create an empty table comparing elements with `PartialEq`
    pub fn new() -> Self {
        Self::with_equality(order::standard())
    }

    /// Create an empty table able to hold `capacity` elements before growing
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            array: FractalArray::with_capacity(capacity),
            len: 0,
            equality: order::standard(),
            allocator: None,
        }
    }

    /// Create an empty table taking its fractal levels from `allocator`
    pub fn with_allocator<A>(allocator: Arc<A>) -> Self
    where
        A: NodeAllocator<T> + 'static,
    {
        let allocator: Arc<dyn NodeAllocator<T>> = allocator;
        Self {
            array: FractalArray::with_capacity_in(MIN_CAPACITY, allocator.as_ref()),
            len: 0,
            equality: order::standard(),
            allocator: Some(allocator),
        }
    }
}

impl<T> FastTable<T> {
    /// Create an empty table using `equality` for searches
    pub fn with_equality(equality: SharedEquality<T>) -> Self {
        Self {
            array: FractalArray::new(),
            len: 0,
            equality,
            allocator: None,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positions available before the next growth
    #[inline]
    pub fn capacity(&self) -> usize {
        self.array.capacity()
    }

    /// Element at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            self.array.get(index)
        } else {
            None
        }
    }

    /// Mutable element at `index`
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            self.array.get_mut(index)
        } else {
            None
        }
    }

    /// First element
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Last element
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        crate::error::check_bounds(index, self.len)?;
        self.array
            .set(index, value)
            .ok_or_else(|| CollectionError::illegal_state("table slot was empty"))
    }

    /// Append an element
    pub fn push_back(&mut self, value: T) {
        self.reserve_one();
        let len = self.len;
        self.with_alloc(|array, alloc| array.replace_in(len, Some(value), alloc));
        self.len += 1;
    }

    /// Prepend an element
    pub fn push_front(&mut self, value: T) {
        self.reserve_one();
        self.with_alloc(|array, alloc| {
            array.rotate_right(1);
            array.replace_in(0, Some(value), alloc)
        });
        self.len += 1;
    }

    /// Remove the last element
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.len.checked_sub(1)?;
        self.remove_at(last).ok()
    }

    /// Remove the first element
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.remove_at(0).ok()
    }

    /// Insert `value` at `index`, shifting the closer end
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(CollectionError::out_of_bounds(index, self.len));
        }
        if index == self.len {
            self.push_back(value);
            return Ok(());
        }
        if index == 0 {
            self.push_front(value);
            return Ok(());
        }
        self.reserve_one();
        let len = self.len;
        self.with_alloc(|array, alloc| {
            if index >= len / 2 {
                array.shift_right_in(Some(value), index, len - index, alloc);
            } else {
                array.shift_left_in(Some(value), index - 1, index, alloc);
                array.rotate_right(1);
            }
        });
        self.len += 1;
        Ok(())
    }

    /// Remove the element at `index`, shifting the closer end
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        crate::error::check_bounds(index, self.len)?;
        let len = self.len;
        let removed = self.with_alloc(|array, alloc| {
            if index == len - 1 {
                array.replace_in(index, None, alloc)
            } else if index == 0 {
                let removed = array.replace_in(0, None, alloc);
                array.rotate_left(1);
                removed
            } else if index >= len / 2 {
                array.shift_left_in(None, len - 1, len - 1 - index, alloc)
            } else {
                let removed = array.shift_right_in(None, 0, index, alloc);
                array.rotate_left(1);
                removed
            }
        });
        self.len -= 1;
        self.shrink_if_sparse();
        removed.ok_or_else(|| CollectionError::illegal_state("table slot was empty"))
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.with_alloc(|array, alloc| array.clear_in(alloc));
        self.len = 0;
    }

    /// Iterator over the elements
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            array: &self.array,
            front: 0,
            back: self.len,
        }
    }

    /// Iterator over the elements at `range`
    pub fn range(&self, range: Range<usize>) -> Result<Iter<'_, T>> {
        crate::error::check_range(range.start, range.end, self.len)?;
        Ok(Iter {
            array: &self.array,
            front: range.start,
            back: range.end,
        })
    }

    /// Stable sort by `order`
    pub fn sort_by_order(&mut self, order: &dyn Order<T>) {
        self.sort_by(|left, right| order.compare(left, right));
    }

    /// Stable sort by `compare`
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        let mut items = Vec::with_capacity(self.len);
        while let Some(item) = self.pop_back() {
            items.push(item);
        }
        items.reverse();
        items.sort_by(&mut compare);
        for item in items {
            self.push_back(item);
        }
    }

    /// The allocator this table takes levels from, if any
    pub fn allocator(&self) -> Option<&Arc<dyn NodeAllocator<T>>> {
        self.allocator.as_ref()
    }

    fn with_alloc<R>(&mut self, f: impl FnOnce(&mut FractalArray<T>, &dyn NodeAllocator<T>) -> R) -> R {
        match &self.allocator {
            Some(allocator) => f(&mut self.array, allocator.as_ref()),
            None => f(&mut self.array, &Heap),
        }
    }

    fn reserve_one(&mut self) {
        if self.len == self.array.capacity() {
            self.with_alloc(|array, alloc| array.grow_in(alloc));
        }
    }

    fn shrink_if_sparse(&mut self) {
        let capacity = self.array.capacity();
        if capacity > MIN_CAPACITY && self.len * 4 < capacity {
            let len = self.len;
            self.with_alloc(|array, alloc| array.shrink_in(len, alloc));
        }
    }
}

impl<T> Collection for FastTable<T> {
    type Item = T;
    type Ref<'a> = &'a T where Self: 'a;

    fn size(&self) -> usize {
        self.len
    }

    fn iter(&self) -> StoreIter<'_, &'_ T> {
        Box::new(FastTable::iter(self))
    }

    fn iter_rev(&self) -> StoreIter<'_, &'_ T> {
        Box::new(FastTable::iter(self).rev())
    }

    fn iter_range(&self, range: Range<usize>) -> StoreIter<'_, &'_ T> {
        let end = range.end.min(self.len);
        let start = range.start.min(end);
        Box::new(Iter {
            array: &self.array,
            front: start,
            back: end,
        })
    }

    fn add(&mut self, item: T) -> Result<bool> {
        self.push_back(item);
        Ok(true)
    }

    fn remove_nth(&mut self, position: usize) -> Result<T> {
        FastTable::remove_at(self, position)
    }

    fn clear(&mut self) -> Result<()> {
        FastTable::clear(self);
        Ok(())
    }

    fn equality(&self) -> SharedEquality<T> {
        Arc::clone(&self.equality)
    }

    fn get_nth(&self, position: usize) -> Option<&T> {
        FastTable::get(self, position)
    }
}

impl<T> Table for FastTable<T> {
    fn get(&self, index: usize) -> Result<&T> {
        FastTable::get(self, index).ok_or_else(|| CollectionError::out_of_bounds(index, self.len))
    }

    fn set(&mut self, index: usize, item: T) -> Result<T> {
        FastTable::set(self, index, item)
    }

    fn insert(&mut self, index: usize, item: T) -> Result<()> {
        FastTable::insert(self, index, item)
    }
}

/// Iterator over a [`FastTable`]
pub struct Iter<'a, T> {
    array: &'a FractalArray<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        let item = self.array.get(self.front);
        self.front += 1;
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.array.get(self.back)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            array: self.array,
            front: self.front,
            back: self.back,
        }
    }
}

/// Owning iterator over a [`FastTable`]
pub struct IntoIter<T> {
    table: FastTable<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.table.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.table.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for FastTable<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { table: self }
    }
}

impl<'a, T> IntoIterator for &'a FastTable<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: PartialEq> FromIterator<T> for FastTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<T> Extend<T> for FastTable<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T: PartialEq> Default for FastTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for FastTable<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match FastTable::get(self, index) {
            Some(item) => item,
            None => panic!("index {} out of bounds for table of length {}", index, self.len),
        }
    }
}

impl<T: Clone> Clone for FastTable<T> {
    fn clone(&self) -> Self {
        Self {
            array: self.array.clone(),
            len: self.len,
            equality: Arc::clone(&self.equality),
            allocator: self.allocator.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FastTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for FastTable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for FastTable<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::fractal::MAX_SLOTS;
    use crate::memory::NodePool;

    fn contents(table: &FastTable<i32>) -> Vec<i32> {
        table.iter().copied().collect()
    }

    #[test]
    fn test_new() {
        let table: FastTable<i32> = FastTable::new();
        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), MIN_CAPACITY);
        assert!(table.first().is_none());
        assert!(table.last().is_none());
    }

    #[test]
    fn test_push_pop_both_ends() {
        let mut table = FastTable::new();
        table.push_back(1);
        table.push_back(2);
        table.push_front(0);
        table.push_front(-1);
        assert_eq!(contents(&table), vec![-1, 0, 1, 2]);
        assert_eq!(table.first(), Some(&-1));
        assert_eq!(table.last(), Some(&2));
        assert_eq!(table.pop_front(), Some(-1));
        assert_eq!(table.pop_back(), Some(2));
        assert_eq!(contents(&table), vec![0, 1]);
    }

    #[test]
    fn test_insert_remove_middle() {
        let mut table: FastTable<i32> = (0..10).collect();
        table.insert(3, 100).unwrap();
        table.insert(8, 200).unwrap();
        assert_eq!(contents(&table), vec![0, 1, 2, 100, 3, 4, 5, 6, 200, 7, 8, 9]);
        assert_eq!(table.remove_at(3).unwrap(), 100);
        assert_eq!(table.remove_at(7).unwrap(), 200);
        assert_eq!(contents(&table), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_out_of_bounds_errors() {
        let mut table: FastTable<i32> = (0..3).collect();
        assert!(matches!(
            table.insert(5, 1),
            Err(CollectionError::OutOfBounds { index: 5, size: 3 })
        ));
        assert!(table.remove_at(3).is_err());
        assert!(table.set(3, 0).is_err());
        assert!(Table::get(&table, 3).is_err());
        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_set_and_get_mut() {
        let mut table: FastTable<i32> = (0..4).collect();
        assert_eq!(table.set(2, 20).unwrap(), 2);
        if let Some(value) = table.get_mut(0) {
            *value = 10;
        }
        assert_eq!(contents(&table), vec![10, 1, 20, 3]);
    }

    #[test]
    fn test_matches_vec_across_levels() {
        let mut table = FastTable::new();
        let mut model = Vec::new();
        let count = 3 * MAX_SLOTS as i32;
        for i in 0..count {
            let at = (i as usize * 7) % (model.len() + 1);
            table.insert(at, i).unwrap();
            model.insert(at, i);
        }
        assert_eq!(table.len(), model.len());
        assert_eq!(contents(&table), model);

        while model.len() > 10 {
            let at = (model.len() * 5) / 11;
            assert_eq!(table.remove_at(at).unwrap(), model.remove(at));
        }
        assert_eq!(contents(&table), model);
        assert!(table.capacity() <= (4 * table.len()).max(MIN_CAPACITY));
    }

    #[test]
    fn test_capacity_bound_after_drain() {
        let mut table: FastTable<u32> = (0..5000).collect();
        assert!(table.capacity() <= 4 * table.len());
        while table.len() > 3 {
            table.pop_front();
            assert!(table.capacity() <= (4 * table.len()).max(MIN_CAPACITY));
        }
    }

    #[test]
    fn test_iterators() {
        let table: FastTable<i32> = (0..5).collect();
        assert_eq!(table.iter().rev().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
        assert_eq!(table.iter().len(), 5);
        assert_eq!(table.iter().nth(3), Some(&3));
        assert_eq!(table.range(1..3).unwrap().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(table.range(2..9).is_err());
        let owned: Vec<i32> = table.clone().into_iter().collect();
        assert_eq!(owned, vec![0, 1, 2, 3, 4]);
        let mut sum = 0;
        for value in &table {
            sum += value;
        }
        assert_eq!(sum, 10);
    }

    #[test]
    fn test_collection_contract() {
        let mut table: FastTable<i32> = (1..=6).collect();
        assert!(table.contains(&4));
        assert!(Collection::remove(&mut table, &4).unwrap());
        assert!(!table.contains(&4));
        assert_eq!(table.remove_if(|x| x % 2 == 1).unwrap(), 3);
        assert_eq!(contents(&table), vec![2, 6]);
        let from: Vec<i32> = table.iter_from(&6).unwrap().copied().collect();
        assert_eq!(from, vec![6]);
        assert!(matches!(
            table.iter_from(&7),
            Err(CollectionError::IllegalArgument { .. })
        ));
        Collection::clear(&mut table).unwrap();
        assert!(Collection::is_empty(&table));
    }

    #[test]
    fn test_sort() {
        let mut table: FastTable<i32> = vec![5, 3, 8, 1, 9, 2].into_iter().collect();
        table.sort_by_order(order::natural::<i32>().as_ref());
        assert_eq!(contents(&table), vec![1, 2, 3, 5, 8, 9]);
        table.sort_by(|a, b| b.cmp(a));
        assert_eq!(contents(&table), vec![9, 8, 5, 3, 2, 1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut table: FastTable<i32> = (0..600).collect();
        let snapshot = table.clone();
        table.insert(300, -1).unwrap();
        assert_eq!(snapshot.len(), 600);
        assert_eq!(snapshot[300], 300);
        assert_eq!(table[300], -1);
        assert_ne!(table, snapshot);
    }

    #[test]
    fn test_with_allocator() {
        let pool: Arc<NodePool<u64>> = Arc::new(NodePool::new(PoolConfig::default()).unwrap());
        let mut table = FastTable::with_allocator(Arc::clone(&pool));
        for i in 0..3000u64 {
            table.push_back(i);
        }
        for i in 0..1000u64 {
            table.insert(1500, i).unwrap();
        }
        assert_eq!(table.len(), 4000);
        table.clear();
        assert!(pool.stats().available > 0);

        for i in 0..1000u64 {
            table.push_front(i);
        }
        assert!(pool.stats().hits > 0);
        assert_eq!(table.first(), Some(&999));
        assert_eq!(table.last(), Some(&0));
    }

    #[test]
    fn test_debug_and_eq() {
        let a: FastTable<i32> = (0..3).collect();
        let b: FastTable<i32> = (0..3).collect();
        assert_eq!(a, b);
        assert_eq!(format!("{:?}", a), "[0, 1, 2]");
    }

    #[test]
    fn test_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<FastTable<i32>>();
        assert_sync::<FastTable<i32>>();
    }
}
