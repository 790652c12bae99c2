//! Copy-on-write view

use crate::error::Result;
use crate::order::SharedEquality;
use crate::store::{Collection, Map, Owned, StoreIter};
use arc_swap::ArcSwap;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Copy-on-write view: readers see immutable snapshots.
///
/// Writers serialize on a mutex, mutate the live store and publish a fresh
/// clone of it. Readers never take the mutex; they load the current snapshot
/// and work on it, so they observe either the state before a mutation or
/// the state after it, never a mix. A [`Batch`] groups several mutations
/// into one published snapshot.
///
/// ```rust
/// use fractal_collections::{Collection, FastTable};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let view = FastTable::<i32>::new().atomic();
/// view.add(1)?;
/// {
///     let mut batch = view.batch();
///     batch.push_back(2);
///     batch.push_back(3);
///     assert_eq!(view.size(), 1);
/// }
/// assert_eq!(view.snapshot().to_vec(), vec![1, 2, 3]);
/// # Ok(())
/// # }
/// ```
pub struct AtomicView<C> {
    inner: Mutex<C>,
    snapshot: ArcSwap<C>,
    version: AtomicU64,
}

impl<C: Clone> AtomicView<C> {
    /// Wrap `inner`; its current state is the first snapshot.
    pub fn new(inner: C) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(inner.clone()),
            inner: Mutex::new(inner),
            version: AtomicU64::new(0),
        }
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Arc<C> {
        self.snapshot.load_full()
    }

    /// Number of snapshots published since the view was built.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Apply `f` to the live store and publish the result.
    ///
    /// The snapshot is republished even when `f` fails, since `f` may have
    /// changed the store before failing.
    pub fn update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> Result<R>,
    {
        let mut inner = self.inner.lock();
        let result = f(&mut inner);
        self.publish(&inner);
        result
    }

    /// Lock the live store for several mutations published as one snapshot
    /// when the batch is dropped.
    ///
    /// Mutate through the batch only: calling the view's own mutators from
    /// the same thread while the batch is alive deadlocks.
    pub fn batch(&self) -> Batch<'_, C> {
        Batch {
            view: self,
            inner: self.inner.lock(),
        }
    }

    /// Unwrap the live store.
    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    fn publish(&self, inner: &C) {
        self.snapshot.store(Arc::new(inner.clone()));
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("published snapshot {}", version);
    }
}

impl<C: Collection + Clone> AtomicView<C> {
    /// Size of the latest snapshot.
    pub fn size(&self) -> usize {
        self.snapshot.load().size()
    }

    /// Whether the latest snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether the latest snapshot holds an element equal to `item`.
    pub fn contains(&self, item: &C::Item) -> bool {
        self.snapshot.load().contains(item)
    }

    /// Add `item` and publish.
    pub fn add(&self, item: C::Item) -> Result<bool> {
        self.update(|inner| inner.add(item))
    }

    /// Remove the first element equal to `item` and publish.
    pub fn remove(&self, item: &C::Item) -> Result<bool> {
        self.update(|inner| inner.remove(item))
    }

    /// Remove every element and publish.
    pub fn clear(&self) -> Result<()> {
        self.update(|inner| inner.clear())
    }

    /// Copy of the latest snapshot's elements.
    pub fn to_vec(&self) -> Vec<C::Item>
    where
        C::Item: Clone,
    {
        self.snapshot.load().to_vec()
    }
}

impl<M: Map + Clone> AtomicView<M> {
    /// Store `value` under `key` and publish.
    pub fn put(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.update(|inner| inner.put_entry(key, value))
    }

    /// Remove the entry under `key` and publish.
    pub fn remove_key(&self, key: &M::Key) -> Result<Option<M::Value>> {
        self.update(|inner| Ok(inner.remove_entry(key)?.map(|entry| entry.into_value())))
    }

    /// Value under `key` in the latest snapshot.
    pub fn get_value(&self, key: &M::Key) -> Option<M::Value>
    where
        M::Value: Clone,
    {
        self.snapshot.load().get_value(key).cloned()
    }

    /// Whether the latest snapshot has an entry under `key`.
    pub fn contains_key(&self, key: &M::Key) -> bool {
        self.snapshot.load().contains_key(key)
    }
}

impl<C: Clone> Clone for AtomicView<C> {
    fn clone(&self) -> Self {
        Self::new(self.inner.lock().clone())
    }
}

impl<C: fmt::Debug> fmt::Debug for AtomicView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicView")
            .field("snapshot", &self.snapshot.load_full())
            .field("version", &self.version.load(Ordering::Relaxed))
            .finish()
    }
}

/// Exclusive access to an [`AtomicView`]'s live store; publishes one
/// snapshot when dropped.
pub struct Batch<'a, C: Clone> {
    view: &'a AtomicView<C>,
    inner: MutexGuard<'a, C>,
}

impl<C: Clone> Batch<'_, C> {
    /// Publish now instead of at drop.
    pub fn commit(self) {}
}

impl<C: Clone> Deref for Batch<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone> DerefMut for Batch<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Clone> Drop for Batch<'_, C> {
    fn drop(&mut self) {
        self.view.publish(&self.inner);
    }
}

/// Iterates one snapshot by position.
struct SnapshotIter<C> {
    snapshot: Arc<C>,
    front: usize,
    back: usize,
    reverse: bool,
}

impl<C: Collection> Iterator for SnapshotIter<C>
where
    C::Item: Clone,
{
    type Item = Owned<C::Item>;

    fn next(&mut self) -> Option<Owned<C::Item>> {
        if self.front >= self.back {
            return None;
        }
        let position = if self.reverse {
            self.back -= 1;
            self.back
        } else {
            self.front += 1;
            self.front - 1
        };
        self.snapshot
            .get_nth(position)
            .map(|item| Owned((*item).clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<C> Collection for AtomicView<C>
where
    C: Collection + Clone,
    C::Item: Clone,
{
    type Item = C::Item;
    type Ref<'a> = Owned<C::Item> where Self: 'a;

    fn size(&self) -> usize {
        AtomicView::size(self)
    }

    fn iter(&self) -> StoreIter<'_, Owned<C::Item>> {
        let snapshot = self.snapshot();
        let back = snapshot.size();
        Box::new(SnapshotIter {
            snapshot,
            front: 0,
            back,
            reverse: false,
        })
    }

    fn iter_rev(&self) -> StoreIter<'_, Owned<C::Item>> {
        let snapshot = self.snapshot();
        let back = snapshot.size();
        Box::new(SnapshotIter {
            snapshot,
            front: 0,
            back,
            reverse: true,
        })
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        AtomicView::add(self, item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        self.update(|inner| inner.remove_nth(position))
    }

    fn clear(&mut self) -> Result<()> {
        AtomicView::clear(self)
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.snapshot.load().equality()
    }

    fn get_nth(&self, position: usize) -> Option<Owned<C::Item>> {
        self.snapshot
            .load()
            .get_nth(position)
            .map(|item| Owned((*item).clone()))
    }

    fn contains(&self, item: &C::Item) -> bool {
        AtomicView::contains(self, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::FastTable;
    use crate::sparse::SparseMap;

    #[test]
    fn test_reads_come_from_snapshot() {
        let view = FastTable::<i32>::new().atomic();
        view.add(1).unwrap();
        view.add(2).unwrap();
        let before = view.snapshot();
        view.add(3).unwrap();
        assert_eq!(before.to_vec(), vec![1, 2]);
        assert_eq!(view.to_vec(), vec![1, 2, 3]);
        assert_eq!(view.version(), 3);
        assert!(view.contains(&3));
    }

    #[test]
    fn test_batch_publishes_once() {
        let mut map = SparseMap::new();
        map.put("a", 1).unwrap();
        let view = map.atomic();
        {
            let mut batch = view.batch();
            batch.put("b", 2).unwrap();
            batch.put("c", 3).unwrap();
            assert_eq!(view.snapshot().len(), 1);
        }
        assert_eq!(view.version(), 1);
        assert_eq!(view.get_value(&"c"), Some(3));
        assert_eq!(view.snapshot().len(), 3);
    }

    #[test]
    fn test_map_helpers() {
        let view = SparseMap::<u32, &str>::new().atomic();
        assert_eq!(view.put(1, "one").unwrap(), None);
        assert_eq!(view.put(1, "uno").unwrap(), Some("one"));
        assert!(view.contains_key(&1));
        assert_eq!(view.remove_key(&1).unwrap(), Some("uno"));
        assert!(view.is_empty());
    }

    #[test]
    fn test_iteration_and_positional_removal() {
        let mut view = (1..=5).collect::<FastTable<i32>>().atomic();
        assert_eq!(
            Collection::iter(&view).next().map(Owned::into_inner),
            Some(1)
        );
        assert_eq!(Collection::remove_nth(&mut view, 0).unwrap(), 1);
        assert_eq!(
            Collection::iter_rev(&view).map(Owned::into_inner).collect::<Vec<_>>(),
            vec![5, 4, 3, 2]
        );
        let mut cursor = view.cursor();
        while let Some(n) = cursor.next().map(Owned::into_inner) {
            if n % 2 == 0 {
                cursor.remove().unwrap();
            }
        }
        assert_eq!(view.to_vec(), vec![3, 5]);
    }

    #[test]
    fn test_clone_is_independent() {
        let view = FastTable::<i32>::new().atomic();
        view.add(1).unwrap();
        let copy = view.clone();
        copy.add(2).unwrap();
        assert_eq!(view.size(), 1);
        assert_eq!(copy.size(), 2);
    }
}
