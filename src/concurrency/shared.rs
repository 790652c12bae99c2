//! Reader/writer locked view with writer preference

use crate::error::Result;
use crate::order::SharedEquality;
use crate::store::{Collection, Owned, Split, StoreIter};
use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::ops::{Deref, DerefMut, Range};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Lock usage counters of a [`SharedView`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockStats {
    /// Read locks currently held
    pub current_readers: usize,
    /// Most read locks ever held at once
    pub max_readers: usize,
    /// Write locks currently held (0 or 1)
    pub current_writers: usize,
    /// Most write locks ever held at once
    pub max_writers: usize,
    /// Read locks granted
    pub read_acquisitions: u64,
    /// Write locks granted
    pub write_acquisitions: u64,
    /// Writers that announced themselves while the lock was busy
    pub writer_waits: u64,
}

#[derive(Default)]
struct LockCounters {
    current_readers: CachePadded<AtomicUsize>,
    max_readers: AtomicUsize,
    current_writers: CachePadded<AtomicUsize>,
    max_writers: AtomicUsize,
    read_acquisitions: AtomicU64,
    write_acquisitions: AtomicU64,
    writer_waits: AtomicU64,
}

impl LockCounters {
    fn enter_read(&self) {
        let now = self.current_readers.fetch_add(1, Ordering::AcqRel) + 1;
        self.max_readers.fetch_max(now, Ordering::AcqRel);
        self.read_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    fn leave_read(&self) {
        self.current_readers.fetch_sub(1, Ordering::AcqRel);
    }

    fn enter_write(&self) {
        let now = self.current_writers.fetch_add(1, Ordering::AcqRel) + 1;
        self.max_writers.fetch_max(now, Ordering::AcqRel);
        self.write_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    fn leave_write(&self) {
        self.current_writers.fetch_sub(1, Ordering::AcqRel);
    }

    fn snapshot(&self) -> LockStats {
        LockStats {
            current_readers: self.current_readers.load(Ordering::Acquire),
            max_readers: self.max_readers.load(Ordering::Acquire),
            current_writers: self.current_writers.load(Ordering::Acquire),
            max_writers: self.max_writers.load(Ordering::Acquire),
            read_acquisitions: self.read_acquisitions.load(Ordering::Relaxed),
            write_acquisitions: self.write_acquisitions.load(Ordering::Relaxed),
            writer_waits: self.writer_waits.load(Ordering::Relaxed),
        }
    }
}

/// A reader/writer lock that lets a waiting writer in before readers
/// arriving after it.
///
/// New readers first pass a gate that stays closed while any writer is
/// waiting; the data itself sits behind a `parking_lot` rwlock.
struct WriterPreferringLock<C> {
    data: RwLock<C>,
    waiting_writers: Mutex<usize>,
    writers_done: Condvar,
    counters: LockCounters,
}

impl<C> WriterPreferringLock<C> {
    fn new(data: C) -> Self {
        Self {
            data: RwLock::new(data),
            waiting_writers: Mutex::new(0),
            writers_done: Condvar::new(),
            counters: LockCounters::default(),
        }
    }

    fn read(&self) -> SharedReadGuard<'_, C> {
        {
            let mut waiting = self.waiting_writers.lock();
            while *waiting > 0 {
                self.writers_done.wait(&mut waiting);
            }
        }
        let guard = self.data.read();
        self.counters.enter_read();
        SharedReadGuard {
            guard,
            counters: &self.counters,
        }
    }

    fn write(&self) -> SharedWriteGuard<'_, C> {
        {
            let mut waiting = self.waiting_writers.lock();
            *waiting += 1;
        }
        let guard = match self.data.try_write() {
            Some(guard) => guard,
            None => {
                self.counters.writer_waits.fetch_add(1, Ordering::Relaxed);
                self.data.write()
            }
        };
        {
            let mut waiting = self.waiting_writers.lock();
            *waiting -= 1;
            if *waiting == 0 {
                self.writers_done.notify_all();
            }
        }
        self.counters.enter_write();
        SharedWriteGuard {
            guard,
            counters: &self.counters,
        }
    }
}

/// Read access to a [`SharedView`]'s store.
pub struct SharedReadGuard<'a, C> {
    guard: RwLockReadGuard<'a, C>,
    counters: &'a LockCounters,
}

impl<C> Deref for SharedReadGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.guard
    }
}

impl<C> Drop for SharedReadGuard<'_, C> {
    fn drop(&mut self) {
        self.counters.leave_read();
    }
}

/// Exclusive access to a [`SharedView`]'s store.
pub struct SharedWriteGuard<'a, C> {
    guard: RwLockWriteGuard<'a, C>,
    counters: &'a LockCounters,
}

impl<C> Deref for SharedWriteGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.guard
    }
}

impl<C> DerefMut for SharedWriteGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.guard
    }
}

impl<C> Drop for SharedWriteGuard<'_, C> {
    fn drop(&mut self) {
        self.counters.leave_write();
    }
}

/// Reader/writer locked view with writer preference.
///
/// Any number of readers proceed together; writers are exclusive, and once
/// a writer is waiting no new reader is admitted until it has run, so a
/// steady stream of readers cannot starve writers. Iteration copies the
/// elements under a read lock and iterates the copy outside it.
///
/// The view is cheap to share: clones of the handle returned by
/// [`handle`](Self::handle) and the sub-views from
/// [`split`](Self::split) all go through the same lock.
///
/// ```rust
/// use fractal_collections::{Collection, FastTable};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let view = FastTable::<u32>::new().shared();
/// view.add(7)?;
/// assert!(view.contains(&7));
/// assert_eq!(view.stats().write_acquisitions, 1);
/// # Ok(())
/// # }
/// ```
pub struct SharedView<C> {
    lock: Arc<WriterPreferringLock<C>>,
}

impl<C> SharedView<C> {
    /// Wrap `inner` behind a fresh lock.
    pub fn new(inner: C) -> Self {
        Self {
            lock: Arc::new(WriterPreferringLock::new(inner)),
        }
    }

    /// Another handle on the same store and lock.
    pub fn handle(&self) -> Self {
        Self {
            lock: Arc::clone(&self.lock),
        }
    }

    /// Acquire a read lock.
    pub fn read(&self) -> SharedReadGuard<'_, C> {
        self.lock.read()
    }

    /// Acquire the write lock.
    pub fn write(&self) -> SharedWriteGuard<'_, C> {
        self.lock.write()
    }

    /// Lock usage so far.
    pub fn stats(&self) -> LockStats {
        self.lock.counters.snapshot()
    }

    /// Unwrap the store; fails with the view back when other handles or
    /// sub-views are alive.
    pub fn try_into_inner(self) -> std::result::Result<C, Self> {
        match Arc::try_unwrap(self.lock) {
            Ok(lock) => Ok(lock.data.into_inner()),
            Err(lock) => Err(Self { lock }),
        }
    }
}

impl<C: Collection> SharedView<C> {
    /// Number of elements.
    pub fn size(&self) -> usize {
        self.read().size()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether an element equal to `item` is present.
    pub fn contains(&self, item: &C::Item) -> bool {
        self.read().contains(item)
    }

    /// Add `item` under the write lock.
    pub fn add(&self, item: C::Item) -> Result<bool> {
        self.write().add(item)
    }

    /// Remove the first element equal to `item` under the write lock.
    pub fn remove(&self, item: &C::Item) -> Result<bool> {
        self.write().remove(item)
    }

    /// Remove every element under the write lock.
    pub fn clear(&self) -> Result<()> {
        self.write().clear()
    }

    /// Copy of the elements, taken under a read lock.
    pub fn to_vec(&self) -> Vec<C::Item>
    where
        C::Item: Clone,
    {
        self.read().to_vec()
    }

    /// Split into at most `n` sub-views over consecutive positions; each
    /// reads through this view's lock.
    pub fn split(&self, n: usize) -> Vec<SharedSplit<C>> {
        let ranges: Vec<Range<usize>> =
            self.read().try_split(n).iter().map(Split::range).collect();
        ranges
            .into_iter()
            .map(|range| SharedSplit {
                lock: Arc::clone(&self.lock),
                range,
            })
            .collect()
    }
}

impl<C: Clone> Clone for SharedView<C> {
    fn clone(&self) -> Self {
        let copy = self.lock.read().clone();
        Self::new(copy)
    }
}

impl<C: fmt::Debug> fmt::Debug for SharedView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedView")
            .field("inner", &*self.lock.read())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<C> Collection for SharedView<C>
where
    C: Collection,
    C::Item: Clone,
{
    type Item = C::Item;
    type Ref<'a> = Owned<C::Item> where Self: 'a;

    fn size(&self) -> usize {
        SharedView::size(self)
    }

    fn iter(&self) -> StoreIter<'_, Owned<C::Item>> {
        Box::new(SharedView::to_vec(self).into_iter().map(Owned))
    }

    fn iter_rev(&self) -> StoreIter<'_, Owned<C::Item>> {
        Box::new(SharedView::to_vec(self).into_iter().rev().map(Owned))
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        SharedView::add(self, item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        self.write().remove_nth(position)
    }

    fn clear(&mut self) -> Result<()> {
        SharedView::clear(self)
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.read().equality()
    }

    fn get_nth(&self, position: usize) -> Option<Owned<C::Item>> {
        self.read().get_nth(position).map(|item| Owned((*item).clone()))
    }

    fn contains(&self, item: &C::Item) -> bool {
        SharedView::contains(self, item)
    }
}

/// Consecutive positions of a [`SharedView`], read through its lock.
pub struct SharedSplit<C> {
    lock: Arc<WriterPreferringLock<C>>,
    range: Range<usize>,
}

impl<C: Collection> SharedSplit<C> {
    /// Positions covered.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Calls `f` on each element under one read lock.
    pub fn for_each<F: FnMut(&C::Item)>(&self, mut f: F) {
        let store = self.lock.read();
        for item in store.iter_range(self.range.clone()) {
            f(&item);
        }
    }

    /// Copy of the elements, taken under a read lock.
    pub fn to_vec(&self) -> Vec<C::Item>
    where
        C::Item: Clone,
    {
        let mut items = Vec::with_capacity(self.range.len());
        self.for_each(|item| items.push(item.clone()));
        items
    }
}

impl<C> fmt::Debug for SharedSplit<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSplit")
            .field("range", &self.range)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::FastTable;
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_counts_and_exclusivity() {
        let view = (0..10).collect::<FastTable<u32>>().shared();
        {
            let a = view.read();
            let b = view.read();
            assert_eq!(a.len() + b.len(), 20);
            assert_eq!(view.stats().current_readers, 2);
        }
        view.add(10).unwrap();
        let stats = view.stats();
        assert_eq!(stats.current_readers, 0);
        assert_eq!(stats.max_readers, 2);
        assert_eq!(stats.max_writers, 1);
        assert_eq!(stats.write_acquisitions, 1);
        assert_eq!(view.size(), 11);
    }

    #[test]
    fn test_waiting_writer_blocks_new_readers() {
        let view = FastTable::<u32>::new().shared();
        let barrier = Barrier::new(2);
        let first_read = view.read();
        crossbeam_utils::thread::scope(|s| {
            s.spawn(|_| {
                barrier.wait();
                view.add(1).unwrap();
            });
            barrier.wait();
            while *view.lock.waiting_writers.lock() == 0 {
                std::thread::yield_now();
            }
            s.spawn(|_| {
                // Admitted only after the writer.
                assert!(view.contains(&1));
            });
            std::thread::sleep(Duration::from_millis(20));
            drop(first_read);
        })
        .unwrap();
        assert_eq!(view.stats().writer_waits, 1);
        assert_eq!(view.stats().max_writers, 1);
    }

    #[test]
    fn test_split_shares_the_lock() {
        let view = (0..9).collect::<FastTable<u32>>().shared();
        let parts = view.split(3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].to_vec(), vec![3, 4, 5]);
        view.clear().unwrap();
        let mut seen = 0;
        parts[2].for_each(|_| seen += 1);
        assert_eq!(seen, 0);
        assert!(view.try_into_inner().is_err());
    }

    #[test]
    fn test_handles_and_clones() {
        let view = FastTable::<u32>::new().shared();
        let other = view.handle();
        other.add(5).unwrap();
        assert!(view.contains(&5));
        let copy = view.clone();
        copy.add(6).unwrap();
        assert_eq!(view.size(), 1);
        drop(other);
        assert_eq!(view.try_into_inner().unwrap().to_vec(), vec![5]);
        assert_eq!(Collection::iter(&copy).map(Owned::into_inner).collect::<Vec<_>>(), vec![5, 6]);
    }
}
