//! Fork-join bulk operations

use super::context::{ConcurrentContext, Task};
use crate::error::Result;
use crate::order::SharedEquality;
use crate::store::{Collection, Split, StoreIter};
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs bulk operations fork-join over disjoint sub-views.
///
/// `for_each`, `reduce`, `remove_if` and `until` split the store into one
/// part per worker plus one for the calling thread, run the parts on a
/// [`ConcurrentContext`] and join before returning. Stores smaller than the
/// context's `min_split_size` are processed on the caller in one part. Every
/// other operation forwards to the inner store.
///
/// ```rust
/// use fractal_collections::{Collection, FastTable};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut view = (1..=100).collect::<FastTable<u32>>().parallel().with_split_factor(4);
/// assert_eq!(view.remove_if(|n| n % 2 == 0)?, 50);
/// assert_eq!(view.size(), 50);
/// assert_eq!(view.reduce(|a, b| a + b)?, Some(2500));
/// # Ok(())
/// # }
/// ```
pub struct ParallelView<C> {
    inner: C,
    context: Arc<ConcurrentContext>,
    split_factor: Option<usize>,
}

impl<C> ParallelView<C> {
    /// Wrap `inner` on the process-wide context.
    pub fn new(inner: C) -> Self {
        Self::with_context(inner, ConcurrentContext::global())
    }

    /// Wrap `inner` on `context`.
    pub fn with_context(inner: C, context: Arc<ConcurrentContext>) -> Self {
        Self {
            inner,
            context,
            split_factor: None,
        }
    }

    /// Always split into `parts` sub-views, whatever the context's worker
    /// count and split threshold.
    pub fn with_split_factor(mut self, parts: usize) -> Self {
        self.split_factor = Some(parts.max(1));
        self
    }

    /// Context the bulk operations run on.
    pub fn context(&self) -> &Arc<ConcurrentContext> {
        &self.context
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

impl<C> ParallelView<C>
where
    C: Collection + Sync,
{
    fn parts(&self) -> usize {
        if let Some(parts) = self.split_factor {
            return parts;
        }
        if self.inner.size() < self.context.config().min_split_size {
            1
        } else {
            self.context.concurrency() + 1
        }
    }

    fn fork<'s, R, F>(&'s self, work: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(Split<'s, C>) -> Result<R> + Sync,
    {
        let splits = self.inner.try_split(self.parts());
        let work = &work;
        let tasks: Vec<Task<'_, R>> = splits
            .into_iter()
            .map(|split| Box::new(move || work(split)) as Task<'_, R>)
            .collect();
        self.context.execute_all(tasks)
    }

    /// Calls `f` on every element; the call order across parts is
    /// unspecified.
    pub fn for_each<F>(&self, f: F) -> Result<()>
    where
        F: Fn(&C::Item) + Sync,
    {
        self.fork(|split| {
            for item in split.iter() {
                f(&item);
            }
            Ok(())
        })
        .map(|_| ())
    }

    /// Reduces each part with `op`, then combines the partial results in
    /// part order. Matches a sequential reduction when `op` is associative.
    pub fn reduce<F>(&self, op: F) -> Result<Option<C::Item>>
    where
        C::Item: Clone + Send,
        F: Fn(C::Item, C::Item) -> C::Item + Sync,
    {
        let partials = self.fork(|split| {
            let mut items = split.iter();
            Ok(items
                .next()
                .map(|first| items.fold((*first).clone(), |acc, item| op(acc, (*item).clone()))))
        })?;
        Ok(partials.into_iter().flatten().reduce(|acc, item| op(acc, item)))
    }

    /// Whether any element matches `predicate`.
    ///
    /// Parts share one flag: once a part finds a match, the others stop at
    /// their next element. Which matching element was seen first is not
    /// defined.
    pub fn until<P>(&self, predicate: P) -> Result<bool>
    where
        P: Fn(&C::Item) -> bool + Sync,
    {
        let found = AtomicBool::new(false);
        self.fork(|split| {
            for item in split.iter() {
                if found.load(Ordering::Acquire) {
                    break;
                }
                if predicate(&item) {
                    found.store(true, Ordering::Release);
                    break;
                }
            }
            Ok(())
        })?;
        Ok(found.load(Ordering::Acquire))
    }

    /// Removes every element matching `predicate`, returning how many.
    ///
    /// Parts only mark matching positions; removal happens afterwards on the
    /// calling thread. A failing part leaves the store untouched.
    pub fn remove_if<P>(&mut self, predicate: P) -> Result<usize>
    where
        P: Fn(&C::Item) -> bool + Sync,
    {
        let marked = Mutex::new(Vec::new());
        self.fork(|split| {
            let start = split.range().start;
            let hits: Vec<usize> = split
                .iter()
                .enumerate()
                .filter(|(_, item)| predicate(item))
                .map(|(offset, _)| start + offset)
                .collect();
            marked.lock().extend(hits);
            Ok(())
        })?;

        let mut positions = marked.into_inner();
        positions.sort_unstable();
        log::debug!("removing {} marked elements", positions.len());
        for &position in positions.iter().rev() {
            self.inner.remove_nth(position)?;
        }
        Ok(positions.len())
    }
}

impl<C> Collection for ParallelView<C>
where
    C: Collection,
{
    type Item = C::Item;
    type Ref<'a> = C::Ref<'a> where Self: 'a;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn iter(&self) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter()
    }

    fn iter_rev(&self) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter_rev()
    }

    fn iter_range(&self, range: Range<usize>) -> StoreIter<'_, C::Ref<'_>> {
        self.inner.iter_range(range)
    }

    fn add(&mut self, item: C::Item) -> Result<bool> {
        self.inner.add(item)
    }

    fn remove_nth(&mut self, position: usize) -> Result<C::Item> {
        self.inner.remove_nth(position)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()
    }

    fn equality(&self) -> SharedEquality<C::Item> {
        self.inner.equality()
    }

    fn get_nth(&self, position: usize) -> Option<C::Ref<'_>> {
        self.inner.get_nth(position)
    }

    fn contains(&self, item: &C::Item) -> bool {
        self.inner.contains(item)
    }
}
