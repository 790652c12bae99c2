//! The store capability shared by every collection and view
//!
//! [`Collection`] is the minimal contract: size, ordered iteration (forward,
//! backward, from a position), `add`, positional removal, `clear` and the
//! equality policy. Everything else (containment, removal by value,
//! conditional removal, reduction, splitting, the view combinators) is
//! derived from it generically, so a view only implements what it changes.
//!
//! [`Table`] adds positional access and [`Map`] adds keyed access to entries.
//!
//! Views own the store they wrap and are built by consuming it:
//!
//! ```rust
//! use fractal_collections::{Collection, FastTable};
//!
//! # fn main() -> fractal_collections::Result<()> {
//! let mut evens = FastTable::new().filter(|x: &i32| x % 2 == 0);
//! assert!(evens.add(4)?);
//! assert!(!evens.add(3)?);
//! assert_eq!(evens.inner().len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::concurrency::{AtomicView, ParallelView, SharedView};
use crate::error::{check_range, CollectionError, Result};
use crate::order::{SharedEquality, SharedOrder};
use crate::sparse::Entry;
use crate::view::{
    CustomEquality, Distinct, Filtered, Linked, Mapped, Reversed, Sorted, Unmodifiable,
};
use std::ops::{Deref, Range};

pub mod algorithms;
mod cursor;
pub mod reducers;
mod split;
mod sub_table;

pub use cursor::Cursor;
pub use split::Split;
pub use sub_table::SubTable;

/// Boxed iterator returned by stores and views.
pub type StoreIter<'a, R> = Box<dyn Iterator<Item = R> + 'a>;

/// An element produced by value where a store cannot lend a reference
/// (projections, snapshots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Owned<T>(pub T);

impl<T> Owned<T> {
    /// Unwrap the element.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Owned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

/// Minimal store contract.
pub trait Collection {
    /// Element type.
    type Item;

    /// What iteration yields: `&Item` for stores that hold their elements,
    /// [`Owned<Item>`] for stores that compute or copy them.
    type Ref<'a>: Deref<Target = Self::Item>
    where
        Self: 'a;

    /// Number of elements.
    fn size(&self) -> usize;

    /// Elements in iteration order.
    fn iter(&self) -> StoreIter<'_, Self::Ref<'_>>;

    /// Elements in reverse iteration order.
    fn iter_rev(&self) -> StoreIter<'_, Self::Ref<'_>>;

    /// Adds `item`; `Ok(false)` when the store declined it.
    fn add(&mut self, item: Self::Item) -> Result<bool>;

    /// Removes the element at `position` in iteration order.
    fn remove_nth(&mut self, position: usize) -> Result<Self::Item>;

    /// Removes every element.
    fn clear(&mut self) -> Result<()>;

    /// Equality used by `contains`, `remove` and `iter_from`.
    fn equality(&self) -> SharedEquality<Self::Item>;

    /// Whether the store holds no element.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Elements at iteration positions `range`.
    fn iter_range(&self, range: Range<usize>) -> StoreIter<'_, Self::Ref<'_>> {
        let count = range.end.saturating_sub(range.start);
        Box::new(self.iter().skip(range.start).take(count))
    }

    /// Iteration starting at the first element equal to `item`.
    fn iter_from(&self, item: &Self::Item) -> Result<StoreIter<'_, Self::Ref<'_>>> {
        let start = algorithms::position(self, item)
            .ok_or_else(|| CollectionError::illegal_argument("start element not found"))?;
        Ok(self.iter_range(start..self.size()))
    }

    /// Element at iteration `position`.
    fn get_nth(&self, position: usize) -> Option<Self::Ref<'_>> {
        self.iter().nth(position)
    }

    /// Whether an element equal to `item` is present.
    fn contains(&self, item: &Self::Item) -> bool {
        algorithms::position(self, item).is_some()
    }

    /// Removes the first element equal to `item`.
    fn remove(&mut self, item: &Self::Item) -> Result<bool> {
        match algorithms::position(self, item) {
            Some(position) => self.remove_nth(position).map(|_| true),
            None => Ok(false),
        }
    }

    /// Removes every element matching `predicate`, returning how many.
    fn remove_if<P>(&mut self, mut predicate: P) -> Result<usize>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        let matches: Vec<usize> = self
            .iter()
            .enumerate()
            .filter(|(_, item)| predicate(item))
            .map(|(position, _)| position)
            .collect();
        for &position in matches.iter().rev() {
            self.remove_nth(position)?;
        }
        Ok(matches.len())
    }

    /// Calls `f` on every element in iteration order.
    fn for_each<F>(&self, mut f: F)
    where
        Self: Sized,
        F: FnMut(&Self::Item),
    {
        for item in self.iter() {
            f(&item);
        }
    }

    /// Folds the elements with `op`; `None` when empty.
    fn reduce<F>(&self, mut op: F) -> Option<Self::Item>
    where
        Self: Sized,
        Self::Item: Clone,
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        let mut items = self.iter();
        let first = (*items.next()?).clone();
        Some(items.fold(first, |acc, item| op(acc, (*item).clone())))
    }

    /// Whether any element matches `predicate`; stops at the first match.
    fn until<P>(&self, mut predicate: P) -> bool
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        self.iter().any(|item| predicate(&item))
    }

    /// Splits the store into at most `n` disjoint consecutive sub-views.
    fn try_split(&self, n: usize) -> Vec<Split<'_, Self>>
    where
        Self: Sized,
    {
        algorithms::split(self, n)
    }

    /// Mutable cursor supporting removal of the current element.
    fn cursor(&mut self) -> Cursor<'_, Self>
    where
        Self: Sized,
    {
        Cursor::new(self)
    }

    /// Copies the elements into a `Vec` in iteration order.
    fn to_vec(&self) -> Vec<Self::Item>
    where
        Self::Item: Clone,
    {
        self.iter().map(|item| (*item).clone()).collect()
    }

    /// View accepting and showing only elements matching `predicate`.
    fn filter<P>(self, predicate: P) -> Filtered<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Item) -> bool,
    {
        Filtered::new(self, predicate)
    }

    /// Read-only projection of every element through `transform`.
    fn map<U, F>(self, transform: F) -> Mapped<Self, F, U>
    where
        Self: Sized,
        U: PartialEq,
        F: Fn(&Self::Item) -> U,
    {
        Mapped::new(self, transform)
    }

    /// View iterating in insertion order.
    fn linked(self) -> Linked<Self>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        Linked::new(self)
    }

    /// View holding each element at most once.
    fn distinct(self) -> Distinct<Self>
    where
        Self: Sized,
    {
        Distinct::new(self)
    }

    /// View iterating last to first.
    fn reversed(self) -> Reversed<Self>
    where
        Self: Sized,
    {
        Reversed::new(self)
    }

    /// View rejecting every mutation.
    fn unmodifiable(self) -> Unmodifiable<Self>
    where
        Self: Sized,
    {
        Unmodifiable::new(self)
    }

    /// View using `equality` instead of the store's own.
    fn with_equality(self, equality: SharedEquality<Self::Item>) -> CustomEquality<Self>
    where
        Self: Sized,
    {
        CustomEquality::new(self, equality)
    }

    /// Copy-on-write view: readers see immutable snapshots.
    fn atomic(self) -> AtomicView<Self>
    where
        Self: Sized + Clone,
    {
        AtomicView::new(self)
    }

    /// Reader/writer locked view with writer preference.
    fn shared(self) -> SharedView<Self>
    where
        Self: Sized,
    {
        SharedView::new(self)
    }

    /// View running bulk operations fork-join on the default context.
    fn parallel(self) -> ParallelView<Self>
    where
        Self: Sized,
    {
        ParallelView::new(self)
    }
}

/// Positional access on top of [`Collection`]; positions are iteration
/// positions.
pub trait Table: Collection {
    /// Element at `index`.
    fn get(&self, index: usize) -> Result<Self::Ref<'_>>;

    /// Replaces the element at `index`, returning the previous one.
    fn set(&mut self, index: usize, item: Self::Item) -> Result<Self::Item>;

    /// Inserts `item` at `index`, shifting later elements.
    fn insert(&mut self, index: usize, item: Self::Item) -> Result<()>;

    /// Removes the element at `index`.
    fn remove_at(&mut self, index: usize) -> Result<Self::Item> {
        self.remove_nth(index)
    }

    /// Position of the first element equal to `item`.
    fn index_of(&self, item: &Self::Item) -> Option<usize> {
        algorithms::position(self, item)
    }

    /// Position of the last element equal to `item`.
    fn last_index_of(&self, item: &Self::Item) -> Option<usize> {
        algorithms::last_position(self, item)
    }

    /// Sorts in place by `order` (stable).
    fn sort(&mut self, order: &SharedOrder<Self::Item>) -> Result<()>
    where
        Self: Sized,
    {
        algorithms::sort(self, order.as_ref())
    }

    /// View kept sorted by `order`.
    fn sorted(self, order: SharedOrder<Self::Item>) -> Result<Sorted<Self>>
    where
        Self: Sized,
    {
        Sorted::new(self, order)
    }

    /// Mutable window over positions `range`.
    fn sub_table(&mut self, range: Range<usize>) -> Result<SubTable<'_, Self>>
    where
        Self: Sized,
    {
        check_range(range.start, range.end, self.size())?;
        Ok(SubTable::new(self, range))
    }
}

/// Keyed access to a store of [`Entry`] elements.
pub trait Map: Collection {
    /// Key type.
    type Key;
    /// Value type.
    type Value;

    /// Entry stored under a key equal to `key`.
    fn get_entry(&self, key: &Self::Key) -> Option<&Entry<Self::Key, Self::Value>>;

    /// Stores `value` under `key`, returning the value it replaced. An
    /// existing entry is updated in place.
    fn put_entry(&mut self, key: Self::Key, value: Self::Value) -> Result<Option<Self::Value>>;

    /// Removes the entry stored under `key`.
    fn remove_entry(&mut self, key: &Self::Key) -> Result<Option<Entry<Self::Key, Self::Value>>>;

    /// Order of the keys.
    fn key_order(&self) -> SharedOrder<Self::Key>;

    /// Whether an entry exists under `key`.
    fn contains_key(&self, key: &Self::Key) -> bool {
        self.get_entry(key).is_some()
    }

    /// Value stored under `key`.
    fn get_value(&self, key: &Self::Key) -> Option<&Self::Value> {
        self.get_entry(key).map(Entry::value)
    }
}
