use super::{Collection, StoreIter, Table};
use crate::error::{check_bounds, CollectionError, Result};
use crate::order::SharedEquality;
use std::fmt;
use std::ops::Range;

/// Mutable window over consecutive positions of a table.
///
/// Position `i` of the window is position `start + i` of the parent. Writes
/// go straight to the parent; the window grows and shrinks with its own
/// insertions and removals, so clearing a window removes that range from the
/// parent:
///
/// ```rust
/// use fractal_collections::{Collection, FastTable, Table};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut names: FastTable<&str> = vec!["ann", "bob", "cy", "dee"].into_iter().collect();
/// names.sub_table(0..2)?.clear()?;
/// assert_eq!(names.to_vec(), vec!["cy", "dee"]);
/// # Ok(())
/// # }
/// ```
pub struct SubTable<'a, T> {
    table: &'a mut T,
    start: usize,
    end: usize,
}

impl<'a, T: Table> SubTable<'a, T> {
    pub(crate) fn new(table: &'a mut T, range: Range<usize>) -> Self {
        Self {
            table,
            start: range.start,
            end: range.end,
        }
    }

    /// Parent positions covered.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The parent table.
    pub fn table(&self) -> &T {
        self.table
    }
}

impl<'a, T: Table> Collection for SubTable<'a, T> {
    type Item = T::Item;
    type Ref<'b> = T::Ref<'b> where Self: 'b;

    fn size(&self) -> usize {
        self.end - self.start
    }

    fn iter(&self) -> StoreIter<'_, T::Ref<'_>> {
        self.table.iter_range(self.start..self.end)
    }

    fn iter_rev(&self) -> StoreIter<'_, T::Ref<'_>> {
        let skip = self.table.size() - self.end;
        Box::new(self.table.iter_rev().skip(skip).take(self.size()))
    }

    /// Appends at the end of the window.
    fn add(&mut self, item: T::Item) -> Result<bool> {
        self.table.insert(self.end, item)?;
        self.end += 1;
        Ok(true)
    }

    fn remove_nth(&mut self, position: usize) -> Result<T::Item> {
        check_bounds(position, self.size())?;
        let removed = self.table.remove_at(self.start + position)?;
        self.end -= 1;
        Ok(removed)
    }

    fn clear(&mut self) -> Result<()> {
        while self.end > self.start {
            self.table.remove_at(self.end - 1)?;
            self.end -= 1;
        }
        Ok(())
    }

    fn equality(&self) -> SharedEquality<T::Item> {
        self.table.equality()
    }

    fn get_nth(&self, position: usize) -> Option<T::Ref<'_>> {
        if position < self.size() {
            self.table.get(self.start + position).ok()
        } else {
            None
        }
    }
}

impl<'a, T: Table> Table for SubTable<'a, T> {
    fn get(&self, index: usize) -> Result<T::Ref<'_>> {
        check_bounds(index, self.size())?;
        self.table.get(self.start + index)
    }

    fn set(&mut self, index: usize, item: T::Item) -> Result<T::Item> {
        check_bounds(index, self.size())?;
        self.table.set(self.start + index, item)
    }

    fn insert(&mut self, index: usize, item: T::Item) -> Result<()> {
        let size = self.size();
        if index > size {
            return Err(CollectionError::out_of_bounds(index, size));
        }
        self.table.insert(self.start + index, item)?;
        self.end += 1;
        Ok(())
    }
}

impl<T> fmt::Debug for SubTable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubTable")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}
