use super::Collection;
use crate::error::{CollectionError, Result};

/// Mutable iteration over a store.
///
/// [`Cursor::remove`] removes the element last returned by
/// [`Cursor::next`]; calling it twice, or before the first `next`, fails
/// with an illegal-state error.
///
/// ```rust
/// use fractal_collections::{Collection, FastTable};
///
/// # fn main() -> fractal_collections::Result<()> {
/// let mut table: FastTable<i32> = (1..=6).collect();
/// let mut cursor = table.cursor();
/// while let Some(value) = cursor.next().map(|v| *v) {
///     if value % 3 == 0 {
///         cursor.remove()?;
///     }
/// }
/// assert_eq!(table.to_vec(), vec![1, 2, 4, 5]);
/// # Ok(())
/// # }
/// ```
pub struct Cursor<'a, C: Collection> {
    store: &'a mut C,
    next: usize,
    current: Option<usize>,
}

impl<'a, C: Collection> Cursor<'a, C> {
    pub(crate) fn new(store: &'a mut C) -> Self {
        Self {
            store,
            next: 0,
            current: None,
        }
    }

    /// Advances to the next element.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<C::Ref<'_>> {
        let position = self.next;
        if position >= self.store.size() {
            self.current = None;
            return None;
        }
        self.current = Some(position);
        self.next = position + 1;
        self.store.get_nth(position)
    }

    /// Removes the element last returned by [`Cursor::next`].
    pub fn remove(&mut self) -> Result<C::Item> {
        let position = self
            .current
            .take()
            .ok_or_else(|| CollectionError::illegal_state("no current element to remove"))?;
        let removed = self.store.remove_nth(position)?;
        self.next = position;
        Ok(removed)
    }

    /// Whether another element follows.
    pub fn has_next(&self) -> bool {
        self.next < self.store.size()
    }
}
