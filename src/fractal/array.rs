use crate::memory::{Heap, NodeAllocator};
use std::fmt;
use std::mem;

/// Bits of index resolved per level.
pub const SHIFT: u32 = 8;

/// Maximum number of slots of one level.
pub const MAX_SLOTS: usize = 1 << SHIFT;

/// Capacity of a freshly created array.
pub const MIN_CAPACITY: usize = 16;

/// One slot of a level: an element at the leaf level, a child above it.
#[derive(Clone)]
enum Slot<T> {
    Empty,
    Leaf(T),
    Branch(Box<FractalArray<T>>),
}

impl<T> Slot<T> {
    #[inline]
    fn from_value(value: Option<T>) -> Self {
        value.map_or(Slot::Empty, Slot::Leaf)
    }

    #[inline]
    fn into_value(self) -> Option<T> {
        match self {
            Slot::Leaf(value) => Some(value),
            _ => None,
        }
    }
}

/// Recursive, offset-addressed array.
///
/// Positions are circular: every index is taken modulo [`capacity`](Self::capacity).
/// Positions never written (or taken back) read as `None`. Children are
/// allocated lazily, so a large mostly-empty array costs only the levels
/// actually touched.
///
/// # Examples
///
/// ```rust
/// use fractal_collections::fractal::FractalArray;
///
/// let mut array = FractalArray::new();
/// array.set(0, 'a');
/// array.set(1, 'c');
/// // Insert 'b' at 1 by shifting [1, 2[ one position to the right.
/// array.shift_right(Some('b'), 1, 1);
/// assert_eq!(array.get(1), Some(&'b'));
/// assert_eq!(array.get(2), Some(&'c'));
///
/// // Rotation only moves the offset.
/// array.rotate_right(1);
/// assert_eq!(array.get(1), Some(&'a'));
/// ```
#[derive(Clone)]
pub struct FractalArray<T> {
    /// Zero at the leaf level; each child covers `1 << shift` positions.
    shift: u32,
    /// Physical position of logical index 0, always in `[0, capacity)`.
    offset: usize,
    data: Box<[Slot<T>]>,
}

impl<T> Default for FractalArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FractalArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FractalArray")
            .field("shift", &self.shift)
            .field("offset", &self.offset)
            .field("slots", &self.data.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<T> FractalArray<T> {
    /// Empty leaf array of [`MIN_CAPACITY`] positions.
    pub fn new() -> Self {
        Self::empty_node(0, MIN_CAPACITY)
    }

    /// Empty array with at least `capacity` positions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, &Heap)
    }

    /// Empty array with at least `capacity` positions, levels taken from `alloc`.
    pub fn with_capacity_in<A: NodeAllocator<T> + ?Sized>(capacity: usize, alloc: &A) -> Self {
        let mut array = Self::new();
        while array.capacity() < capacity {
            array.grow_in(alloc);
        }
        array
    }

    pub(crate) fn empty_node(shift: u32, slots: usize) -> Self {
        Self {
            shift,
            offset: 0,
            data: (0..slots).map(|_| Slot::Empty).collect(),
        }
    }

    /// Clears every slot and re-targets the node at `shift`.
    pub(crate) fn reset(&mut self, shift: u32) {
        for slot in self.data.iter_mut() {
            *slot = Slot::Empty;
        }
        self.shift = shift;
        self.offset = 0;
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.data.len()
    }

    /// Number of addressable positions.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len() << self.shift
    }

    /// Number of levels below this one.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.shift / SHIFT
    }

    /// Physical position of logical index 0.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    #[inline]
    fn position(&self, index: usize) -> usize {
        index.wrapping_add(self.offset) & self.mask()
    }

    /// Element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        let pos = self.position(index);
        match &self.data[pos >> self.shift] {
            Slot::Leaf(value) => Some(value),
            Slot::Branch(child) => child.get(pos),
            Slot::Empty => None,
        }
    }

    /// Mutable element at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let pos = self.position(index);
        match &mut self.data[pos >> self.shift] {
            Slot::Leaf(value) => Some(value),
            Slot::Branch(child) => child.get_mut(pos),
            Slot::Empty => None,
        }
    }

    /// Stores `value` at `index`, returning the previous element.
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        self.replace_in(index, Some(value), &Heap)
    }

    /// Empties `index`, returning the element it held.
    pub fn take(&mut self, index: usize) -> Option<T> {
        self.replace_in(index, None, &Heap)
    }

    /// Replaces the content of `index`, allocating missing levels from `alloc`.
    pub fn replace_in<A: NodeAllocator<T> + ?Sized>(
        &mut self,
        index: usize,
        value: Option<T>,
        alloc: &A,
    ) -> Option<T> {
        let pos = self.position(index);
        let i = pos >> self.shift;
        if self.shift == 0 {
            return Self::swap_leaf(&mut self.data[i], value);
        }
        if value.is_none() && matches!(self.data[i], Slot::Empty) {
            return None;
        }
        Self::branch_mut(&mut self.data[i], self.shift, alloc).replace_in(pos, value, alloc)
    }

    /// Rotates the array so that logical index `n` becomes index 0.
    #[inline]
    pub fn rotate_left(&mut self, n: usize) {
        self.offset = self.offset.wrapping_add(n) & self.mask();
    }

    /// Rotates the array so that logical index 0 becomes index `n`.
    #[inline]
    pub fn rotate_right(&mut self, n: usize) {
        self.offset = self.offset.wrapping_sub(n) & self.mask();
    }

    /// Shifts `[first, first + length[` one position to the right and stores
    /// `inserted` at `first`.
    ///
    /// Returns the element pushed out of `first + length`. `length` must be
    /// smaller than the capacity.
    pub fn shift_right(&mut self, inserted: Option<T>, first: usize, length: usize) -> Option<T> {
        self.shift_right_in(inserted, first, length, &Heap)
    }

    /// [`shift_right`](Self::shift_right) allocating missing levels from `alloc`.
    pub fn shift_right_in<A: NodeAllocator<T> + ?Sized>(
        &mut self,
        inserted: Option<T>,
        first: usize,
        length: usize,
        alloc: &A,
    ) -> Option<T> {
        debug_assert!(length < self.capacity());
        let mask = self.mask();
        let mut pos = self.position(first);
        let mut carry = inserted;
        if self.shift == 0 {
            for _ in 0..=length {
                carry = Self::swap_leaf(&mut self.data[pos], carry);
                pos = (pos + 1) & mask;
            }
            return carry;
        }
        let span = 1usize << self.shift;
        let mut remaining = length + 1;
        while remaining > 0 {
            let local = pos & (span - 1);
            let count = remaining.min(span - local);
            carry = self.shift_child_right(pos >> self.shift, carry, local, count, alloc);
            pos = (pos + count) & mask;
            remaining -= count;
        }
        carry
    }

    /// Shifts `]last - length, last]` one position to the left and stores
    /// `inserted` at `last`.
    ///
    /// Returns the element pushed out of `last - length`. `length` must be
    /// smaller than the capacity.
    pub fn shift_left(&mut self, inserted: Option<T>, last: usize, length: usize) -> Option<T> {
        self.shift_left_in(inserted, last, length, &Heap)
    }

    /// [`shift_left`](Self::shift_left) allocating missing levels from `alloc`.
    pub fn shift_left_in<A: NodeAllocator<T> + ?Sized>(
        &mut self,
        inserted: Option<T>,
        last: usize,
        length: usize,
        alloc: &A,
    ) -> Option<T> {
        debug_assert!(length < self.capacity());
        let mask = self.mask();
        let mut pos = self.position(last);
        let mut carry = inserted;
        if self.shift == 0 {
            for _ in 0..=length {
                carry = Self::swap_leaf(&mut self.data[pos], carry);
                pos = pos.wrapping_sub(1) & mask;
            }
            return carry;
        }
        let span = 1usize << self.shift;
        let mut remaining = length + 1;
        while remaining > 0 {
            let local = pos & (span - 1);
            let count = remaining.min(local + 1);
            carry = self.shift_child_left(pos >> self.shift, carry, local, count, alloc);
            pos = pos.wrapping_sub(count) & mask;
            remaining -= count;
        }
        carry
    }

    /// Shifts `count` positions of child `i` from `local` one step right; a
    /// whole child is rotated instead.
    fn shift_child_right<A: NodeAllocator<T> + ?Sized>(
        &mut self,
        i: usize,
        carry: Option<T>,
        local: usize,
        count: usize,
        alloc: &A,
    ) -> Option<T> {
        if carry.is_none() && matches!(self.data[i], Slot::Empty) {
            return None;
        }
        let span = 1usize << self.shift;
        let child = Self::branch_mut(&mut self.data[i], self.shift, alloc);
        if count == span {
            child.rotate_right(1);
            child.replace_in(0, carry, alloc)
        } else {
            child.shift_right_in(carry, local, count - 1, alloc)
        }
    }

    fn shift_child_left<A: NodeAllocator<T> + ?Sized>(
        &mut self,
        i: usize,
        carry: Option<T>,
        local: usize,
        count: usize,
        alloc: &A,
    ) -> Option<T> {
        if carry.is_none() && matches!(self.data[i], Slot::Empty) {
            return None;
        }
        let span = 1usize << self.shift;
        let child = Self::branch_mut(&mut self.data[i], self.shift, alloc);
        if count == span {
            child.rotate_left(1);
            child.replace_in(span - 1, carry, alloc)
        } else {
            child.shift_left_in(carry, local, count - 1, alloc)
        }
    }

    /// Doubles the capacity, preserving every logical index.
    pub fn grow(&mut self) {
        self.grow_in(&Heap)
    }

    /// [`grow`](Self::grow) taking new levels from `alloc`.
    pub fn grow_in<A: NodeAllocator<T> + ?Sized>(&mut self, alloc: &A) {
        let slots = self.data.len();
        let offset = self.offset;

        if slots >= MAX_SLOTS {
            // Full radix: this array becomes the first child of a new level and
            // the wrapped-around part [0, offset[ moves to the second child.
            let parent_shift = self.shift + SHIFT;
            let mut lower = mem::replace(self, Self::empty_node(parent_shift, 2));
            lower.offset = 0;
            let upper = lower.split_range(0, offset, alloc);
            self.offset = offset;
            self.data[0] = Slot::Branch(Box::new(lower));
            self.data[1] = Slot::Branch(Box::new(upper));
            log::debug!(
                "fractal array gained a level: depth {}, capacity {}",
                self.depth(),
                self.capacity()
            );
            return;
        }

        let first = offset >> self.shift;
        let within = offset & ((1usize << self.shift) - 1);
        let mut data = mem::take(&mut self.data).into_vec();
        data.resize_with(slots * 2, || Slot::Empty);
        for k in 0..first {
            data.swap(k, slots + k);
        }
        if within != 0 {
            let wrapped = match &mut data[first] {
                Slot::Branch(child) => Some(child.split_range(0, within, alloc)),
                _ => None,
            };
            if let Some(wrapped) = wrapped {
                data[slots + first] = Slot::Branch(Box::new(wrapped));
            }
        }
        self.data = data.into_boxed_slice();
    }

    /// Rebuilds a compact array holding the `live` elements at `[0, live[`.
    ///
    /// No-op unless the compact capacity is smaller than the current one.
    pub fn shrink(&mut self, live: usize) {
        self.shrink_in(live, &Heap)
    }

    /// [`shrink`](Self::shrink) returning discarded levels to `alloc`.
    pub fn shrink_in<A: NodeAllocator<T> + ?Sized>(&mut self, live: usize, alloc: &A) {
        let target = live.saturating_mul(2).next_power_of_two().max(MIN_CAPACITY);
        if target >= self.capacity() {
            return;
        }
        let mut compact = Self::with_capacity_in(target, alloc);
        for index in 0..live {
            if let Some(value) = self.replace_in(index, None, alloc) {
                compact.replace_in(index, Some(value), alloc);
            }
        }
        log::trace!(
            "fractal array shrunk from {} to {} positions",
            self.capacity(),
            compact.capacity()
        );
        mem::replace(self, compact).recycle_into(alloc);
    }

    /// Drops every element and returns to the initial capacity.
    pub fn clear_in<A: NodeAllocator<T> + ?Sized>(&mut self, alloc: &A) {
        mem::replace(self, Self::new()).recycle_into(alloc);
    }

    /// Hands every level of this array back to `alloc`, children first.
    pub(crate) fn recycle_into<A: NodeAllocator<T> + ?Sized>(mut self, alloc: &A) {
        for slot in self.data.iter_mut() {
            if let Slot::Branch(child) = mem::replace(slot, Slot::Empty) {
                (*child).recycle_into(alloc);
            }
        }
        alloc.recycle(self);
    }

    /// Moves `[first, first + count[` into a new array of the same shape,
    /// leaving those positions empty here.
    fn split_range<A: NodeAllocator<T> + ?Sized>(
        &mut self,
        first: usize,
        count: usize,
        alloc: &A,
    ) -> Self {
        let mut part = alloc.allocate(self.shift, self.data.len());
        part.offset = self.offset;
        let mask = self.mask();
        let mut pos = self.position(first);
        let mut remaining = count;
        if self.shift == 0 {
            while remaining > 0 {
                part.data[pos] = mem::replace(&mut self.data[pos], Slot::Empty);
                pos = (pos + 1) & mask;
                remaining -= 1;
            }
            return part;
        }
        let span = 1usize << self.shift;
        while remaining > 0 {
            let i = pos >> self.shift;
            let local = pos & (span - 1);
            let count = remaining.min(span - local);
            if count == span {
                part.data[i] = mem::replace(&mut self.data[i], Slot::Empty);
            } else if let Slot::Branch(child) = &mut self.data[i] {
                part.data[i] = Slot::Branch(Box::new(child.split_range(local, count, alloc)));
            }
            pos = (pos + count) & mask;
            remaining -= count;
        }
        part
    }

    #[inline]
    fn swap_leaf(slot: &mut Slot<T>, value: Option<T>) -> Option<T> {
        mem::replace(slot, Slot::from_value(value)).into_value()
    }

    /// Child array of a slot above the leaf level, allocated on first use.
    fn branch_mut<'a, A: NodeAllocator<T> + ?Sized>(
        slot: &'a mut Slot<T>,
        shift: u32,
        alloc: &A,
    ) -> &'a mut FractalArray<T> {
        if let Slot::Empty = slot {
            *slot = Slot::Branch(Box::new(alloc.allocate(shift - SHIFT, MAX_SLOTS)));
        }
        match slot {
            Slot::Branch(child) => &mut **child,
            Slot::Leaf(_) | Slot::Empty => unreachable!("element slot above the leaf level"),
        }
    }
}
