//! Node allocation for fractal arrays
//!
//! Fractal arrays allocate child levels lazily and discard them when they
//! shrink. A [`NodeAllocator`] decides where those levels come from and where
//! they go: [`Heap`] allocates and drops, [`NodePool`] keeps a bounded free
//! list of emptied levels for reuse. Collections behave identically with
//! either; only allocation traffic differs.

mod pool;

pub use pool::{NodePool, NodePoolStats};

use crate::fractal::FractalArray;

/// Source and sink of fractal array levels.
pub trait NodeAllocator<T>: Send + Sync {
    /// An empty level with `slots` slots at `shift`.
    fn allocate(&self, shift: u32, slots: usize) -> FractalArray<T>;

    /// Takes back a level that no longer holds any child or element.
    fn recycle(&self, node: FractalArray<T>);
}

/// Plain heap allocation; recycled levels are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heap;

impl<T> NodeAllocator<T> for Heap {
    #[inline]
    fn allocate(&self, shift: u32, slots: usize) -> FractalArray<T> {
        FractalArray::empty_node(shift, slots)
    }

    #[inline]
    fn recycle(&self, _node: FractalArray<T>) {}
}
