//! Free-list pool of fractal array levels.

use super::NodeAllocator;
use crate::config::{Config, PoolConfig};
use crate::error::Result;
use crate::fractal::{FractalArray, MAX_SLOTS};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for node pool usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodePoolStats {
    /// Levels served from the free list
    pub hits: u64,
    /// Levels freshly allocated
    pub misses: u64,
    /// Levels accepted back onto the free list
    pub recycled: u64,
    /// Levels dropped because the free list was full or the shape did not fit
    pub discarded: u64,
    /// Levels currently on the free list
    pub available: usize,
}

/// Bounded free list of emptied child levels.
///
/// Only full-radix levels (the shape of every lazily allocated child) are
/// pooled; other shapes are allocated and dropped normally.
///
/// # Examples
///
/// ```rust
/// use fractal_collections::config::PoolConfig;
/// use fractal_collections::memory::NodePool;
/// use fractal_collections::FastTable;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool: Arc<NodePool<u32>> = Arc::new(NodePool::new(PoolConfig::default())?);
/// let mut table = FastTable::with_allocator(pool.clone());
/// for i in 0..2000u32 {
///     table.push_back(i);
/// }
/// table.clear();
/// assert!(pool.stats().available > 0);
/// # Ok(())
/// # }
/// ```
pub struct NodePool<T> {
    config: PoolConfig,
    free: Mutex<Vec<FractalArray<T>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    recycled: AtomicU64,
    discarded: AtomicU64,
}

impl<T> NodePool<T> {
    /// Create a new node pool with the given configuration
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            free: Mutex::new(Vec::with_capacity(config.max_nodes.min(64))),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            recycled: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        })
    }

    /// Get pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get current pool statistics
    pub fn stats(&self) -> NodePoolStats {
        NodePoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            available: self.free.lock().len(),
        }
    }

    /// Drop every pooled level.
    pub fn clear(&self) {
        self.free.lock().clear();
    }

    #[inline]
    fn count(&self, counter: &AtomicU64) {
        if self.config.enable_stats {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl<T: Send> NodeAllocator<T> for NodePool<T> {
    fn allocate(&self, shift: u32, slots: usize) -> FractalArray<T> {
        if slots == MAX_SLOTS {
            if let Some(mut node) = self.free.lock().pop() {
                self.count(&self.hits);
                node.reset(shift);
                return node;
            }
        }
        self.count(&self.misses);
        FractalArray::empty_node(shift, slots)
    }

    fn recycle(&self, node: FractalArray<T>) {
        if node.slot_count() == MAX_SLOTS {
            let mut free = self.free.lock();
            if free.len() < self.config.max_nodes {
                free.push(node);
                drop(free);
                self.count(&self.recycled);
                log::trace!("node pool took back a level");
                return;
            }
        }
        self.count(&self.discarded);
    }
}
