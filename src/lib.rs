//! # Fractal Collections: Composable Collections on a Fractal Array
//!
//! Tables, ordered sparse maps and sets, and stackable views over them, all
//! built on one recursive array structure with amortized O(1) insertion and
//! removal at any position.
//!
//! ## Key Features
//!
//! - **Fractal Array**: offset-addressed, self-similar levels of 256 slots;
//!   O(1) rotation, shifts that move whole children by offset
//! - **FastTable**: positional table with O(1) access and cheap insert/remove
//!   anywhere, optional node pooling
//! - **Sparse Maps and Sets**: ordered by a pluggable [`order::Order`] whose
//!   `index_of` picks the trie bucket, with bounded range views
//! - **Views**: filtered, mapped, sorted, linked, distinct, reversed,
//!   unmodifiable and custom-equality wrappers over any store
//! - **Concurrency**: copy-on-write snapshots, a writer-preferring shared
//!   lock, and fork-join bulk operations on a rayon-backed context
//!
//! ## Quick Start
//!
//! ```rust
//! use fractal_collections::{order, Collection, FastTable, SparseMap, Table};
//!
//! # fn main() -> fractal_collections::Result<()> {
//! // Positional table
//! let mut table = FastTable::new();
//! table.push_back(5);
//! table.push_back(3);
//! table.insert(1, 8)?;
//! assert_eq!(table.to_vec(), vec![5, 8, 3]);
//!
//! // Views stack on top of any store
//! let sorted = table.sorted(order::natural())?;
//! assert_eq!(sorted.to_vec(), vec![3, 5, 8]);
//!
//! // Ordered map under the lexical order
//! let mut map = SparseMap::with_order(order::lexical());
//! map.put("pear".to_string(), 2)?;
//! map.put("apple".to_string(), 1)?;
//! let keys: Vec<&String> = map.keys().collect();
//! assert_eq!(keys, vec!["apple", "pear"]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod concurrency;
pub mod config;
pub mod containers;
pub mod error;
pub mod fractal;
pub mod memory;
pub mod order;
pub mod sparse;
pub mod store;
pub mod view;

// Re-export core types
pub use containers::FastTable;
pub use error::{CollectionError, Result};
pub use fractal::FractalArray;
pub use sparse::{Entry, LinkedMap, SparseMap, SparseSet};
pub use store::{reducers, Collection, Map, SubTable, Table};

// Re-export views
pub use concurrency::{AtomicView, ConcurrentContext, ParallelView, SharedView};
pub use view::{
    CustomEquality, Distinct, Filtered, Linked, Mapped, Reversed, Sorted, Unmodifiable,
};

// Re-export configuration and pooling
pub use config::{ConcurrencyConfig, Config, PoolConfig};
pub use memory::{Heap, NodeAllocator, NodePool};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing fractal-collections v{}", VERSION);
}
