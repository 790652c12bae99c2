//! Ordered maps and sets
//!
//! [`SparseMap`] and [`SparseSet`] route each key through its order's
//! `index_of` into a trie of sixteen-bucket nodes. Keys sharing an index are
//! grouped under the order's sub-order when it has one, or kept in a run
//! sorted by `compare` otherwise; either way iteration follows `compare`.
//!
//! [`LinkedMap`] layers an insertion-order key table over a sparse map.

mod entry;
mod linked;
mod map;
mod set;
mod trie;

pub use entry::{Entry, KeyOrder};
pub use linked::LinkedMap;
pub use map::{Range, SparseMap, SubMap};
pub use set::{SparseSet, SubSet};
pub use trie::Iter;
