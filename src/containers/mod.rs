//! Base containers
//!
//! - **`FastTable<T>`** - positional table on a fractal array, amortized O(1)
//!   insertion and removal at any index
//!
//! Ordered maps and sets live in [`crate::sparse`].

mod fast_table;

pub use fast_table::{FastTable, IntoIter, Iter};
