//! Composable views
//!
//! A view owns the store it wraps and implements [`Collection`] (and
//! [`Table`] or [`Map`] where the wrapped store does) by changing one aspect
//! of it:
//!
//! - [`Filtered`]: only elements matching a predicate
//! - [`Mapped`]: a read-only projection
//! - [`Sorted`]: kept sorted by an order
//! - [`Linked`]: insertion order
//! - [`Distinct`]: no duplicates
//! - [`Reversed`]: last to first
//! - [`Unmodifiable`]: every mutation rejected
//! - [`CustomEquality`]: a replaced equality policy
//!
//! Views are built through the combinators on [`Collection`] and [`Table`]
//! and stack freely:
//!
//! ```rust
//! use fractal_collections::{order, Collection, FastTable, Table};
//!
//! # fn main() -> fractal_collections::Result<()> {
//! let table: FastTable<i32> = (1..=10).collect();
//! let view = table.sorted(order::natural())?.reversed().filter(|x: &i32| x % 3 == 0);
//! assert_eq!(view.to_vec(), vec![9, 6, 3]);
//! # Ok(())
//! # }
//! ```
//!
//! [`Collection`]: crate::store::Collection
//! [`Table`]: crate::store::Table
//! [`Map`]: crate::store::Map

mod custom_equality;
mod distinct;
mod filtered;
mod linked;
mod mapped;
mod reversed;
mod sorted;
mod unmodifiable;

pub use custom_equality::CustomEquality;
pub use distinct::Distinct;
pub use filtered::Filtered;
pub use linked::Linked;
pub use mapped::Mapped;
pub use reversed::Reversed;
pub use sorted::Sorted;
pub use unmodifiable::Unmodifiable;
