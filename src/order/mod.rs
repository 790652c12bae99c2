//! Ordering and equality policies
//!
//! Every collection is parameterized by a policy object rather than by the
//! element type's own `PartialEq`/`Ord`/`Hash` impls:
//!
//! - [`Equality`]: decides whether two elements are the same element
//! - [`Order`]: a total order that also maps each element to a `u32` index
//!   used to pick a bucket in sparse storage, plus an optional sub-order used
//!   to keep bucketing elements whose indices collide
//!
//! An order must be consistent:
//!
//! - `are_equal(a, b) == (compare(a, b) == Ordering::Equal)`
//! - `compare(a, b) == Ordering::Less` implies `index_of(a) <= index_of(b)`
//! - `index_of` is deterministic for equal values
//!
//! Iterating a sparse map therefore visits keys in `compare` order.
//!
//! # Examples
//!
//! ```rust
//! use fractal_collections::order::{self, Order};
//! use std::cmp::Ordering;
//!
//! let lexical = order::lexical();
//! assert_eq!(lexical.compare("apple", "banana"), Ordering::Less);
//! assert!(lexical.index_of("apple") <= lexical.index_of("banana"));
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

mod equality;
mod lexical;
mod standard;

pub use equality::{FnEquality, IdentityEquality, StandardEquality};
pub use lexical::{CaseInsensitiveLexicalOrder, LexicalOrder};
pub use standard::{ComparatorOrder, HashOrder, IdentityOrder, IndexOrder, NaturalOrder};

/// Decides element identity for a collection.
pub trait Equality<T: ?Sized>: Send + Sync {
    /// Whether `left` and `right` designate the same element.
    fn are_equal(&self, left: &T, right: &T) -> bool;
}

/// A total order with bucket indexing.
pub trait Order<T: ?Sized>: Equality<T> {
    /// Total comparison, consistent with [`Equality::are_equal`].
    fn compare(&self, left: &T, right: &T) -> Ordering;

    /// Bucket index of `value`; never decreases as `compare` increases.
    fn index_of(&self, value: &T) -> u32;

    /// Order used to keep bucketing values whose index equals `value`'s.
    ///
    /// `None` means colliding values are kept in a sorted run instead.
    fn sub_order(&self, _value: &T) -> Option<Arc<dyn Order<T>>> {
        None
    }
}

/// Shared handle to an equality policy.
pub type SharedEquality<T> = Arc<dyn Equality<T>>;

/// Shared handle to an order policy.
pub type SharedOrder<T> = Arc<dyn Order<T>>;

/// Views an [`Order`] handle as an [`Equality`] handle.
pub struct OrderEquality<T: ?Sized>(SharedOrder<T>);

impl<T: ?Sized> OrderEquality<T> {
    /// Wrap `order`.
    pub fn new(order: SharedOrder<T>) -> Self {
        Self(order)
    }
}

impl<T: ?Sized> Equality<T> for OrderEquality<T> {
    #[inline]
    fn are_equal(&self, left: &T, right: &T) -> bool {
        self.0.are_equal(left, right)
    }
}

/// Equality handle backed by `order`.
pub fn as_equality<T: ?Sized + 'static>(order: SharedOrder<T>) -> SharedEquality<T> {
    Arc::new(OrderEquality::new(order))
}

/// `PartialEq`-based equality.
pub fn standard<T: PartialEq + ?Sized>() -> SharedEquality<T> {
    Arc::new(StandardEquality)
}

/// Hash order: buckets by a fixed-seed hash, ties broken by `Ord`.
pub fn hash<T: std::hash::Hash + Ord + ?Sized>() -> SharedOrder<T> {
    Arc::new(HashOrder)
}

/// Natural order: a single bucket kept sorted by `Ord`.
pub fn natural<T: Ord + ?Sized>() -> SharedOrder<T> {
    Arc::new(NaturalOrder)
}

/// Lexical order on strings.
pub fn lexical<T>() -> SharedOrder<T>
where
    T: ?Sized,
    LexicalOrder: Order<T>,
{
    Arc::new(LexicalOrder::new())
}

/// ASCII case-insensitive lexical order on strings.
pub fn lexical_case_insensitive<T>() -> SharedOrder<T>
where
    T: ?Sized,
    CaseInsensitiveLexicalOrder: Order<T>,
{
    Arc::new(CaseInsensitiveLexicalOrder::new())
}

/// Numeric order on integers, the integer itself being the bucket index.
pub fn index<T>() -> SharedOrder<T>
where
    IndexOrder: Order<T>,
{
    Arc::new(IndexOrder)
}

/// Pointer identity on `Arc` handles.
pub fn identity<T: ?Sized>() -> SharedOrder<Arc<T>> {
    Arc::new(IdentityOrder)
}

/// Order backed by a comparator closure; everything shares one sorted bucket.
pub fn comparator<T, F>(compare: F) -> SharedOrder<T>
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    Arc::new(ComparatorOrder::new(compare))
}
