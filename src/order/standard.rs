use super::{Equality, Order};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Fixed seeds so that bucket indices are stable across runs and threads.
static HASH_STATE: Lazy<ahash::RandomState> = Lazy::new(|| {
    ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
});

#[inline]
fn hash32<T: Hash + ?Sized>(value: &T) -> u32 {
    let h = HASH_STATE.hash_one(value);
    (h ^ (h >> 32)) as u32
}

/// Hash order: the bucket index is a 32-bit hash and ties are broken by `Ord`.
///
/// This is the default order of sparse maps and sets. Iteration follows hash
/// order, not value order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashOrder;

impl<T: Hash + Ord + ?Sized> Equality<T> for HashOrder {
    #[inline]
    fn are_equal(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

impl<T: Hash + Ord + ?Sized> Order<T> for HashOrder {
    fn compare(&self, left: &T, right: &T) -> Ordering {
        hash32(left)
            .cmp(&hash32(right))
            .then_with(|| left.cmp(right))
    }

    #[inline]
    fn index_of(&self, value: &T) -> u32 {
        hash32(value)
    }
}

/// Natural order: every value maps to bucket 0 and is kept sorted by `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Equality<T> for NaturalOrder {
    #[inline]
    fn are_equal(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

impl<T: Ord + ?Sized> Order<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }

    #[inline]
    fn index_of(&self, _value: &T) -> u32 {
        0
    }
}

/// Numeric order on integers.
///
/// Values that fit in 32 bits are their own bucket index; wider values are
/// clamped, so they share the edge buckets and fall back to sorted runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOrder;

macro_rules! index_order {
    ($($ty:ty => |$v:ident| $index:expr;)*) => {
        $(
            impl Equality<$ty> for IndexOrder {
                #[inline]
                fn are_equal(&self, left: &$ty, right: &$ty) -> bool {
                    left == right
                }
            }

            impl Order<$ty> for IndexOrder {
                #[inline]
                fn compare(&self, left: &$ty, right: &$ty) -> Ordering {
                    left.cmp(right)
                }

                #[inline]
                fn index_of(&self, value: &$ty) -> u32 {
                    let $v = *value;
                    $index
                }
            }
        )*
    };
}

index_order! {
    u8 => |v| v as u32;
    u16 => |v| v as u32;
    u32 => |v| v;
    u64 => |v| v.min(u32::MAX as u64) as u32;
    usize => |v| (v as u64).min(u32::MAX as u64) as u32;
    i8 => |v| (v as i32 as u32) ^ 0x8000_0000;
    i16 => |v| (v as i32 as u32) ^ 0x8000_0000;
    i32 => |v| (v as u32) ^ 0x8000_0000;
    i64 => |v| (v.clamp(i32::MIN as i64, i32::MAX as i64) as i32 as u32) ^ 0x8000_0000;
}

/// Identity order on `Arc` handles: two handles are equal only when they
/// point to the same allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOrder;

#[inline]
fn address<T: ?Sized>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value) as *const () as usize
}

impl<T: ?Sized> Equality<Arc<T>> for IdentityOrder {
    #[inline]
    fn are_equal(&self, left: &Arc<T>, right: &Arc<T>) -> bool {
        Arc::ptr_eq(left, right)
    }
}

impl<T: ?Sized> Order<Arc<T>> for IdentityOrder {
    fn compare(&self, left: &Arc<T>, right: &Arc<T>) -> Ordering {
        let (l, r) = (address(left), address(right));
        hash32(&l).cmp(&hash32(&r)).then(l.cmp(&r))
    }

    #[inline]
    fn index_of(&self, value: &Arc<T>) -> u32 {
        hash32(&address(value))
    }
}

/// Order backed by a comparator closure.
pub struct ComparatorOrder<F> {
    compare: F,
}

impl<F> ComparatorOrder<F> {
    /// Wrap `compare`.
    pub fn new(compare: F) -> Self {
        Self { compare }
    }
}

impl<F> fmt::Debug for ComparatorOrder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComparatorOrder")
    }
}

impl<T, F> Equality<T> for ComparatorOrder<F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    #[inline]
    fn are_equal(&self, left: &T, right: &T) -> bool {
        (self.compare)(left, right) == Ordering::Equal
    }
}

impl<T, F> Order<T> for ComparatorOrder<F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        (self.compare)(left, right)
    }

    #[inline]
    fn index_of(&self, _value: &T) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_order_is_deterministic() {
        let a = HashOrder.index_of("key");
        let b = HashOrder.index_of("key");
        assert_eq!(a, b);
        assert!(HashOrder.are_equal("key", "key"));
        assert_eq!(HashOrder.compare("key", "key"), Ordering::Equal);
    }

    #[test]
    fn test_hash_order_index_is_monotone() {
        let values: Vec<u64> = (0..500).collect();
        for a in &values {
            for b in values.iter().step_by(7) {
                if HashOrder.compare(a, b) == Ordering::Less {
                    assert!(HashOrder.index_of(a) <= HashOrder.index_of(b));
                }
            }
        }
    }

    #[test]
    fn test_index_order_preserves_numeric_order() {
        assert!(IndexOrder.index_of(&-5i32) < IndexOrder.index_of(&3i32));
        assert!(IndexOrder.index_of(&i64::MIN) <= IndexOrder.index_of(&-1i64));
        assert_eq!(IndexOrder.index_of(&7u32), 7);
        assert_eq!(IndexOrder.index_of(&u64::MAX), u32::MAX);
        assert_eq!(Order::<u8>::compare(&IndexOrder, &1, &2), Ordering::Less);
    }

    #[test]
    fn test_identity_order() {
        let a = Arc::new("same".to_string());
        let b = Arc::new("same".to_string());
        assert!(IdentityOrder.are_equal(&a, &Arc::clone(&a)));
        assert!(!IdentityOrder.are_equal(&a, &b));
        assert_ne!(IdentityOrder.compare(&a, &b), Ordering::Equal);
        assert_eq!(IdentityOrder.index_of(&a), IdentityOrder.index_of(&Arc::clone(&a)));
    }

    #[test]
    fn test_natural_order_single_bucket() {
        assert_eq!(NaturalOrder.index_of(&10), 0);
        assert_eq!(NaturalOrder.index_of(&-10), 0);
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
    }
}
