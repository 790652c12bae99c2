use super::Equality;
use std::fmt;
use std::sync::Arc;

/// Equality through `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEquality;

impl<T: PartialEq + ?Sized> Equality<T> for StandardEquality {
    #[inline]
    fn are_equal(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

/// Equality of `Arc` handles by pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEquality;

impl<T: ?Sized> Equality<Arc<T>> for IdentityEquality {
    #[inline]
    fn are_equal(&self, left: &Arc<T>, right: &Arc<T>) -> bool {
        Arc::ptr_eq(left, right)
    }
}

/// Equality backed by a closure.
pub struct FnEquality<F> {
    equal: F,
}

impl<F> FnEquality<F> {
    /// Wrap `equal`.
    pub fn new(equal: F) -> Self {
        Self { equal }
    }
}

impl<F> fmt::Debug for FnEquality<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEquality")
    }
}

impl<T, F> Equality<T> for FnEquality<F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    #[inline]
    fn are_equal(&self, left: &T, right: &T) -> bool {
        (self.equal)(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = Arc::new(5);
        let b = Arc::new(5);
        assert!(IdentityEquality.are_equal(&a, &a.clone()));
        assert!(!IdentityEquality.are_equal(&a, &b));
        assert!(StandardEquality.are_equal(&a, &b));
    }

    #[test]
    fn test_fn_equality() {
        let parity = FnEquality::new(|a: &i32, b: &i32| a % 2 == b % 2);
        assert!(parity.are_equal(&2, &8));
        assert!(!parity.are_equal(&2, &3));
    }
}
