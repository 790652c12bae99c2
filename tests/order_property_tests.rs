//! Consistency properties of the built-in orders
//!
//! Every order must agree with its own equality, map equal values to the
//! same bucket index, and never let the index decrease as `compare`
//! increases.

use proptest::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

use fractal_collections::order::{self, Equality, Order, SharedOrder};

fn assert_consistent<T: ?Sized>(order: &dyn Order<T>, a: &T, b: &T) {
    let ordering = order.compare(a, b);
    assert_eq!(order.are_equal(a, b), ordering == Ordering::Equal);
    assert_eq!(order.compare(b, a), ordering.reverse());
    match ordering {
        Ordering::Less => assert!(order.index_of(a) <= order.index_of(b)),
        Ordering::Greater => assert!(order.index_of(a) >= order.index_of(b)),
        Ordering::Equal => assert_eq!(order.index_of(a), order.index_of(b)),
    }
}

fn assert_transitive<T: ?Sized>(order: &dyn Order<T>, a: &T, b: &T, c: &T) {
    if order.compare(a, b).is_le() && order.compare(b, c).is_le() {
        assert!(order.compare(a, c).is_le());
    }
}

proptest! {
    #[test]
    fn prop_hash_order_consistent(a in any::<u64>(), b in any::<u64>()) {
        let ord: SharedOrder<u64> = order::hash();
        assert_consistent(ord.as_ref(), &a, &b);
        assert_consistent(ord.as_ref(), &a, &a);
        prop_assert_eq!(ord.index_of(&a), ord.index_of(&a));
    }

    #[test]
    fn prop_hash_order_on_strings(a in "\\PC{0,12}", b in "\\PC{0,12}", c in "\\PC{0,12}") {
        let ord: SharedOrder<str> = order::hash();
        assert_consistent(ord.as_ref(), a.as_str(), b.as_str());
        assert_transitive(ord.as_ref(), a.as_str(), b.as_str(), c.as_str());
    }

    #[test]
    fn prop_natural_order_matches_ord(a in any::<i64>(), b in any::<i64>()) {
        let ord: SharedOrder<i64> = order::natural();
        assert_consistent(ord.as_ref(), &a, &b);
        prop_assert_eq!(ord.compare(&a, &b), a.cmp(&b));
    }

    #[test]
    fn prop_index_order_signed(a in any::<i32>(), b in any::<i32>(), c in any::<i32>()) {
        let ord: SharedOrder<i32> = order::index();
        assert_consistent(ord.as_ref(), &a, &b);
        assert_transitive(ord.as_ref(), &a, &b, &c);
        prop_assert_eq!(ord.compare(&a, &b), a.cmp(&b));
    }

    #[test]
    fn prop_index_order_wide(a in any::<u64>(), b in any::<u64>()) {
        let ord: SharedOrder<u64> = order::index();
        assert_consistent(ord.as_ref(), &a, &b);
    }

    #[test]
    fn prop_lexical_order(a in "[a-z]{0,8}", b in "[a-z]{0,8}", c in "[a-z]{0,8}") {
        let ord: SharedOrder<str> = order::lexical();
        assert_consistent(ord.as_ref(), a.as_str(), b.as_str());
        assert_transitive(ord.as_ref(), a.as_str(), b.as_str(), c.as_str());
        prop_assert_eq!(ord.compare(a.as_str(), b.as_str()), a.cmp(&b));
    }

    #[test]
    fn prop_lexical_sub_orders_stay_consistent(prefix in "[a-c]{4}", x in "[a-z]{0,6}", y in "[a-z]{0,6}") {
        let ord: SharedOrder<String> = order::lexical();
        let a = format!("{}{}", prefix, x);
        let b = format!("{}{}", prefix, y);
        prop_assert_eq!(ord.index_of(&a), ord.index_of(&b));
        if let Some(sub) = ord.sub_order(&a) {
            assert_consistent(sub.as_ref(), &a, &b);
            prop_assert_eq!(sub.compare(&a, &b), a.cmp(&b));
        }
    }

    #[test]
    fn prop_case_insensitive_lexical(a in "[a-zA-Z]{0,8}", b in "[a-zA-Z]{0,8}") {
        let ord: SharedOrder<str> = order::lexical_case_insensitive();
        assert_consistent(ord.as_ref(), a.as_str(), b.as_str());
        prop_assert_eq!(
            ord.are_equal(a.as_str(), b.as_str()),
            a.eq_ignore_ascii_case(&b)
        );
    }

    #[test]
    fn prop_comparator_order(a in any::<i32>(), b in any::<i32>()) {
        let ord: SharedOrder<i32> = order::comparator(|x: &i32, y: &i32| y.cmp(x));
        assert_consistent(ord.as_ref(), &a, &b);
        prop_assert_eq!(ord.compare(&a, &b), b.cmp(&a));
    }
}

#[test]
fn test_identity_order_distinguishes_allocations() {
    let ord = order::identity::<String>();
    let a = Arc::new("same".to_string());
    let b = Arc::new("same".to_string());
    let a2 = Arc::clone(&a);
    assert!(ord.are_equal(&a, &a2));
    assert!(!ord.are_equal(&a, &b));
    assert_consistent(ord.as_ref(), &a, &b);
    assert_consistent(ord.as_ref(), &a, &a2);
}

#[test]
fn test_order_as_equality() {
    let equality = order::as_equality(order::lexical_case_insensitive::<String>());
    assert!(equality.are_equal(&"Rust".to_string(), &"rUST".to_string()));
    assert!(!equality.are_equal(&"Rust".to_string(), &"Rusty".to_string()));

    let standard = order::standard::<str>();
    assert!(standard.are_equal("a", "a"));
    assert!(!standard.are_equal("a", "b"));
}
