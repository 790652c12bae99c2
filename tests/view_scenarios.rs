//! End-to-end scenarios for the view wrappers
//!
//! Each scenario builds a store, stacks one or more views on it, and checks
//! what the views show and what reaches the underlying store.

use fractal_collections::order::{self, FnEquality};
use fractal_collections::{
    Collection, CollectionError, FastTable, LinkedMap, Map, SparseMap, SparseSet, Table,
};
use std::sync::Arc;

// =============================================================================
// SORTED VIEWS
// =============================================================================

#[test]
fn test_sorted_view_orders_and_keeps_order() {
    let table: FastTable<i32> = vec![5, 3, 8, 1].into_iter().collect();
    let mut sorted = table.sorted(order::natural()).unwrap();
    assert_eq!(sorted.to_vec(), vec![1, 3, 5, 8]);

    assert!(sorted.add(4).unwrap());
    assert!(sorted.add(0).unwrap());
    assert!(sorted.add(9).unwrap());
    assert_eq!(sorted.to_vec(), vec![0, 1, 3, 4, 5, 8, 9]);
    assert_eq!(sorted.position_of(&5), Some(4));
    assert_eq!(sorted.position_of(&7), None);
}

#[test]
fn test_sorted_view_rejects_positional_writes() {
    let table: FastTable<i32> = vec![2, 1].into_iter().collect();
    let mut sorted = table.sorted(order::natural()).unwrap();

    let err = sorted.insert(0, 10).unwrap_err();
    assert!(matches!(err, CollectionError::UnsupportedOperation { .. }));
    assert!(sorted.set(0, 10).is_err());
    assert_eq!(sorted.to_vec(), vec![1, 2]);
    assert_eq!(sorted.remove_at(0).unwrap(), 1);
    assert_eq!(sorted.to_vec(), vec![2]);
}

#[test]
fn test_sorted_view_resorts_under_new_order() {
    let table: FastTable<i32> = (1..=5).collect();
    let mut sorted = table.sorted(order::natural()).unwrap();
    let descending = order::comparator(|a: &i32, b: &i32| b.cmp(a));
    sorted.sort(&descending).unwrap();
    assert_eq!(sorted.to_vec(), vec![5, 4, 3, 2, 1]);
    sorted.add(3).unwrap();
    assert_eq!(sorted.to_vec(), vec![5, 4, 3, 3, 2, 1]);
}

// =============================================================================
// FILTERED AND MAPPED VIEWS
// =============================================================================

#[test]
fn test_filter_declines_non_matching_additions() {
    let table: FastTable<i32> = (1..=6).collect();
    let mut evens = table.filter(|n| n % 2 == 0);
    assert_eq!(evens.size(), 3);

    assert!(!evens.add(3).unwrap());
    assert_eq!(evens.inner().size(), 6);
    assert!(evens.add(8).unwrap());
    assert_eq!(evens.inner().size(), 7);
    assert_eq!(evens.to_vec(), vec![2, 4, 6, 8]);

    assert!(!evens.contains(&3));
    assert!(!evens.remove(&3).unwrap());
    assert_eq!(evens.remove_nth(0).unwrap(), 2);

    evens.clear().unwrap();
    assert!(evens.is_empty());
    assert_eq!(evens.into_inner().to_vec(), vec![1, 3, 5]);
}

#[test]
fn test_mapped_view_is_read_only_projection() {
    let table: FastTable<&str> = vec!["a", "bb", "ccc"].into_iter().collect();
    let mut lengths = table.map(|s: &&str| s.len());
    assert_eq!(lengths.to_vec(), vec![1, 2, 3]);
    assert!(lengths.contains(&2));
    assert!(matches!(
        lengths.add(4),
        Err(CollectionError::UnsupportedOperation { .. })
    ));
    assert_eq!(lengths.remove_nth(1).unwrap(), 2);
    assert_eq!(lengths.into_inner().to_vec(), vec!["a", "ccc"]);
}

// =============================================================================
// LINKED AND DISTINCT VIEWS
// =============================================================================

#[test]
fn test_linked_view_tracks_arrival_order() {
    let mut linked = SparseSet::<String>::new().linked();
    assert!(linked.add("a".to_string()).unwrap());
    assert!(linked.add("b".to_string()).unwrap());
    assert!(linked.remove(&"a".to_string()).unwrap());
    assert!(linked.add("c".to_string()).unwrap());
    assert!(!linked.add("b".to_string()).unwrap());

    assert_eq!(linked.to_vec(), vec!["b".to_string(), "c".to_string()]);
    assert_eq!(linked.inner().size(), 2);
    assert!(linked.contains(&"c".to_string()));
}

#[test]
fn test_linked_map_keeps_insertion_order() {
    let mut map = LinkedMap::new();
    map.put(30u32, "thirty").unwrap();
    map.put(10, "ten").unwrap();
    map.put(20, "twenty").unwrap();
    map.put(10, "TEN").unwrap();

    let keys: Vec<u32> = map.keys().copied().collect();
    assert_eq!(keys, vec![30, 10, 20]);
    assert_eq!(map.get_value(&10), Some(&"TEN"));
    assert_eq!(map.remove_key(&30), Some("thirty"));
    let keys: Vec<u32> = map.keys().copied().collect();
    assert_eq!(keys, vec![10, 20]);
}

#[test]
fn test_distinct_view_hides_duplicates() {
    let table: FastTable<i32> = vec![1, 2, 1, 3, 2, 4].into_iter().collect();
    let mut distinct = table.distinct();
    assert_eq!(distinct.to_vec(), vec![1, 2, 3, 4]);
    assert_eq!(distinct.size(), 4);
    assert!(!distinct.add(3).unwrap());
    assert!(distinct.add(5).unwrap());

    assert!(distinct.remove(&2).unwrap());
    assert!(!distinct.contains(&2));
    assert_eq!(distinct.into_inner().to_vec(), vec![1, 1, 3, 4, 5]);
}

// =============================================================================
// REVERSED, UNMODIFIABLE AND CUSTOM-EQUALITY VIEWS
// =============================================================================

#[test]
fn test_reversed_view_mirrors_positions() {
    let table: FastTable<i32> = (1..=4).collect();
    let mut reversed = table.reversed();
    assert_eq!(reversed.to_vec(), vec![4, 3, 2, 1]);
    assert_eq!(*Table::get(&reversed, 0).unwrap(), 4);

    reversed.insert(0, 5).unwrap();
    assert_eq!(reversed.to_vec(), vec![5, 4, 3, 2, 1]);
    assert_eq!(reversed.remove_nth(4).unwrap(), 1);
    assert!(reversed.insert(10, 0).is_err());
    assert_eq!(reversed.into_inner().to_vec(), vec![2, 3, 4, 5]);
}

#[test]
fn test_unmodifiable_view_rejects_every_mutation() {
    let table: FastTable<i32> = (1..=3).collect();
    let mut frozen = table.unmodifiable();

    assert!(frozen.add(4).is_err());
    assert!(frozen.remove(&1).is_err());
    assert!(frozen.remove_nth(0).is_err());
    assert!(frozen.clear().is_err());
    assert!(frozen.insert(0, 0).is_err());
    assert_eq!(frozen.size(), 3);
    assert_eq!(frozen.to_vec(), vec![1, 2, 3]);

    let mut map = SparseMap::new();
    map.put("k".to_string(), 1).unwrap();
    let mut frozen_map = map.unmodifiable();
    assert_eq!(frozen_map.get_value(&"k".to_string()), Some(&1));
    let err = frozen_map.put_entry("j".to_string(), 2).unwrap_err();
    assert_eq!(err.category(), "unsupported");
}

#[test]
fn test_custom_equality_drives_membership() {
    let table: FastTable<String> = vec!["Alpha".to_string(), "beta".to_string()]
        .into_iter()
        .collect();
    let mut folded = table.with_equality(order::as_equality(order::lexical_case_insensitive()));
    assert!(folded.contains(&"ALPHA".to_string()));
    assert!(folded.remove(&"BETA".to_string()).unwrap());
    assert_eq!(folded.to_vec(), vec!["Alpha".to_string()]);

    let by_parity = Arc::new(FnEquality::new(|a: &i32, b: &i32| a % 2 == b % 2));
    let numbers: FastTable<i32> = vec![2, 4, 7, 9].into_iter().collect();
    let parity = numbers.with_equality(by_parity);
    assert_eq!(Table::index_of(&parity, &3), Some(2));
    assert_eq!(Table::last_index_of(&parity, &0), Some(1));
}

// =============================================================================
// STACKED VIEWS
// =============================================================================

#[test]
fn test_views_stack() {
    let table: FastTable<i32> = (1..=10).collect();
    let view = table
        .sorted(order::natural())
        .unwrap()
        .reversed()
        .filter(|n| n % 3 == 0);
    assert_eq!(view.to_vec(), vec![9, 6, 3]);

    let mut labels = view.map(|n: &i32| format!("#{}", n));
    assert_eq!(labels.to_vec(), vec!["#9", "#6", "#3"]);
    assert_eq!(labels.remove_nth(0).unwrap(), "#9");
    assert_eq!(labels.into_inner().inner().size(), 9);
}

#[test]
fn test_cursor_removes_through_views() {
    let table: FastTable<i32> = (1..=9).collect();
    let mut odds = table.filter(|n| n % 2 == 1);
    let mut cursor = odds.cursor();
    while let Some(value) = cursor.next().map(|v| *v) {
        if value > 4 {
            cursor.remove().unwrap();
        }
    }
    assert_eq!(odds.to_vec(), vec![1, 3]);
    assert_eq!(odds.into_inner().to_vec(), vec![1, 2, 3, 4, 6, 8]);
}
