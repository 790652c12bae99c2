//! Concurrency tests for the thread-safe views
//!
//! - Copy-on-write views: readers never observe a partially applied batch
//! - Shared views: exclusive writers, concurrent readers, writer preference
//! - Parallel views: fork-join bulk operations agree with sequential ones

use crossbeam_utils::thread as crossbeam_thread;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use fractal_collections::{
    Collection, ConcurrencyConfig, ConcurrentContext, FastTable, ParallelView, SparseMap, SparseSet,
};

fn context(workers: usize) -> Arc<ConcurrentContext> {
    Arc::new(ConcurrentContext::new(ConcurrencyConfig::with_concurrency(workers)).unwrap())
}

// =============================================================================
// ATOMIC VIEW TESTS
// =============================================================================

#[test]
fn test_atomic_batch_is_one_transition() {
    let view = SparseSet::<String>::new().atomic();
    view.add("a".to_string()).unwrap();
    let before = view.version();
    let old = view.snapshot();

    {
        let mut batch = view.batch();
        batch.add("b".to_string()).unwrap();
        batch.add("c".to_string()).unwrap();
        assert_eq!(view.snapshot().size(), 1);
    }

    assert_eq!(view.version(), before + 1);
    assert_eq!(old.size(), 1);
    assert_eq!(view.size(), 3);
    assert!(view.contains(&"c".to_string()));
}

#[test]
fn test_atomic_readers_never_see_torn_batches() {
    let view = Arc::new(FastTable::<u64>::new().atomic());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let view = Arc::clone(&view);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut observed = 0usize;
            while !done.load(Ordering::Acquire) {
                let snapshot = view.snapshot();
                // Every batch pushes ten elements summing to a multiple of ten
                assert_eq!(snapshot.size() % 10, 0);
                let sum: u64 = snapshot.iter().copied().sum();
                assert_eq!(sum % 10, 0);
                observed += 1;
            }
            observed
        })
    };

    for round in 0..200u64 {
        let mut batch = view.batch();
        for _ in 0..10 {
            batch.push_back(round);
        }
        batch.commit();
    }
    done.store(true, Ordering::Release);

    assert!(reader.join().unwrap() > 0);
    assert_eq!(view.size(), 2000);
    assert_eq!(view.version(), 200);
}

#[test]
fn test_atomic_concurrent_writers() {
    let view = SparseMap::<u32, u32>::new().atomic();
    let threads = 8;
    let per_thread = 250u32;

    crossbeam_thread::scope(|s| {
        for t in 0..threads {
            let view = &view;
            s.spawn(move |_| {
                for i in 0..per_thread {
                    let key = t * per_thread + i;
                    view.put(key, key * 2).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(view.size(), (threads * per_thread) as usize);
    assert_eq!(view.get_value(&1001), Some(2002));
    assert_eq!(view.version(), u64::from(threads * per_thread));
}

// =============================================================================
// SHARED VIEW TESTS
// =============================================================================

#[test]
fn test_shared_writers_are_exclusive() {
    let view = FastTable::<usize>::new().shared();
    let threads = 8;
    let per_thread = 200;

    crossbeam_thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|_| {
                for i in 0..per_thread {
                    view.add(i).unwrap();
                    let _ = view.size();
                }
            });
        }
    })
    .unwrap();

    let stats = view.stats();
    assert_eq!(view.size(), threads * per_thread);
    assert_eq!(stats.max_writers, 1);
    assert_eq!(stats.current_writers, 0);
    assert_eq!(stats.current_readers, 0);
    assert!(stats.write_acquisitions >= (threads * per_thread) as u64);
}

#[test]
fn test_shared_readers_overlap() {
    let view = (0..100).collect::<FastTable<u32>>().shared();
    let readers = 4;
    let barrier = Barrier::new(readers);

    crossbeam_thread::scope(|s| {
        for _ in 0..readers {
            s.spawn(|_| {
                let guard = view.read();
                barrier.wait();
                assert_eq!(guard.len(), 100);
                thread::sleep(Duration::from_millis(10));
            });
        }
    })
    .unwrap();

    let stats = view.stats();
    assert_eq!(stats.max_readers, readers);
    assert_eq!(stats.current_readers, 0);
}

#[test]
fn test_shared_split_reads_disjoint_ranges() {
    let view = (0..1000).collect::<FastTable<u32>>().shared();
    let total = AtomicUsize::new(0);
    let splits = view.split(4);
    assert_eq!(splits.len(), 4);

    crossbeam_thread::scope(|s| {
        for split in &splits {
            let total = &total;
            s.spawn(move |_| {
                split.for_each(|n| {
                    total.fetch_add(*n as usize, Ordering::Relaxed);
                });
            });
        }
    })
    .unwrap();

    assert_eq!(total.load(Ordering::Relaxed), (0..1000).sum::<usize>());
}

// =============================================================================
// PARALLEL VIEW TESTS
// =============================================================================

#[test]
fn test_parallel_remove_if() {
    let table: FastTable<u32> = (1..=100).collect();
    let mut view = table.parallel().with_split_factor(4);
    assert_eq!(view.remove_if(|n| n % 2 == 0).unwrap(), 50);
    assert_eq!(view.size(), 50);
    assert_eq!(view.to_vec(), (1..=100).filter(|n| n % 2 == 1).collect::<Vec<_>>());
}

#[test]
fn test_parallel_for_each_on_explicit_context() {
    let set: SparseSet<u64> = (0..10_000).collect();
    let view = ParallelView::with_context(set, context(3));
    let count = AtomicUsize::new(0);
    view.for_each(|_| {
        count.fetch_add(1, Ordering::Relaxed);
    })
    .unwrap();
    assert_eq!(count.load(Ordering::Relaxed), 10_000);
    assert!(view.until(|n| *n == 9_999).unwrap());
}

#[test]
fn test_fork_join_panics_surface_as_errors() {
    let ctx = context(2);
    let mut fork = ctx.fork_join();
    fork.execute(|| Ok(1));
    fork.execute(|| panic!("worker exploded"));
    fork.execute(|| Ok(3));
    let err = fork.exit().unwrap_err();
    assert_eq!(err.category(), "worker");
    assert!(err.to_string().contains("worker exploded"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_parallel_reduce_matches_sequential(
        values in prop::collection::vec(0u64..1_000_000, 0..2000),
        parts in 1usize..9
    ) {
        let table: FastTable<u64> = values.iter().copied().collect();
        let expected = Collection::reduce(&table, |a, b| a + b);
        let view = ParallelView::with_context(table, context(2))
            .with_split_factor(parts);
        prop_assert_eq!(view.reduce(|a, b| a + b).unwrap(), expected);
        prop_assert_eq!(view.reduce(|a, b| a.max(b)).unwrap(), values.iter().copied().max());
    }
}
