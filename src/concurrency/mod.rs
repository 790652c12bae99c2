//! Thread-safe views and fork-join execution
//!
//! - [`AtomicView`]: copy-on-write; readers work on immutable snapshots
//!   published after every mutation or [`Batch`]
//! - [`SharedView`]: reader/writer lock that admits a waiting writer before
//!   readers arriving after it, with [`LockStats`]
//! - [`ParallelView`]: `for_each`, `reduce`, `remove_if` and `until` split
//!   the store and run the parts on a [`ConcurrentContext`]
//!
//! Contexts are passed explicitly; [`ConcurrentContext::global`] is the
//! default for views built with [`Collection::parallel`].
//!
//! [`Collection::parallel`]: crate::store::Collection::parallel

mod atomic;
mod context;
mod parallel;
mod shared;

pub use atomic::{AtomicView, Batch};
pub use context::{ConcurrentContext, ForkJoin, Task};
pub use parallel::ParallelView;
pub use shared::{LockStats, SharedReadGuard, SharedSplit, SharedView, SharedWriteGuard};
