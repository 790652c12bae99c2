//! Fork-join execution context

use crate::config::{Config, ConcurrencyConfig};
use crate::error::{CollectionError, Result};
use once_cell::sync::Lazy;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A unit of forked work.
pub type Task<'t, R> = Box<dyn FnOnce() -> Result<R> + Send + 't>;

static GLOBAL_CONTEXT: Lazy<Arc<ConcurrentContext>> = Lazy::new(|| {
    let config = ConcurrencyConfig::from_env().unwrap_or_else(|error| {
        log::warn!("ignoring concurrency environment: {}", error);
        ConcurrencyConfig::default()
    });
    let context = ConcurrentContext::new(config).unwrap_or_else(|error| {
        log::warn!("falling back to sequential execution: {}", error);
        ConcurrentContext::sequential()
    });
    Arc::new(context)
});

/// Worker threads that forked tasks are submitted to.
///
/// The first task of a fork-join always runs on the calling thread; the
/// others go to a rayon pool of `concurrency` workers. With a concurrency
/// of zero every task runs inline, in submission order.
pub struct ConcurrentContext {
    pool: Option<rayon::ThreadPool>,
    config: ConcurrencyConfig,
}

impl ConcurrentContext {
    /// Build a context with its own worker pool.
    pub fn new(config: ConcurrencyConfig) -> Result<Self> {
        config.validate()?;
        let pool = if config.concurrency == 0 {
            None
        } else {
            let prefix = config.thread_name_prefix.clone();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.concurrency)
                .thread_name(move |index| format!("{}-{}", prefix, index))
                .build()
                .map_err(|e| {
                    CollectionError::configuration(format!("Failed to build worker pool: {}", e))
                })?;
            log::debug!(
                "started {} workers named {}-*",
                config.concurrency,
                config.thread_name_prefix
            );
            Some(pool)
        };
        Ok(Self { pool, config })
    }

    /// A context without workers.
    pub fn sequential() -> Self {
        Self {
            pool: None,
            config: ConcurrencyConfig::sequential(),
        }
    }

    /// Process-wide context, configured from `FRACTAL_*` variables on first
    /// use.
    pub fn global() -> Arc<ConcurrentContext> {
        Arc::clone(&GLOBAL_CONTEXT)
    }

    /// Number of workers besides the caller.
    pub fn concurrency(&self) -> usize {
        if self.pool.is_some() {
            self.config.concurrency
        } else {
            0
        }
    }

    /// Configuration the context was built from.
    pub fn config(&self) -> &ConcurrencyConfig {
        &self.config
    }

    /// Start collecting tasks for one fork-join.
    pub fn fork_join<'t, R: Send>(&self) -> ForkJoin<'_, 't, R> {
        ForkJoin {
            context: self,
            tasks: Vec::new(),
        }
    }

    /// Run `tasks` and wait for all of them.
    ///
    /// Results come back in submission order. A task that returns an error
    /// or panics does not stop the others; once all have finished, the
    /// first failure in submission order is returned as
    /// [`CollectionError::WorkerFailure`].
    pub fn execute_all<'t, R: Send>(&self, tasks: Vec<Task<'t, R>>) -> Result<Vec<R>> {
        let count = tasks.len();
        let mut outcomes: Vec<Option<Result<R>>> = (0..count).map(|_| None).collect();

        match &self.pool {
            Some(pool) if count > 1 => {
                log::debug!("forking {} tasks over {} workers", count, self.config.concurrency);
                let mut tasks = tasks.into_iter();
                let mut slots = outcomes.iter_mut();
                let local = tasks.next().zip(slots.next());
                pool.in_place_scope(|scope| {
                    for (task, slot) in tasks.zip(slots) {
                        scope.spawn(move |_| *slot = Some(run_guarded(task)));
                    }
                    if let Some((task, slot)) = local {
                        *slot = Some(run_guarded(task));
                    }
                });
            }
            _ => {
                for (task, slot) in tasks.into_iter().zip(outcomes.iter_mut()) {
                    *slot = Some(run_guarded(task));
                }
            }
        }

        let mut results = Vec::with_capacity(count);
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Some(Ok(value)) => results.push(value),
                Some(Err(error)) => {
                    log::warn!("forked task {} failed: {}", index, error);
                    return Err(match error {
                        failure @ CollectionError::WorkerFailure { .. } => failure,
                        other => CollectionError::worker_failure(format!("task {}: {}", index, other)),
                    });
                }
                None => {
                    return Err(CollectionError::illegal_state(format!(
                        "forked task {} never ran",
                        index
                    )))
                }
            }
        }
        Ok(results)
    }
}

impl fmt::Debug for ConcurrentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentContext")
            .field("concurrency", &self.concurrency())
            .field("min_split_size", &self.config.min_split_size)
            .finish()
    }
}

fn run_guarded<R>(task: Task<'_, R>) -> Result<R> {
    panic::catch_unwind(AssertUnwindSafe(task))
        .unwrap_or_else(|payload| Err(CollectionError::worker_failure(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", message)
    } else {
        "worker panicked".to_string()
    }
}

/// Tasks queued for one fork-join on a [`ConcurrentContext`].
///
/// ```rust
/// use fractal_collections::concurrency::ConcurrentContext;
///
/// # fn main() -> fractal_collections::Result<()> {
/// let context = ConcurrentContext::sequential();
/// let data = [1, 2, 3, 4];
/// let mut fork = context.fork_join();
/// for chunk in data.chunks(2) {
///     fork.execute(move || Ok(chunk.iter().sum::<i32>()));
/// }
/// assert_eq!(fork.exit()?, vec![3, 7]);
/// # Ok(())
/// # }
/// ```
pub struct ForkJoin<'c, 't, R> {
    context: &'c ConcurrentContext,
    tasks: Vec<Task<'t, R>>,
}

impl<'c, 't, R: Send> ForkJoin<'c, 't, R> {
    /// Queue `task`; nothing runs before [`exit`](Self::exit).
    pub fn execute<F>(&mut self, task: F)
    where
        F: FnOnce() -> Result<R> + Send + 't,
    {
        self.tasks.push(Box::new(task));
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Run every queued task and join.
    pub fn exit(self) -> Result<Vec<R>> {
        self.context.execute_all(self.tasks)
    }
}
