//! Concurrency configuration for parallel views and execution contexts.

use super::{parse_env_var, Config};
use crate::error::{CollectionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound accepted for the worker count.
pub const MAX_CONCURRENCY: usize = 1024;

/// Configuration of a [`ConcurrentContext`](crate::concurrency::ConcurrentContext).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Number of worker threads besides the caller; 0 runs every task inline
    pub concurrency: usize,
    /// Collections smaller than this are processed sequentially
    pub min_split_size: usize,
    /// Name prefix of the worker threads
    pub thread_name_prefix: String,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get().saturating_sub(1),
            min_split_size: 64,
            thread_name_prefix: "fractal-worker".to_string(),
        }
    }
}

impl ConcurrencyConfig {
    /// Configuration with an explicit worker count.
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    /// Configuration that runs everything on the calling thread.
    pub fn sequential() -> Self {
        Self {
            concurrency: 0,
            ..Self::default()
        }
    }
}

impl Config for ConcurrencyConfig {
    fn validate(&self) -> Result<()> {
        if self.concurrency > MAX_CONCURRENCY {
            return Err(CollectionError::configuration(format!(
                "concurrency must not exceed {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(CollectionError::configuration(
                "thread_name_prefix must not be empty",
            ));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.concurrency = parse_env_var(&format!("{}CONCURRENCY", prefix), config.concurrency);
        config.min_split_size =
            parse_env_var(&format!("{}MIN_SPLIT_SIZE", prefix), config.min_split_size);
        config.thread_name_prefix = parse_env_var(
            &format!("{}THREAD_NAME_PREFIX", prefix),
            config.thread_name_prefix,
        );
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            concurrency: num_cpus::get(),
            min_split_size: 256,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            concurrency: (num_cpus::get() / 2).saturating_sub(1),
            min_split_size: 1024,
            ..Self::default()
        }
    }

    fn realtime_preset() -> Self {
        // Split every store, however small.
        Self {
            concurrency: num_cpus::get().saturating_sub(1),
            min_split_size: 1,
            ..Self::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            CollectionError::configuration(format!("Failed to serialize concurrency config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CollectionError::configuration(format!("Failed to parse concurrency config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
