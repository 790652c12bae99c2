//! Configuration APIs for fractal-collections
//!
//! Tunables that are not part of a collection's value (worker counts, split
//! thresholds, node pool limits) live in plain serde-friendly structs that
//! implement the common [`Config`] trait.
//!
//! # Preset Configurations
//!
//! ```rust
//! use fractal_collections::config::{Config, ConcurrencyConfig};
//!
//! let throughput = ConcurrencyConfig::performance_preset();
//! let frugal = ConcurrencyConfig::memory_preset();
//! assert!(throughput.validate().is_ok());
//! assert!(frugal.concurrency <= throughput.concurrency);
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use fractal_collections::config::{Config, PoolConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads FRACTAL_POOL_MAX_NODES and FRACTAL_POOL_STATS when present
//! let config = PoolConfig::from_env()?;
//! assert!(config.validate().is_ok());
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod concurrency;
pub mod pool;


pub use concurrency::ConcurrencyConfig;
pub use pool::PoolConfig;

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Environment variables use the format `FRACTAL_{COMPONENT}_{FIELD}`.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix("FRACTAL_")
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset tuned for throughput.
    fn performance_preset() -> Self;

    /// Preset tuned for a small footprint.
    fn memory_preset() -> Self;

    /// Preset tuned for predictable latency.
    fn realtime_preset() -> Self;

    /// Balanced preset, the default for most applications.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or unparsable.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
