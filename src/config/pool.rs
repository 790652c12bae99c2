//! Node pool configuration.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{CollectionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a [`NodePool`](crate::memory::NodePool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of recycled nodes kept on the free list
    pub max_nodes: usize,
    /// Track hit/miss/recycle counters
    pub enable_stats: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_nodes: 64,
            enable_stats: true,
        }
    }
}

impl PoolConfig {
    /// Small pool for short-lived tables.
    pub fn small() -> Self {
        Self {
            max_nodes: 16,
            enable_stats: false,
        }
    }

    /// Large pool for tables that repeatedly grow and shrink.
    pub fn large() -> Self {
        Self {
            max_nodes: 1024,
            enable_stats: true,
        }
    }
}

impl Config for PoolConfig {
    fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            return Err(CollectionError::configuration(
                "max_nodes must be greater than 0",
            ));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.max_nodes = parse_env_var(&format!("{}POOL_MAX_NODES", prefix), config.max_nodes);
        config.enable_stats =
            parse_env_bool(&format!("{}POOL_STATS", prefix), config.enable_stats);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self::large()
    }

    fn memory_preset() -> Self {
        Self::small()
    }

    fn realtime_preset() -> Self {
        Self {
            max_nodes: 256,
            enable_stats: false,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            CollectionError::configuration(format!("Failed to serialize pool config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CollectionError::configuration(format!("Failed to parse pool config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
