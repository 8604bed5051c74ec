//! Pool Configuration
//!
//! Sizing for the worker pool used by parallel flows, loadable from YAML:
//!
//! ```yaml
//! workers: 8
//! thread_name: etl-worker
//! ```
//!
//! Missing fields fall back to defaults. The default worker count comes
//! from the `FLOWRUNNER_WORKERS` environment variable when it holds a
//! positive number, otherwise from the number of CPUs.

use std::fs;
use std::path::Path;

use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Environment variable overriding the default worker count.
pub const WORKERS_ENV: &str = "FLOWRUNNER_WORKERS";

const DEFAULT_THREAD_NAME: &str = "flowrunner-worker";

/// Lazily-resolved default worker count.
pub static DEFAULT_WORKERS: Lazy<usize> = Lazy::new(|| {
    if let Ok(raw) = std::env::var(WORKERS_ENV) {
        match raw.trim().parse::<usize>() {
            Ok(workers) if workers > 0 => return workers,
            _ => warn!("Ignoring invalid {}='{}'", WORKERS_ENV, raw),
        }
    }
    num_cpus::get()
});

fn default_workers() -> usize {
    *DEFAULT_WORKERS
}

fn default_thread_name() -> String {
    DEFAULT_THREAD_NAME.to_string()
}

/// Worker pool settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Prefix for worker thread names
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            thread_name: default_thread_name(),
        }
    }
}

impl PoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(FlowError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(FlowError::InvalidConfig(
                "thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PoolConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Loads a pool configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, or
/// describes an invalid pool.
pub fn load_config(path: impl AsRef<Path>) -> Result<PoolConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| FlowError::ConfigIo {
        path: path.display().to_string(),
        source,
    })?;

    let config = PoolConfig::from_yaml(&content)?;
    info!(
        "Loaded config from {}: {} workers",
        path.display(),
        config.workers
    );
    Ok(config)
}
