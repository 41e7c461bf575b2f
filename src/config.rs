//! Configuration and backend tunables
//!
//! All tunables live in a single [`Config`]. A process installs its
//! configuration once with [`Config::install`]; primitives read it through
//! [`Config::global`], which falls back to [`Config::default`].

use std::sync::OnceLock;

use crate::collectives::cost::Algorithm;
use crate::error::{Error, Result};

/// Size of a cache line in bytes
pub const CACHE_LINE_SIZE: usize = 64;

/// Default block size (in elements) of the 1D block-cyclic distribution
pub const DEFAULT_BLOCK_SIZE: usize = CACHE_LINE_SIZE;

/// Default problem size from which the shared-memory kernels are used
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;

/// How input ranges are handed to the processes of an SPMD launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    /// Every process receives the same, full input range
    #[default]
    Sequential,
    /// Every process receives a disjoint slice; the union forms the input
    Parallel,
}

/// System parameters for performance tuning
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Size of cache line in bytes
    pub cache_line_size: usize,
    /// Size of L2 cache in bytes
    pub l2_cache_size: usize,
    /// Number of threads to use
    pub n_threads: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            cache_line_size: CACHE_LINE_SIZE,
            l2_cache_size: 256_000,     // 256KB L2 cache (conservative default)
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}

/// Parameters of the collective-communication cost model
#[derive(Debug, Clone)]
pub struct CollectivesConfig {
    /// Capacity of the per-process collectives buffer, in bytes
    pub buffer_capacity: usize,
    /// Per-byte message gap `g`
    pub g: f64,
    /// Per-superstep latency `l`
    pub l: f64,
    /// Bypass the cost model and always use this algorithm
    pub force_algorithm: Option<Algorithm>,
}

impl Default for CollectivesConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1 << 20,
            g: 1.0,
            l: 10_000.0,
            force_algorithm: None,
        }
    }
}

/// Repetition counts for benchmark harnesses
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Repetitions timed together
    pub inner: usize,
    /// Number of timed groups
    pub outer: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self { inner: 1, outer: 10 }
    }
}

/// Backend configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// System parameters for performance tuning
    pub system_params: SystemParameters,

    /// Block size of the 1D block-cyclic distribution; a power of two
    pub block_size: usize,

    /// Cost-model parameters for the collectives
    pub collectives: CollectivesConfig,

    /// Problem size from which primitives dispatch to the rayon kernels
    pub parallel_threshold: usize,

    /// Benchmark repetition counts
    pub benchmark: BenchmarkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            collectives: CollectivesConfig::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            benchmark: BenchmarkConfig::default(),
        }
    }
}

static GLOBAL: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Create a config that never dispatches to the shared-memory kernels
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Self::default()
        }
    }

    /// Checks the invariants the backends rely on
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || !self.block_size.is_power_of_two() {
            return Err(Error::illegal(
                "Config::validate",
                format!("block size {} is not a power of two", self.block_size),
            ));
        }
        if self.system_params.n_threads == 0 {
            return Err(Error::illegal("Config::validate", "zero threads requested"));
        }
        if !(self.collectives.g >= 0.0 && self.collectives.l >= 0.0) {
            return Err(Error::illegal(
                "Config::validate",
                "negative or NaN cost-model parameters",
            ));
        }
        Ok(())
    }

    /// Installs the process-wide configuration
    ///
    /// Fails with [`Error::Illegal`] if the config is invalid or if a
    /// configuration was already installed or read.
    pub fn install(config: Config) -> Result<()> {
        config.validate()?;
        GLOBAL
            .set(config)
            .map_err(|_| Error::illegal("Config::install", "configuration already installed"))
    }

    /// The process-wide configuration
    pub fn global() -> &'static Config {
        GLOBAL.get_or_init(Config::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.block_size, CACHE_LINE_SIZE);
        assert!(config.system_params.n_threads >= 1);
    }

    #[test]
    fn test_rejects_bad_block_size() {
        let config = Config {
            block_size: 48,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            block_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sequential_threshold() {
        assert_eq!(Config::sequential().parallel_threshold, usize::MAX);
    }
}
