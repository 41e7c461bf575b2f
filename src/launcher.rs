//! In-process SPMD launcher
//!
//! A [`Launcher`] runs the same closure on `P` threads, each acting as one
//! process of an SPMD group. Every process gets a [`Context`] with its rank
//! and a [`Collectives`] handle connected to its peers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::collectives::{Collectives, LocalTransport, Transport};
use crate::config::{Config, IoMode};
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::vector::with_process_ids;

/// Per-process view of an SPMD launch
pub struct Context {
    pid: usize,
    nprocs: usize,
    io_mode: IoMode,
    distribution: Distribution,
    collectives: Collectives,
}

impl Context {
    /// Rank of this process
    #[inline]
    pub fn pid(&self) -> usize {
        self.pid
    }

    /// Number of processes
    #[inline]
    pub fn nprocs(&self) -> usize {
        self.nprocs
    }

    /// How this launch hands input ranges to the processes
    #[inline]
    pub fn io_mode(&self) -> IoMode {
        self.io_mode
    }

    /// The index distribution shared by every process of the launch
    #[inline]
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Collective communication with the other processes
    #[inline]
    pub fn collectives(&self) -> &Collectives {
        &self.collectives
    }
}

/// Spawns SPMD groups of a fixed size
#[derive(Debug, Clone)]
pub struct Launcher {
    nprocs: usize,
    io_mode: IoMode,
    config: Config,
}

impl Launcher {
    /// A launcher for `nprocs` processes using the process-wide configuration
    ///
    /// Fails with [`Error::Illegal`] if `nprocs` is zero.
    pub fn new(nprocs: usize, io_mode: IoMode) -> Result<Self> {
        if nprocs == 0 {
            return Err(Error::illegal("Launcher::new", "at least one process is required"));
        }
        Ok(Self {
            nprocs,
            io_mode,
            config: Config::global().clone(),
        })
    }

    /// Replaces the configuration used by the launched processes
    pub fn with_config(mut self, config: Config) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Number of processes per launch
    pub fn nprocs(&self) -> usize {
        self.nprocs
    }

    /// Runs `f` on every process and returns the per-process results in rank order
    ///
    /// If any process fails or panics, its peers are released from pending
    /// collectives with [`Error::Panic`], and the first failure that is not
    /// such a knock-on panic is returned.
    pub fn exec<R, F>(&self, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(&Context) -> Result<R> + Sync,
    {
        let endpoints = LocalTransport::group(self.nprocs)?;
        let distribution = Distribution::from_config(&self.config);

        let outcomes: Vec<Result<R>> = thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .into_iter()
                .map(|endpoint| {
                    let f = &f;
                    let transport = Arc::new(endpoint);
                    let context = Context {
                        pid: transport.pid(),
                        nprocs: self.nprocs,
                        io_mode: self.io_mode,
                        distribution,
                        collectives: Collectives::new(
                            Arc::clone(&transport) as Arc<dyn Transport>,
                            self.config.collectives.clone(),
                        ),
                    };
                    scope.spawn(move || {
                        debug!(pid = context.pid, nprocs = context.nprocs, "process start");
                        let outcome = with_process_ids(|| {
                            panic::catch_unwind(AssertUnwindSafe(|| f(&context)))
                        })
                        .unwrap_or_else(|_| {
                            warn!(pid = context.pid, "process panicked");
                            Err(Error::Panic(format!("process {} panicked", context.pid)))
                        });
                        if outcome.is_err() {
                            transport.abort();
                        }
                        debug!(pid = context.pid, ok = outcome.is_ok(), "process stop");
                        outcome
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(Error::Panic("process thread died".to_string())))
                })
                .collect()
        });

        let mut results = Vec::with_capacity(self.nprocs);
        let mut first_panic = None;
        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(r) => results.push(r),
                Err(err @ Error::Panic(_)) => {
                    first_panic.get_or_insert(err);
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error.or(first_panic) {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}
