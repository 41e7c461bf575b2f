//! In-process transport connecting the threads of one SPMD launch

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::warn;

use super::transport::{Payload, Transport};
use crate::error::{Error, Result};

/// Barrier that can be poisoned by a failing participant
struct Barrier {
    state: Mutex<BarrierState>,
    cvar: Condvar,
    parties: usize,
}

struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

impl Barrier {
    fn new(parties: usize) -> Self {
        Self {
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                poisoned: false,
            }),
            cvar: Condvar::new(),
            parties,
        }
    }

    fn wait(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.poisoned {
            return Err(Error::Panic("a peer process failed".to_string()));
        }
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation += 1;
            self.cvar.notify_all();
            return Ok(());
        }

        let generation = state.generation;
        while state.generation == generation && !state.poisoned {
            self.cvar.wait(&mut state);
        }
        if state.generation == generation {
            Err(Error::Panic("a peer process failed".to_string()))
        } else {
            Ok(())
        }
    }

    fn poison(&self) {
        let mut state = self.state.lock();
        state.poisoned = true;
        self.cvar.notify_all();
    }
}

/// State shared by every endpoint of a group
struct Shared {
    nprocs: usize,
    /// Slot `dest * nprocs + src`
    mailboxes: Vec<Mutex<Option<Payload>>>,
    barrier: Barrier,
}

/// One process's endpoint of an in-process group
#[derive(Clone)]
pub struct LocalTransport {
    pid: usize,
    shared: Arc<Shared>,
}

impl LocalTransport {
    /// Creates the endpoints of a group of `nprocs` processes, in rank order
    ///
    /// Fails with [`Error::Illegal`] for an empty group.
    pub fn group(nprocs: usize) -> Result<Vec<LocalTransport>> {
        if nprocs == 0 {
            return Err(Error::illegal("LocalTransport::group", "a group needs at least one process"));
        }
        let shared = Arc::new(Shared {
            nprocs,
            mailboxes: (0..nprocs * nprocs).map(|_| Mutex::new(None)).collect(),
            barrier: Barrier::new(nprocs),
        });
        Ok((0..nprocs)
            .map(|pid| LocalTransport {
                pid,
                shared: Arc::clone(&shared),
            })
            .collect())
    }

    fn check_rank(&self, rank: usize) -> Result<()> {
        if rank < self.shared.nprocs {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index: rank,
                size: self.shared.nprocs,
            })
        }
    }
}

impl Transport for LocalTransport {
    fn pid(&self) -> usize {
        self.pid
    }

    fn nprocs(&self) -> usize {
        self.shared.nprocs
    }

    fn put(&self, dest: usize, payload: Payload) -> Result<()> {
        self.check_rank(dest)?;
        let mut slot = self.shared.mailboxes[dest * self.shared.nprocs + self.pid].lock();
        if slot.is_some() {
            return Err(Error::illegal("put", format!("message to {} already in flight", dest)));
        }
        *slot = Some(payload);
        Ok(())
    }

    fn get(&self, src: usize) -> Result<Option<Payload>> {
        self.check_rank(src)?;
        Ok(self.shared.mailboxes[self.pid * self.shared.nprocs + src].lock().take())
    }

    fn sync(&self) -> Result<()> {
        self.shared.barrier.wait().map_err(|err| {
            warn!(pid = self.pid, "superstep aborted: {}", err);
            err
        })
    }

    fn abort(&self) {
        warn!(pid = self.pid, "aborting process group");
        self.shared.barrier.poison();
    }
}
