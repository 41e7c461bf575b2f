//! The communication substrate underneath the collectives
//!
//! A transport moves opaque payloads between the processes of a group in
//! bulk-synchronous supersteps: payloads deposited with [`Transport::put`]
//! become readable by their destination after the next
//! [`Transport::sync`].

use std::any::Any;

use crate::error::Result;

/// A type-erased message
pub type Payload = Box<dyn Any + Send>;

/// Point-to-point messaging plus a group-wide barrier
pub trait Transport: Send + Sync {
    /// Rank of the calling process, in `0..nprocs()`
    fn pid(&self) -> usize;

    /// Number of processes in the group
    fn nprocs(&self) -> usize;

    /// Deposits `payload` for process `dest`
    ///
    /// At most one payload per (source, destination) pair may be in flight
    /// per superstep.
    fn put(&self, dest: usize, payload: Payload) -> Result<()>;

    /// Takes the payload process `src` deposited for the caller, if any
    fn get(&self, src: usize) -> Result<Option<Payload>>;

    /// Group-wide barrier ending the current superstep
    ///
    /// Fails with [`Error::Panic`](crate::Error::Panic) if a peer has failed;
    /// the group is unusable afterwards.
    fn sync(&self) -> Result<()>;

    /// Marks the group as failed, releasing every process blocked in
    /// [`Transport::sync`]
    fn abort(&self);
}
