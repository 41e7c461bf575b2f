//! Collective communication among the processes of an SPMD launch
//!
//! [`Collectives`] implements gather, scatter, all-to-all, reduction and
//! broadcast on top of a [`Transport`]. Reductions and broadcasts pick a
//! one-step, transpose or tree algorithm through the [`cost`] model.

pub mod cost;
pub mod local;
pub mod ops;
pub mod transport;

pub use cost::{Algorithm, CostModel};
pub use local::LocalTransport;
pub use ops::Collectives;
pub use transport::{Payload, Transport};
