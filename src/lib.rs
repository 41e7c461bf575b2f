//! # SPALG: Sparse Linear Algebra over Generalised Semirings
//!
//! SPALG provides sparse vectors and matrices together with the linear
//! algebra primitives of the GraphBLAS family, parametrised by
//! user-chosen operators, monoids and semirings.
//!
//! ## Overview
//!
//! - **Algebra**: operators carry their algebraic properties as associated
//!   constants; monoids and semirings are checked when instantiated.
//! - **Containers**: [`Vector`] keeps a sparsity carrier next to a dense
//!   value buffer; [`Matrix`] keeps CSR and CSC forms side by side.
//! - **Primitives**: BLAS1 ([`blas1`]) and BLAS2 ([`blas2`]) operations
//!   take a [`Descriptor`] and, where they produce a container, a [`Phase`].
//!   Large problems run on rayon.
//! - **SPMD backend**: a [`Launcher`] runs one closure per process;
//!   [`bsp1d`] containers spread over the processes with the 1D
//!   block-cyclic [`distribution`] and talk through [`collectives`].
//! - **Structured storage**: [`amf`] maps logical coordinates of dense
//!   structured matrices and their views onto flat buffers.
//!
//! ## Usage
//!
//! ```
//! use spalg::{blas2, IoMode, Matrix, Phase, PlusTimes, Vector, NO_OPERATION};
//! use spalg::io::build_matrix_unique;
//!
//! let mut a = Matrix::new(2, 2);
//! build_matrix_unique(&mut a, vec![0, 1], vec![1, 0], vec![2.0, 3.0], IoMode::Sequential)?;
//! let x = Vector::from_dense(vec![1.0, 1.0]);
//! let mut y = Vector::new(2);
//! blas2::mxv(&mut y, &a, &x, PlusTimes::<f64>::new(), NO_OPERATION, Phase::Execute)?;
//! assert_eq!(y.get(0), Some(&2.0));
//! # Ok::<(), spalg::Error>(())
//! ```

pub mod algebra;
pub mod amf;
pub mod blas1;
pub mod blas2;
pub mod bsp1d;
pub mod collectives;
pub mod config;
pub mod coordinates;
pub mod descriptors;
pub mod distribution;
pub mod error;
pub mod io;
pub mod launcher;
mod mask;
pub mod matrix;
mod parallel;
pub mod phase;
pub mod pinned;
pub mod types;
pub mod utils;
pub mod vector;

// Re-export primary components
pub use algebra::{
    IsMonoid, IsSemiring, LorLand, MaxPlus, MaxTimes, MinPlus, Monoid, Operator, PlusMonoid,
    PlusTimes, Semiring,
};
pub use bsp1d::{DistMatrix, DistVector};
pub use collectives::{Algorithm, Collectives, LocalTransport, Transport};
pub use config::{Config, IoMode};
pub use descriptors::*;
pub use distribution::Distribution;
pub use error::{Error, Rc, Result};
pub use launcher::{Context, Launcher};
pub use matrix::{Matrix, SparseMatrixCSC, SparseMatrixCSR, SparseView};
pub use phase::Phase;
pub use pinned::PinnedVector;
pub use types::Scalar;
pub use vector::Vector;

/// Version information for the SPALG library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
