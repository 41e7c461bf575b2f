//! Sparse matrices: the compressed storage pair, the container and its views

pub mod container;
pub mod conversion;
pub mod csc;
pub mod csr;
pub mod view;

pub use container::Matrix;
pub use csc::SparseMatrixCSC;
pub use csr::SparseMatrixCSR;
pub use view::{materialize, Diagonal, SparseView, Transposed};
